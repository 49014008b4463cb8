use std::collections::{BTreeMap, HashSet};

use crate::deserialize::DeserializerRegistry;
use crate::describe::Shape;
use crate::error::ScanError;
use crate::scan::syntax::NamedSyntax;

/// Validate a command's syntax as a whole.
///
/// Names and coordinates are unique, positions are contiguous from 0, no required positional follows an optional one,
/// a collection positional is last, and every default value deserializes.
pub(crate) fn validate(
    syntax: &[NamedSyntax],
    registry: &DeserializerRegistry,
) -> Result<(), ScanError> {
    let mut names = HashSet::new();
    let mut coordinates = HashSet::new();

    for property in syntax {
        if !names.insert(property.name()) {
            return Err(ScanError::DuplicatePropertyName {
                name: property.name().to_string(),
            });
        }

        for coordinate in property.coordinates() {
            if !coordinates.insert(coordinate) {
                return Err(ScanError::DuplicateCoordinate {
                    coordinate: coordinate.clone(),
                });
            }
        }
    }

    positionals(syntax)?;

    for property in syntax {
        if let Some(value) = property.default_value() {
            registry
                .deserialize(property.value_type(), value)
                .map_err(|message| ScanError::InvalidDefaultValue {
                    name: property.name().to_string(),
                    value: value.to_string(),
                    message,
                })?;
        }
    }

    Ok(())
}

fn positionals(syntax: &[NamedSyntax]) -> Result<(), ScanError> {
    // Positions are unique at this point (coordinates are unique).
    let positionals: BTreeMap<usize, &NamedSyntax> = syntax
        .iter()
        .filter_map(|property| property.position().map(|position| (position, property)))
        .collect();
    let mut optional_seen = false;

    for (expected, (position, property)) in positionals.iter().enumerate() {
        if *position != expected {
            return Err(ScanError::PositionalGap { position: expected });
        }

        let optional = !property.is_required();

        if optional_seen && !optional {
            return Err(ScanError::RequiredPositionalAfterOptional {
                name: property.name().to_string(),
            });
        }

        optional_seen |= optional;

        if property.value_type().shape() == Shape::Collection && expected + 1 != positionals.len() {
            return Err(ScanError::CollectionPositionalNotLast {
                name: property.name().to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::ValueType;
    use crate::model::Coordinate;
    use crate::scan::syntax::test::{flag, option, positional};
    use rstest::rstest;

    fn required(mut syntax: NamedSyntax) -> NamedSyntax {
        syntax.required = true;
        syntax
    }

    fn string(name: &str, position: usize) -> NamedSyntax {
        positional(name, position, ValueType::scalar::<String>())
    }

    #[test]
    fn valid() {
        let syntax = vec![
            flag("flag", 'f'),
            option("option", 'o', ValueType::scalar::<u32>()),
            required(string("first", 0)),
            string("second", 1),
            positional("rest", 2, ValueType::collection::<String>()),
        ];
        assert_eq!(validate(&syntax, &DeserializerRegistry::default()), Ok(()));
    }

    #[test]
    fn duplicate_coordinate() {
        // Two flags both claim `-x`.
        let syntax = vec![flag("alpha", 'x'), flag("bravo", 'x')];
        assert_eq!(
            validate(&syntax, &DeserializerRegistry::default()),
            Err(ScanError::DuplicateCoordinate {
                coordinate: Coordinate::ShortSwitch('x')
            })
        );
    }

    #[test]
    fn duplicate_name() {
        let syntax = vec![flag("alpha", 'a'), string("alpha", 0)];
        assert_eq!(
            validate(&syntax, &DeserializerRegistry::default()),
            Err(ScanError::DuplicatePropertyName {
                name: "alpha".to_string()
            })
        );
    }

    #[rstest]
    #[case(vec![string("a", 1)], ScanError::PositionalGap { position: 0 })]
    #[case(vec![string("a", 0), string("b", 2)], ScanError::PositionalGap { position: 1 })]
    #[case(vec![string("a", 0), required(string("b", 1))], ScanError::RequiredPositionalAfterOptional { name: "b".to_string() })]
    #[case(
        vec![positional("a", 0, ValueType::collection::<u8>()), string("b", 1)],
        ScanError::CollectionPositionalNotLast { name: "a".to_string() }
    )]
    fn invalid_positionals(#[case] syntax: Vec<NamedSyntax>, #[case] expected: ScanError) {
        assert_eq!(
            validate(&syntax, &DeserializerRegistry::default()),
            Err(expected)
        );
    }

    #[test]
    fn invalid_default() {
        // Setup
        let mut port = option("port", 'p', ValueType::scalar::<u16>());
        port.default_value = Some("eighty".to_string());

        // Execute
        let result = validate(&[port], &DeserializerRegistry::default());

        // Verify
        match result {
            Err(ScanError::InvalidDefaultValue { name, value, .. }) => {
                assert_eq!(name, "port");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
