use std::any::Any;
use std::collections::BTreeMap;

use tracing::trace;

use crate::args::group::Grouped;
use crate::deserialize::DeserializerRegistry;
use crate::describe::Facts;
use crate::error::ArgumentError;
use crate::model::Coordinate;
use crate::scan::{NamedSyntax, SyntaxKind};

/// The deserialized elements received per property, each with the coordinate it arrived at.
pub type Mapped = BTreeMap<String, Vec<(Coordinate, Box<dyn Any>)>>;

fn property<'s>(syntax: &'s [NamedSyntax], name: &str) -> Option<&'s NamedSyntax> {
    syntax.iter().find(|property| property.name() == name)
}

/// Deserialize every grouped value into an element of its property's type.
pub fn map(
    grouped: Grouped,
    syntax: &[NamedSyntax],
    registry: &DeserializerRegistry,
) -> Result<Mapped, ArgumentError> {
    let mut mapped = Mapped::default();

    for (name, values) in grouped {
        // Grouping only produces names of declared properties.
        let Some(property) = property(syntax, &name) else {
            continue;
        };
        let mut elements = Vec::with_capacity(values.len());

        for (coordinate, value) in values {
            let element = registry
                .deserialize(property.value_type(), &value)
                .map_err(|message| ArgumentError::Deserialization {
                    name: name.clone(),
                    coordinate: coordinate.clone(),
                    value: value.clone(),
                    type_name: property.value_type().element_name(),
                    message,
                })?;
            elements.push((coordinate, element));
        }

        mapped.insert(name, elements);
    }

    Ok(mapped)
}

/// Reduce the mapped elements into facts, one per property.
///
/// Properties which received nothing fall back to their default value.
/// Without a default, a required property is an error; any other falls back to `false` (for flags), or the absent
/// value of its shape (`None` or an empty collection).
pub fn reduce(
    mapped: Mapped,
    syntax: &[NamedSyntax],
    registry: &DeserializerRegistry,
) -> Result<Facts, ArgumentError> {
    let mut facts = Facts::new();
    let mut mapped = mapped;

    for property in syntax {
        let name = property.name();

        if let Some(elements) = mapped.remove(name) {
            let coordinate = elements
                .last()
                .map(|(coordinate, _)| coordinate.clone());
            let values: Vec<Box<dyn Any>> =
                elements.into_iter().map(|(_, element)| element).collect();

            if let Some(fact) = property.value_type().assemble(values) {
                trace!("Reduced '{name}'.");
                facts.insert(name, fact);
                continue;
            }

            if let Some(coordinate) = coordinate {
                return Err(ArgumentError::Deserialization {
                    name: name.to_string(),
                    coordinate,
                    value: String::default(),
                    type_name: property.value_type().element_name(),
                    message: "the deserializer produced an element of another type".to_string(),
                });
            }
        }

        if let Some(fact) = default(property, registry)? {
            trace!("Reduced '{name}' from its default value.");
            facts.insert(name, fact);
            continue;
        }

        if property.is_required() {
            return Err(ArgumentError::MissingRequired {
                name: name.to_string(),
                coordinates: property.coordinates_display(),
            });
        }

        if let Some(fact) = absent(property) {
            trace!("Reduced '{name}' from its absent value.");
            facts.insert(name, fact);
        }
    }

    Ok(facts)
}

fn default(
    property: &NamedSyntax,
    registry: &DeserializerRegistry,
) -> Result<Option<Box<dyn Any>>, ArgumentError> {
    let Some(default) = property.default_value() else {
        return Ok(None);
    };
    let element = registry
        .deserialize(property.value_type(), default)
        .map_err(|message| ArgumentError::Deserialization {
            name: property.name().to_string(),
            coordinate: property.coordinates()[0].clone(),
            value: default.to_string(),
            type_name: property.value_type().element_name(),
            message,
        })?;
    Ok(property.value_type().assemble(vec![element]))
}

fn absent(property: &NamedSyntax) -> Option<Box<dyn Any>> {
    if property.kind() == SyntaxKind::Flag {
        return Some(Box::new(false));
    }

    property.value_type().absent()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::ValueType;
    use crate::scan::syntax::test::{flag, option, positional};
    use assert_matches::assert_matches;

    fn grouped(entries: &[(&str, &[(Coordinate, &str)])]) -> Grouped {
        entries
            .iter()
            .map(|(name, values)| {
                (
                    name.to_string(),
                    values
                        .iter()
                        .map(|(c, v)| (c.clone(), v.to_string()))
                        .collect(),
                )
            })
            .collect()
    }

    fn required(mut syntax: NamedSyntax) -> NamedSyntax {
        syntax.required = true;
        syntax
    }

    fn defaulted(mut syntax: NamedSyntax, value: &str) -> NamedSyntax {
        syntax.default_value = Some(value.to_string());
        syntax
    }

    fn run(grouped: Grouped, syntax: &[NamedSyntax]) -> Result<Facts, ArgumentError> {
        let registry = DeserializerRegistry::default();
        let mapped = map(grouped, syntax, &registry)?;
        reduce(mapped, syntax, &registry)
    }

    #[test]
    fn reduce_shapes() {
        // Setup
        let syntax = vec![
            flag("flag", 'f'),
            option("count", 'c', ValueType::scalar::<u32>()),
            option("name", 'n', ValueType::optional::<String>()),
            positional("items", 0, ValueType::collection::<i8>()),
        ];
        let grouped = grouped(&[
            ("flag", &[(Coordinate::ShortSwitch('f'), "true")]),
            (
                "count",
                &[
                    (Coordinate::ShortSwitch('c'), "1"),
                    (Coordinate::ShortSwitch('c'), "2"),
                ],
            ),
            (
                "items",
                &[
                    (Coordinate::Positional(0), "-1"),
                    (Coordinate::Positional(1), "3"),
                ],
            ),
        ]);

        // Execute
        let facts = run(grouped, &syntax).unwrap();

        // Verify
        assert!(facts.get::<bool>("flag").unwrap());
        assert_eq!(facts.get::<u32>("count").unwrap(), 2);
        assert_eq!(facts.get::<Option<String>>("name").unwrap(), None);
        assert_eq!(facts.get::<Vec<i8>>("items").unwrap(), vec![-1, 3]);
    }

    #[test]
    fn reduce_absent() {
        // Setup
        let syntax = vec![
            flag("flag", 'f'),
            option("scalar", 's', ValueType::scalar::<u32>()),
            defaulted(option("port", 'p', ValueType::scalar::<u16>()), "80"),
            defaulted(option("level", 'l', ValueType::optional::<u8>()), "3"),
            option("items", 'i', ValueType::collection::<String>()),
        ];

        // Execute
        let facts = run(Grouped::default(), &syntax).unwrap();

        // Verify
        assert!(!facts.get::<bool>("flag").unwrap());
        assert!(!facts.contains("scalar"));
        assert_eq!(facts.get::<u16>("port").unwrap(), 80);
        assert_eq!(facts.get::<Option<u8>>("level").unwrap(), Some(3));
        assert_eq!(facts.get::<Vec<String>>("items").unwrap(), Vec::<String>::default());
    }

    #[test]
    fn reduce_missing_required() {
        let syntax = vec![required(option("port", 'p', ValueType::scalar::<u16>()))];

        assert_matches!(
            run(Grouped::default(), &syntax),
            Err(ArgumentError::MissingRequired { name, coordinates }) if name == "port" && coordinates == "-p/--port"
        );
    }

    #[test]
    fn reduce_missing_required_shapes() {
        let collection = vec![required(positional("items", 0, ValueType::collection::<String>()))];
        assert_matches!(
            run(Grouped::default(), &collection),
            Err(ArgumentError::MissingRequired { name, .. }) if name == "items"
        );

        let optional = vec![required(option("host", 'o', ValueType::optional::<String>()))];
        assert_matches!(
            run(Grouped::default(), &optional),
            Err(ArgumentError::MissingRequired { name, .. }) if name == "host"
        );
    }

    #[test]
    fn reduce_required_defaulted() {
        let syntax = vec![required(defaulted(
            option("items", 'i', ValueType::collection::<String>()),
            "a",
        ))];

        let facts = run(Grouped::default(), &syntax).unwrap();

        assert_eq!(facts.get::<Vec<String>>("items").unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn map_deserialization() {
        // Setup
        let syntax = vec![option("port", 'p', ValueType::scalar::<u16>())];
        let grouped = grouped(&[("port", &[(Coordinate::LongSwitch("port".to_string()), "http")])]);

        // Execute
        let error = run(grouped, &syntax).unwrap_err();

        // Verify
        match error {
            ArgumentError::Deserialization {
                name,
                coordinate,
                value,
                type_name,
                ..
            } => {
                assert_eq!(name, "port");
                assert_eq!(coordinate, Coordinate::LongSwitch("port".to_string()));
                assert_eq!(value, "http");
                assert_eq!(type_name, "u16");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
