use std::collections::{BTreeMap, HashMap};

use crate::describe::Shape;
use crate::error::SyntaxError;
use crate::model::Coordinate;
use crate::scan::NamedSyntax;

/// The values received per property, each with the coordinate it arrived at.
pub type Grouped = BTreeMap<String, Vec<(Coordinate, String)>>;

/// Group coordinate/value pairs by property name.
///
/// Positions beyond the last positional property belong to it when it is a collection.
pub fn group(
    pairs: Vec<(Coordinate, String)>,
    syntax: &[NamedSyntax],
) -> Result<Grouped, SyntaxError> {
    let names: HashMap<&Coordinate, &str> = syntax
        .iter()
        .flat_map(|property| {
            property
                .coordinates()
                .iter()
                .map(move |coordinate| (coordinate, property.name()))
        })
        .collect();
    let trailing = syntax
        .iter()
        .filter_map(|property| property.position().map(|position| (position, property)))
        .max_by_key(|(position, _)| *position)
        .filter(|(_, property)| property.value_type().shape() == Shape::Collection);
    let mut grouped = Grouped::default();

    for (coordinate, value) in pairs {
        let name = match names.get(&coordinate).copied() {
            Some(name) => name,
            None => match trailing {
                Some((last, property))
                    if matches!(coordinate, Coordinate::Positional(position) if position > last) =>
                {
                    property.name()
                }
                _ if coordinate.is_switch() => {
                    return Err(SyntaxError::UnrecognizedSwitch { switch: coordinate })
                }
                _ => return Err(SyntaxError::UnrecognizedArgument { coordinate, value }),
            },
        };

        grouped
            .entry(name.to_string())
            .or_default()
            .push((coordinate, value));
    }

    Ok(grouped)
}
