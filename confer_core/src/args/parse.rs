use std::collections::HashMap;

use crate::args::token::Token;
use crate::error::SyntaxError;
use crate::model::Coordinate;
use crate::scan::{NamedSyntax, SyntaxKind};

/// Parse `tokens` into coordinate/value pairs against `syntax`.
///
/// * A flag yields `(switch, "true")`, and may not be followed by an attached value.
/// * An option consumes the following value token (attached or not).
/// * Any other value is assigned the next positional coordinate, in order.
pub fn parse(
    tokens: Vec<Token>,
    syntax: &[NamedSyntax],
) -> Result<Vec<(Coordinate, String)>, SyntaxError> {
    let switches: HashMap<&Coordinate, SyntaxKind> = syntax
        .iter()
        .flat_map(|property| {
            property
                .coordinates()
                .iter()
                .filter(|coordinate| coordinate.is_switch())
                .map(move |coordinate| (coordinate, property.kind()))
        })
        .collect();
    let mut pairs = Vec::with_capacity(tokens.len());
    let mut position = 0;
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        match token {
            Token::Switch(switch) => {
                let coordinate = Coordinate::from(switch);

                match switches.get(&coordinate) {
                    None => return Err(SyntaxError::UnrecognizedSwitch { switch: coordinate }),
                    Some(SyntaxKind::Flag) => {
                        if let Some(Token::Value(value)) = tokens.peek() {
                            if value.attached {
                                return Err(SyntaxError::FlagValue {
                                    switch: coordinate,
                                    value: value.value.clone(),
                                });
                            }
                        }

                        pairs.push((coordinate, true.to_string()));
                    }
                    Some(_) => match tokens.next() {
                        Some(Token::Value(value)) => pairs.push((coordinate, value.value)),
                        _ => return Err(SyntaxError::MissingValue { switch: coordinate }),
                    },
                }
            }
            Token::Value(value) => {
                pairs.push((Coordinate::Positional(position), value.value));
                position += 1;
            }
        }
    }

    Ok(pairs)
}
