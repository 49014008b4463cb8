use std::any::Any;

use tracing::debug;

use crate::command::{Command, MultiCommand, SingleCommand, Subcommand};
use crate::constant::{HELP_DISCRIMINATOR, HELP_LONG, HELP_SHORT};
use crate::describe::InvocationError;
use crate::error::SyntaxError;
use crate::model::Discriminator;

/// The outcome of walking the command tree along the leading discriminators.
#[derive(Debug)]
pub struct Resolution<'c> {
    dereferences: Vec<(Discriminator, &'c MultiCommand)>,
    edges: Vec<&'c Subcommand>,
    command: &'c SingleCommand,
    remaining: Vec<String>,
}

impl<'c> Resolution<'c> {
    /// The multi-commands passed through, each with the discriminator taken from it, outermost first.
    pub fn dereferences(&self) -> &[(Discriminator, &'c MultiCommand)] {
        &self.dereferences
    }

    /// The resolved single command.
    pub fn command(&self) -> &'c SingleCommand {
        self.command
    }

    /// The arguments following the discriminators.
    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    /// Convert an instance of the resolved command into an instance of the root command.
    pub(crate) fn wrap(&self, built: Box<dyn Any>) -> Result<Box<dyn Any>, (String, InvocationError)> {
        let mut built = built;

        for ((_, multi), edge) in self.dereferences.iter().zip(self.edges.iter()).rev() {
            built = edge
                .wrap(built)
                .map_err(|error| (multi.type_name().to_string(), error))?;
        }

        Ok(built)
    }
}

fn is_help(argument: &str) -> bool {
    argument == HELP_DISCRIMINATOR
        || argument == format!("--{HELP_LONG}")
        || argument == format!("-{HELP_SHORT}")
}

/// Walk `root` along the leading discriminators of `arguments` until a single command is reached.
///
/// ### Example
/// A tree `program → {remote → {add, remove}, status}` with the arguments `["remote", "add", "origin"]` resolves to the
/// `add` command, having dereferenced `program` by `remote` then `remote` by `add`, and with `["origin"]` remaining.
pub fn resolve<'c>(root: &'c Command, arguments: &[String]) -> Result<Resolution<'c>, SyntaxError> {
    let mut dereferences = Vec::default();
    let mut edges = Vec::default();
    let mut current = root;
    let mut index = 0;

    loop {
        let multi = match current {
            Command::Single(command) => {
                debug!(
                    "Resolved '{}' after {} discriminator(s).",
                    command.name(),
                    dereferences.len()
                );
                return Ok(Resolution {
                    dereferences,
                    edges,
                    command,
                    remaining: arguments[index..].to_vec(),
                });
            }
            Command::Multi(multi) => multi,
        };

        let token = match arguments.get(index) {
            Some(token) => token,
            None => {
                return Err(SyntaxError::InsufficientDiscriminators {
                    command: multi.name().to_string(),
                })
            }
        };

        let discriminator: Discriminator = match token.parse() {
            Ok(discriminator) => discriminator,
            Err(_) if is_help(token) => {
                return Err(SyntaxError::HelpRequested {
                    command: multi.name().to_string(),
                })
            }
            Err(_) => {
                return Err(SyntaxError::InvalidDiscriminator {
                    command: multi.name().to_string(),
                    token: token.clone(),
                })
            }
        };

        let edge = match multi.subcommands.get(&discriminator) {
            Some(edge) => edge,
            None if is_help(token) => {
                return Err(SyntaxError::HelpRequested {
                    command: multi.name().to_string(),
                })
            }
            None => {
                return Err(SyntaxError::UnrecognizedDiscriminator {
                    command: multi.name().to_string(),
                    discriminator: token.clone(),
                })
            }
        };

        current = &edge.command;
        edges.push(edge);
        dereferences.push((discriminator, multi));
        index += 1;
    }
}
