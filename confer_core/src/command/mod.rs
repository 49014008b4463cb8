//! Scanned commands: the validated shape of a configurable type.
mod resolve;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::describe::{ConfigurableTag, InvocationError, WrapFn};
use crate::model::Discriminator;
use crate::rules::NamedRule;
use crate::scan::NamedSyntax;

pub use resolve::*;

/// A scanned configurable type.
#[derive(Debug)]
pub enum Command {
    /// A concrete type built from its own syntax and rules.
    Single(SingleCommand),
    /// An abstract type which dispatches to one of its subcommands.
    Multi(MultiCommand),
}

impl Command {
    /// The command's display name.
    pub fn name(&self) -> &str {
        match self {
            Command::Single(single) => single.name(),
            Command::Multi(multi) => multi.name(),
        }
    }

    /// The configurable marker.
    pub fn tag(&self) -> &ConfigurableTag {
        match self {
            Command::Single(single) => single.tag(),
            Command::Multi(multi) => multi.tag(),
        }
    }

    /// The scanned type's name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Command::Single(single) => single.type_name,
            Command::Multi(multi) => multi.type_name,
        }
    }
}

/// A concrete command: its syntax, and the rules which build it.
#[derive(Debug)]
pub struct SingleCommand {
    pub(crate) type_name: &'static str,
    pub(crate) name: String,
    pub(crate) tag: ConfigurableTag,
    pub(crate) syntax: Vec<NamedSyntax>,
    pub(crate) rules: Vec<NamedRule>,
}

impl SingleCommand {
    /// The command's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configurable marker.
    pub fn tag(&self) -> &ConfigurableTag {
        &self.tag
    }

    /// The scanned type's name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The validated properties, in declaration order.
    pub fn syntax(&self) -> &[NamedSyntax] {
        &self.syntax
    }

    /// The validated rules, in evaluation order.
    pub fn rules(&self) -> &[NamedRule] {
        &self.rules
    }

    /// The property named `name`.
    pub fn property(&self, name: &str) -> Option<&NamedSyntax> {
        self.syntax.iter().find(|syntax| syntax.name() == name)
    }
}

/// An edge from a multi-command to one of its subcommands.
pub struct Subcommand {
    pub(crate) command: Command,
    pub(crate) wrap: WrapFn,
}

impl Subcommand {
    /// The subcommand.
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub(crate) fn wrap(&self, built: Box<dyn Any>) -> Result<Box<dyn Any>, InvocationError> {
        (self.wrap)(built)
    }
}

impl fmt::Debug for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subcommand")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// An abstract command: a discriminator per subcommand.
#[derive(Debug)]
pub struct MultiCommand {
    pub(crate) type_name: &'static str,
    pub(crate) name: String,
    pub(crate) tag: ConfigurableTag,
    pub(crate) subcommands: BTreeMap<Discriminator, Subcommand>,
}

impl MultiCommand {
    /// The command's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configurable marker.
    pub fn tag(&self) -> &ConfigurableTag {
        &self.tag
    }

    /// The scanned type's name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The subcommands, ordered by discriminator.
    pub fn subcommands(&self) -> &BTreeMap<Discriminator, Subcommand> {
        &self.subcommands
    }
}
