use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

/// Grammar shared by discriminators and long switch names.
pub(crate) fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"^[a-zA-Z0-9][-a-zA-Z0-9_]*$"))
}

/// Whether `c` may be used as a short switch (ex: `-v`).
pub(crate) fn is_short_switch(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Whether `name` may be used as a long switch (ex: `--verbose`).
pub(crate) fn is_long_switch(name: &str) -> bool {
    name_pattern().is_match(name)
}

/// The source location of an argument datum.
///
/// Coordinates are the keys under which a command declares its syntax.
/// Two coordinates are equal when they name the same location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Coordinate {
    /// A single character switch: `-x`.
    ShortSwitch(char),
    /// A named switch: `--name`.
    LongSwitch(String),
    /// A zero-based positional argument.
    Positional(usize),
    /// An environment variable of the host process.
    EnvironmentVariable(String),
    /// A property of the host process.
    Property(String),
}

impl Coordinate {
    /// Whether this coordinate is addressed by a switch on the command line.
    pub fn is_switch(&self) -> bool {
        matches!(self, Coordinate::ShortSwitch(_) | Coordinate::LongSwitch(_))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::ShortSwitch(c) => write!(f, "-{c}"),
            Coordinate::LongSwitch(name) => write!(f, "--{name}"),
            Coordinate::Positional(position) => write!(f, "position {position}"),
            Coordinate::EnvironmentVariable(name) => write!(f, "environment variable {name}"),
            Coordinate::Property(name) => write!(f, "property {name}"),
        }
    }
}

/// A switch reference as it appears in a command line token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SwitchName {
    /// `-x`
    Short(char),
    /// `--name`
    Long(String),
}

impl From<SwitchName> for Coordinate {
    fn from(value: SwitchName) -> Self {
        match value {
            SwitchName::Short(c) => Coordinate::ShortSwitch(c),
            SwitchName::Long(name) => Coordinate::LongSwitch(name),
        }
    }
}

impl fmt::Display for SwitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchName::Short(c) => write!(f, "-{c}"),
            SwitchName::Long(name) => write!(f, "--{name}"),
        }
    }
}

/// A discriminator that does not match the discriminator grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid discriminator.")]
pub struct InvalidDiscriminator(pub String);

/// The edge label between a multi-command and one of its subcommands.
///
/// A discriminator can only be obtained through validation, so holding one proves it matches `[a-zA-Z0-9][-a-zA-Z0-9_]*`.
///
/// ### Example
/// ```
/// # use confer_core as confer;
/// use confer::Discriminator;
///
/// let discriminator: Discriminator = "remote-add".parse().unwrap();
/// assert_eq!(discriminator.as_str(), "remote-add");
/// assert!("-remote".parse::<Discriminator>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Discriminator(String);

impl Discriminator {
    /// The textual form of this discriminator.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Discriminator {
    type Err = InvalidDiscriminator;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if name_pattern().is_match(value) {
            Ok(Discriminator(value.to_string()))
        } else {
            Err(InvalidDiscriminator(value.to_string()))
        }
    }
}

impl TryFrom<&str> for Discriminator {
    type Error = InvalidDiscriminator;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
