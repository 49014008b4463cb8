use std::fmt;

use crate::describe::{Shape, ValueType};
use crate::model::Coordinate;

/// The category of a property's syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// A no-value switch.
    Flag,
    /// A switch followed by a value.
    Option,
    /// A positional argument.
    Positional,
    /// An environment variable.
    Environment,
    /// A process property.
    Property,
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyntaxKind::Flag => "flag",
            SyntaxKind::Option => "option",
            SyntaxKind::Positional => "positional",
            SyntaxKind::Environment => "environment",
            SyntaxKind::Property => "property",
        };
        write!(f, "{label}")
    }
}

/// A validated property: its name, where its values come from, and how they are typed.
///
/// Switches may be addressable by both a short and a long form, so a property carries every coordinate it answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSyntax {
    pub(crate) name: String,
    pub(crate) coordinates: Vec<Coordinate>,
    pub(crate) kind: SyntaxKind,
    pub(crate) value_type: ValueType,
    pub(crate) required: bool,
    pub(crate) default_value: Option<String>,
    pub(crate) example_value: Option<String>,
    pub(crate) description: Option<String>,
}

impl NamedSyntax {
    /// Create an optional, undocumented syntax without a default value.
    pub fn new(
        name: impl Into<String>,
        kind: SyntaxKind,
        coordinates: Vec<Coordinate>,
        value_type: ValueType,
    ) -> Self {
        Self {
            name: name.into(),
            coordinates,
            kind,
            value_type,
            required: false,
            default_value: None,
            example_value: None,
            description: None,
        }
    }

    /// Mark the property as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the textual default value.
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the example value.
    pub fn with_example_value(mut self, value: impl Into<String>) -> Self {
        self.example_value = Some(value.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    /// The property name; also the name of the fact it produces.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The coordinates the property answers to.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// The syntax category.
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// The value type of the produced fact.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Whether the property must be supplied.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The textual default value.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// An example value, for documentation.
    pub fn example_value(&self) -> Option<&str> {
        self.example_value.as_deref()
    }

    /// A description, for documentation.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The position, when this is a positional property.
    pub fn position(&self) -> Option<usize> {
        self.coordinates.iter().find_map(|c| match c {
            Coordinate::Positional(position) => Some(*position),
            _ => None,
        })
    }

    /// Whether the property's fact is present after reduction regardless of the command line.
    pub(crate) fn is_guaranteed(&self) -> bool {
        self.required
            || self.default_value.is_some()
            || self.kind == SyntaxKind::Flag
            || self.value_type.shape() != Shape::Scalar
    }

    /// A display of every coordinate (ex: `-v/--verbose`).
    pub(crate) fn coordinates_display(&self) -> String {
        self.coordinates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}
