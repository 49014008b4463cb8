use thiserror::Error;

use crate::describe::InvocationError;
use crate::model::Coordinate;

/// Any failure to build a configuration instance.
///
/// The three kinds are never conflated:
/// * [`ScanError`]: the type description is invalid (fault of the application author).
/// * [`SyntaxError`]: the command line cannot be read (fault of the user).
/// * [`ArgumentError`]: the command line was read, but its values cannot build an instance (fault of the user).
#[derive(Debug, Error)]
pub enum Error {
    /// The type description is invalid.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The command line cannot be read.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The values cannot build an instance.
    #[error(transparent)]
    Argument(#[from] ArgumentError),
}

impl Error {
    /// Whether the user asked for help.
    pub fn is_help_request(&self) -> bool {
        matches!(self, Error::Syntax(SyntaxError::HelpRequested { .. }))
    }
}

/// An invalid type description, detected before any argument is read.
///
/// Every `type_name` is the fully qualified name of the offending type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The type carries no configurable tag.
    #[error("Type '{type_name}' is not configurable.")]
    NotConfigurable {
        /// The described type.
        type_name: String,
    },

    /// A subcommand has no discriminator to be selected by.
    #[error("Subcommand '{type_name}' of '{parent}' does not declare a discriminator.")]
    MissingDiscriminator {
        /// The subcommand type.
        type_name: String,
        /// The multi-command type.
        parent: String,
    },

    /// Two subcommands share a discriminator.
    #[error("Multi-command '{type_name}' declares the discriminator '{discriminator}' more than once.")]
    DuplicateDiscriminator {
        /// The multi-command type.
        type_name: String,
        /// The shared discriminator.
        discriminator: String,
    },

    /// A discriminator which could never be typed on a command line.
    #[error("Type '{type_name}' declares the invalid discriminator '{discriminator}'.")]
    InvalidDiscriminator {
        /// The subcommand type.
        type_name: String,
        /// The declared discriminator.
        discriminator: String,
    },

    /// A type with subcommands is concrete.
    #[error("Multi-command '{type_name}' must be abstract.")]
    NotAbstract {
        /// The multi-command type.
        type_name: String,
    },

    /// An abstract type without subcommands.
    #[error("Abstract type '{type_name}' declares no subcommands.")]
    NoSubcommands {
        /// The abstract type.
        type_name: String,
    },

    /// Subcommands are both listed explicitly and sealed.
    #[error("Multi-command '{type_name}' declares both explicit and sealed subcommands.")]
    ConflictingSubcommands {
        /// The multi-command type.
        type_name: String,
    },

    /// Two properties answer to the same coordinate.
    #[error("Coordinate '{coordinate}' is used by more than one property.")]
    DuplicateCoordinate {
        /// The shared coordinate.
        coordinate: Coordinate,
    },

    /// Two properties share a name.
    #[error("Property name '{name}' is used more than once.")]
    DuplicatePropertyName {
        /// The shared property name.
        name: String,
    },

    /// The positions skip a number.
    #[error("No positional property is declared at position {position}.")]
    PositionalGap {
        /// The first undeclared position.
        position: usize,
    },

    /// A required positional cannot follow an optional one.
    #[error("Required positional property '{name}' follows an optional positional property.")]
    RequiredPositionalAfterOptional {
        /// The required property.
        name: String,
    },

    /// A collection positional swallows every later position.
    #[error("Collection positional property '{name}' must be the last positional property.")]
    CollectionPositionalNotLast {
        /// The collection property.
        name: String,
    },

    /// Alternative rules build different instances.
    #[error("Type '{type_name}' builds differently depending on its creator; the choices disagree on {antecedents:?}.")]
    DivergentRules {
        /// The configurable type.
        type_name: String,
        /// The facts the alternatives disagree on.
        antecedents: Vec<String>,
    },

    /// The rules cannot always build the instance or consume every property.
    #[error("Type '{type_name}' cannot assign the properties {properties:?}.")]
    InsufficientRules {
        /// The configurable type.
        type_name: String,
        /// The properties left unreachable or unconsumed.
        properties: Vec<String>,
    },

    /// An attribute has more than one category tag.
    #[error("Attribute '{attribute}' carries more than one parameter tag ({tags:?}).")]
    TooManyAnnotations {
        /// The attribute key.
        attribute: String,
        /// The labels of the conflicting tags.
        tags: Vec<&'static str>,
    },

    /// More than one creator is designated.
    #[error("Type '{type_name}' designates more than one creator ({creators:?}).")]
    AmbiguousCreator {
        /// The configurable type.
        type_name: String,
        /// The designated creator names.
        creators: Vec<String>,
    },

    /// Nothing can create the instance.
    #[error("Type '{type_name}' has no eligible creator.")]
    NoCreator {
        /// The configurable type.
        type_name: String,
    },

    /// Two nominators picked the same member.
    #[error("Member '{member}' is nominated more than once.")]
    DuplicateNomination {
        /// The qualified member name.
        member: String,
    },

    /// Every rule detector declined a nominated member.
    #[error("No rule detector decides the member '{member}'.")]
    UndetectableRule {
        /// The qualified member name.
        member: String,
    },

    /// Every syntax detector declined a tagged attribute.
    #[error("No syntax detector decides the attribute '{attribute}'.")]
    UndetectableSyntax {
        /// The attribute key.
        attribute: String,
    },

    /// A switch name outside the permitted alphabet.
    #[error("Property '{name}' declares the invalid switch '{switch}'.")]
    InvalidSwitchName {
        /// The property name.
        name: String,
        /// The switch as declared (ex: `--a b`).
        switch: String,
    },

    /// A switch property with no switch.
    #[error("Property '{name}' declares neither a short nor a long switch.")]
    MissingSwitch {
        /// The property name.
        name: String,
    },

    /// A flag over something other than `bool`.
    #[error("Flag property '{name}' must be a bool, not '{type_name}'.")]
    InvalidFlagType {
        /// The property name.
        name: String,
        /// The declared element type.
        type_name: &'static str,
    },

    /// A default value which does not deserialize.
    #[error("Property '{name}' declares the default '{value}', which cannot be deserialized: {message}")]
    InvalidDefaultValue {
        /// The property name.
        name: String,
        /// The declared default.
        value: String,
        /// The deserializer's message.
        message: String,
    },
}

/// A command line which cannot be read against the resolved command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A switch no property answers to.
    #[error("Unrecognized switch '{switch}'.")]
    UnrecognizedSwitch {
        /// The switch.
        switch: Coordinate,
    },

    /// A value no property answers to.
    #[error("Unrecognized argument '{value}' at {coordinate}.")]
    UnrecognizedArgument {
        /// Where the value was found.
        coordinate: Coordinate,
        /// The value.
        value: String,
    },

    /// A well formed discriminator which selects no subcommand.
    #[error("Unrecognized subcommand '{discriminator}' for '{command}'.")]
    UnrecognizedDiscriminator {
        /// The multi-command name.
        command: String,
        /// The discriminator.
        discriminator: String,
    },

    /// A token which cannot be a discriminator.
    #[error("'{token}' is not a valid subcommand for '{command}'.")]
    InvalidDiscriminator {
        /// The multi-command name.
        command: String,
        /// The token.
        token: String,
    },

    /// The arguments ran out before a concrete command was selected.
    #[error("Missing subcommand for '{command}'.")]
    InsufficientDiscriminators {
        /// The multi-command name.
        command: String,
    },

    /// A switch without its value.
    #[error("Switch '{switch}' requires a value.")]
    MissingValue {
        /// The switch.
        switch: Coordinate,
    },

    /// An attached value on a flag (ex: `--verbose=yes`).
    #[error("Flag '{switch}' does not take a value (received '{value}').")]
    FlagValue {
        /// The flag.
        switch: Coordinate,
        /// The attached value.
        value: String,
    },

    /// The help switch was given.
    #[error("Help requested for '{command}'.")]
    HelpRequested {
        /// The resolved command name.
        command: String,
    },
}

/// Values which cannot build an instance.
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// A value which does not deserialize into the property's type.
    #[error("'{value}' at {coordinate} cannot be read as {type_name} for '{name}': {message}")]
    Deserialization {
        /// The property name.
        name: String,
        /// Where the value was found.
        coordinate: Coordinate,
        /// The value.
        value: String,
        /// The element type.
        type_name: &'static str,
        /// The deserializer's message.
        message: String,
    },

    /// A required property received no value.
    #[error("Required property '{name}' was not provided (via {coordinates}).")]
    MissingRequired {
        /// The property name.
        name: String,
        /// A display of the coordinates it answers to.
        coordinates: String,
    },

    /// A creator or sink failed.
    #[error("Failed to evaluate '{rule}': {source}")]
    RuleEvaluation {
        /// The rule name.
        rule: String,
        /// The failure.
        #[source]
        source: InvocationError,
    },

    /// The rules ran to completion without producing the instance.
    #[error("Instance of '{type_name}' was not constructed.")]
    NotConstructed {
        /// The configurable type.
        type_name: String,
    },
}
