//! The type description consumed by the scanner.
//!
//! Rust has no runtime reflection, so a configurable type describes itself through [`Describable`].
//! The description is normally generated by `#[derive(Configurable)]`, but may also be written by hand with the builder Api below.
mod member;
mod value;

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

pub use member::*;
pub use value::*;

pub(crate) type WrapFn =
    Arc<dyn Fn(Box<dyn Any>) -> Result<Box<dyn Any>, InvocationError> + Send + Sync>;

/// Behaviour for a type to describe its members and metadata tags.
pub trait Describable: 'static {
    /// Produce the type description.
    fn describe() -> TypeDescriptor;
}

/// The configurable marker: name, description, discriminator and version of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurableTag {
    /// The program (or subcommand) name.
    pub name: Option<String>,
    /// A description, for documentation.
    pub description: Option<String>,
    /// The discriminator selecting this type under its multi-command parent.
    pub discriminator: Option<String>,
    /// A version, for documentation.
    pub version: Option<String>,
}

impl ConfigurableTag {
    /// An empty marker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the discriminator.
    pub fn discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    /// Set the version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A subcommand edge: the subcommand's description, and the conversion from the subcommand into its parent.
#[derive(Clone)]
pub struct SubcommandDescriptor {
    describe: fn() -> TypeDescriptor,
    wrap: WrapFn,
}

impl SubcommandDescriptor {
    /// Describe the subcommand `S` of parent `P`, where `wrap` converts a built `S` into a `P`.
    ///
    /// ### Example
    /// ```ignore
    /// enum Tool {
    ///     Fetch(Fetch),
    /// }
    ///
    /// SubcommandDescriptor::new::<Tool, Fetch, _>(Tool::Fetch)
    /// ```
    pub fn new<P, S, F>(wrap: F) -> Self
    where
        P: 'static,
        S: Describable,
        F: Fn(S) -> P + Send + Sync + 'static,
    {
        let wrap: WrapFn = Arc::new(move |built: Box<dyn Any>| {
            let subcommand = built
                .downcast::<S>()
                .map_err(|_| InvocationError::Instance {
                    expected: type_name::<S>(),
                })?;
            Ok(Box::new(wrap(*subcommand)) as Box<dyn Any>)
        });

        Self {
            describe: S::describe,
            wrap,
        }
    }

    /// Describe the subcommand.
    pub fn describe(&self) -> TypeDescriptor {
        (self.describe)()
    }

    pub(crate) fn wrap(&self) -> WrapFn {
        self.wrap.clone()
    }
}

impl std::fmt::Debug for SubcommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubcommandDescriptor{..}").finish()
    }
}

/// The description of a configurable type.
///
/// ### Example
/// ```
/// # use confer_core as confer;
/// use confer::*;
///
/// #[derive(Debug, Default)]
/// struct Greeting {
///     name: String,
/// }
///
/// impl Describable for Greeting {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::concrete::<Self>()
///             .configurable(ConfigurableTag::new().name("greet"))
///             .member(MemberDescriptor::creator(
///                 "default",
///                 Visibility::Public,
///                 Vec::default(),
///                 |_: &Facts| Ok(Greeting::default()),
///             ))
///             .member(
///                 MemberDescriptor::field(
///                     "name",
///                     Visibility::Public,
///                     ValueType::scalar::<String>(),
///                     |greeting: &mut Greeting, name: String| greeting.name = name,
///                 )
///                 .tag(Tag::Positional(PositionalTag::new(0).required())),
///             )
///     }
/// }
///
/// let greeting: Greeting = Pipeline::default().invoke(&["world"]).unwrap();
/// assert_eq!(greeting.name, "world");
/// ```
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    type_name: &'static str,
    type_id: TypeId,
    is_abstract: bool,
    configurable: Option<ConfigurableTag>,
    members: Vec<MemberDescriptor>,
    subcommands: Vec<SubcommandDescriptor>,
    permitted: Vec<SubcommandDescriptor>,
}

impl TypeDescriptor {
    fn new<T: 'static>(is_abstract: bool) -> Self {
        Self {
            type_name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            is_abstract,
            configurable: None,
            members: Vec::default(),
            subcommands: Vec::default(),
            permitted: Vec::default(),
        }
    }

    /// Describe an instantiable type `T`.
    pub fn concrete<T: 'static>() -> Self {
        Self::new::<T>(false)
    }

    /// Describe a type `T` which is never instantiated directly (ex: an enum of subcommands).
    pub fn abstract_type<T: 'static>() -> Self {
        Self::new::<T>(true)
    }

    /// Attach the configurable marker.
    pub fn configurable(mut self, tag: ConfigurableTag) -> Self {
        self.configurable = Some(tag);
        self
    }

    /// Add a member.
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// Add an explicitly listed subcommand.
    pub fn subcommand(mut self, subcommand: SubcommandDescriptor) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Add a subcommand of the sealed hierarchy (ex: an enum variant).
    pub fn permitted(mut self, subcommand: SubcommandDescriptor) -> Self {
        self.permitted.push(subcommand);
        self
    }

    /// The described type's name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The described type's [`TypeId`].
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Whether the described type is never instantiated directly.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The configurable marker, if present.
    pub fn configurable_tag(&self) -> Option<&ConfigurableTag> {
        self.configurable.as_ref()
    }

    /// The members, in declaration order.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// The explicitly listed subcommands.
    pub fn subcommands(&self) -> &[SubcommandDescriptor] {
        &self.subcommands
    }

    /// The subcommands of the sealed hierarchy.
    pub fn permitted_subcommands(&self) -> &[SubcommandDescriptor] {
        &self.permitted
    }

    /// Whether any subcommand is declared, explicitly or through the sealed hierarchy.
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty() || !self.permitted.is_empty()
    }

    /// A short, human readable name: the configurable name, or else the unqualified type name.
    pub fn display_name(&self) -> String {
        match self.configurable.as_ref().and_then(|tag| tag.name.clone()) {
            Some(name) => name,
            None => self
                .type_name
                .rsplit("::")
                .next()
                .unwrap_or(self.type_name)
                .to_string(),
        }
    }
}
