use std::any::{type_name, Any};
use std::sync::Arc;

use crate::describe::value::{Facts, InvocationError, ValueType};

pub(crate) type CreatorFn =
    Arc<dyn Fn(&Facts) -> Result<Box<dyn Any>, InvocationError> + Send + Sync>;
pub(crate) type AssignFn =
    Arc<dyn Fn(&mut dyn Any, &dyn Any) -> Result<(), InvocationError> + Send + Sync>;

/// Whether a member may be invoked from outside its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// `pub`
    Public,
    /// Anything narrower than `pub`.
    Private,
}

/// The settings shared by every parameter-category tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueTag {
    /// Whether the property must be supplied.
    pub required: bool,
    /// The textual default, deserialized when the property is not supplied.
    pub default_value: Option<String>,
    /// An example value, for documentation.
    pub example_value: Option<String>,
    /// A description, for documentation.
    pub description: Option<String>,
}

macro_rules! value_tag_methods {
    () => {
        /// Mark the property as required.
        pub fn required(mut self) -> Self {
            self.value.required = true;
            self
        }

        /// Set the textual default value.
        pub fn default_value(mut self, value: impl Into<String>) -> Self {
            self.value.default_value = Some(value.into());
            self
        }

        /// Set the example value.
        pub fn example_value(mut self, value: impl Into<String>) -> Self {
            self.value.example_value = Some(value.into());
            self
        }

        /// Set the description.
        pub fn description(mut self, description: impl Into<String>) -> Self {
            self.value.description = Some(description.into());
            self
        }
    };
}

/// Payload of the flag and option tags: a property addressed by `-x` and/or `--name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchTag {
    /// The short switch, without its `-`.
    pub short: Option<char>,
    /// The long switch, without its `--`.
    pub long: Option<String>,
    /// Shared value settings.
    pub value: ValueTag,
}

impl SwitchTag {
    /// A switch tag with neither a short nor a long name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the short switch.
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Set the long switch.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    value_tag_methods!();
}

/// Payload of the positional tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalTag {
    /// The zero-based position.
    pub position: usize,
    /// Shared value settings.
    pub value: ValueTag,
}

impl PositionalTag {
    /// A positional tag at `position`.
    pub fn new(position: usize) -> Self {
        Self {
            position,
            value: ValueTag::default(),
        }
    }

    value_tag_methods!();
}

/// Payload of the environment and property tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTag {
    /// The variable (or property) name to look up.
    pub name: String,
    /// Shared value settings.
    pub value: ValueTag,
}

impl VariableTag {
    /// A variable tag looking up `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ValueTag::default(),
        }
    }

    value_tag_methods!();
}

/// Declarative metadata attached to a member or creator parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// Marks the designated creator.
    Creator,
    /// A no-value switch, reduced to `true` when present.
    Flag(SwitchTag),
    /// A switch followed by a value.
    Option(SwitchTag),
    /// A positional argument.
    Positional(PositionalTag),
    /// An environment variable.
    Environment(VariableTag),
    /// A process property.
    Property(VariableTag),
    /// Overrides the property name.
    Name(String),
}

impl Tag {
    /// Whether this tag is one of the parameter categories (flag, option, positional, environment, property).
    pub fn is_category(&self) -> bool {
        matches!(
            self,
            Tag::Flag(_) | Tag::Option(_) | Tag::Positional(_) | Tag::Environment(_) | Tag::Property(_)
        )
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Tag::Creator => "creator",
            Tag::Flag(_) => "flag",
            Tag::Option(_) => "option",
            Tag::Positional(_) => "positional",
            Tag::Environment(_) => "environment",
            Tag::Property(_) => "property",
            Tag::Name(_) => "name",
        }
    }
}

/// A creator parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    name: String,
    value_type: ValueType,
    tags: Vec<Tag>,
}

impl ParameterDescriptor {
    /// Describe the parameter `name` of type `value_type`.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            tags: Vec::default(),
        }
    }

    /// Attach a tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// The declared parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter's value type.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// The attached tags.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

/// What a member is, along with the means to invoke it.
#[derive(Clone)]
pub enum MemberKind {
    /// A constructor or factory function producing the instance.
    Creator {
        /// The declared parameters, in order.
        parameters: Vec<ParameterDescriptor>,
        #[doc(hidden)]
        invoke: CreatorFn,
    },
    /// A field; `assign` is absent when the field cannot be written.
    Field {
        /// The field's value type.
        value_type: ValueType,
        #[doc(hidden)]
        assign: Option<AssignFn>,
    },
    /// A zero-argument accessor.
    Getter {
        /// The returned value type.
        value_type: ValueType,
    },
    /// A single-argument accessor.
    Setter {
        /// The accepted value type.
        value_type: ValueType,
        #[doc(hidden)]
        assign: AssignFn,
    },
}

impl std::fmt::Debug for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberKind::Creator { parameters, .. } => f
                .debug_struct("Creator")
                .field("parameters", parameters)
                .finish(),
            MemberKind::Field { value_type, assign } => f
                .debug_struct("Field")
                .field("value_type", value_type)
                .field("mutable", &assign.is_some())
                .finish(),
            MemberKind::Getter { value_type } => f
                .debug_struct("Getter")
                .field("value_type", value_type)
                .finish(),
            MemberKind::Setter { value_type, .. } => f
                .debug_struct("Setter")
                .field("value_type", value_type)
                .finish(),
        }
    }
}

fn erase_assign<S, T, F>(assign: F) -> AssignFn
where
    S: 'static,
    T: Clone + 'static,
    F: Fn(&mut S, T) -> Result<(), InvocationError> + Send + Sync + 'static,
{
    Arc::new(move |instance: &mut dyn Any, value: &dyn Any| {
        let instance = instance
            .downcast_mut::<S>()
            .ok_or(InvocationError::Instance {
                expected: type_name::<S>(),
            })?;
        let value = value
            .downcast_ref::<T>()
            .cloned()
            .ok_or(InvocationError::Value {
                expected: type_name::<T>(),
            })?;
        assign(instance, value)
    })
}

/// A member of a described type: creator, field, getter or setter.
///
/// ### Example
/// ```
/// # use confer_core as confer;
/// use confer::{MemberDescriptor, SwitchTag, Tag, ValueType, Visibility};
///
/// #[derive(Default)]
/// struct Config {
///     verbose: bool,
/// }
///
/// let member = MemberDescriptor::field(
///     "verbose",
///     Visibility::Public,
///     ValueType::scalar::<bool>(),
///     |config: &mut Config, value: bool| config.verbose = value,
/// )
/// .tag(Tag::Flag(SwitchTag::new().short('v').long("verbose")));
/// assert_eq!(member.name(), "verbose");
/// ```
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    name: String,
    visibility: Visibility,
    kind: MemberKind,
    tags: Vec<Tag>,
}

impl MemberDescriptor {
    fn new(name: impl Into<String>, visibility: Visibility, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            visibility,
            kind,
            tags: Vec::default(),
        }
    }

    /// Describe a creator of `S` taking `parameters`.
    /// The `invoke` function reads its arguments from the facts by parameter name.
    pub fn creator<S, F>(
        name: impl Into<String>,
        visibility: Visibility,
        parameters: Vec<ParameterDescriptor>,
        invoke: F,
    ) -> Self
    where
        S: 'static,
        F: Fn(&Facts) -> Result<S, InvocationError> + Send + Sync + 'static,
    {
        let invoke: CreatorFn =
            Arc::new(move |facts: &Facts| invoke(facts).map(|s| Box::new(s) as Box<dyn Any>));
        Self::new(name, visibility, MemberKind::Creator { parameters, invoke })
    }

    /// Describe a writable field of `S` holding a `T`.
    pub fn field<S, T, F>(
        name: impl Into<String>,
        visibility: Visibility,
        value_type: ValueType,
        assign: F,
    ) -> Self
    where
        S: 'static,
        T: Clone + 'static,
        F: Fn(&mut S, T) + Send + Sync + 'static,
    {
        let assign = erase_assign(move |s: &mut S, t: T| {
            assign(s, t);
            Ok(())
        });
        Self::new(
            name,
            visibility,
            MemberKind::Field {
                value_type,
                assign: Some(assign),
            },
        )
    }

    /// Describe a field that cannot be written.
    pub fn read_only_field(
        name: impl Into<String>,
        visibility: Visibility,
        value_type: ValueType,
    ) -> Self {
        Self::new(
            name,
            visibility,
            MemberKind::Field {
                value_type,
                assign: None,
            },
        )
    }

    /// Describe a zero-argument accessor returning a value of `value_type`.
    pub fn getter(name: impl Into<String>, visibility: Visibility, value_type: ValueType) -> Self {
        Self::new(name, visibility, MemberKind::Getter { value_type })
    }

    /// Describe a single-argument accessor of `S` accepting a `T`.
    pub fn setter<S, T, F>(
        name: impl Into<String>,
        visibility: Visibility,
        value_type: ValueType,
        assign: F,
    ) -> Self
    where
        S: 'static,
        T: Clone + 'static,
        F: Fn(&mut S, T) -> Result<(), InvocationError> + Send + Sync + 'static,
    {
        Self::new(
            name,
            visibility,
            MemberKind::Setter {
                value_type,
                assign: erase_assign(assign),
            },
        )
    }

    /// Attach a tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// The declared member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member's visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the member is `pub`.
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// What the member is.
    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    /// The attached tags.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Whether the member carries [`Tag::Creator`].
    pub fn is_designated(&self) -> bool {
        self.tags.iter().any(|tag| tag == &Tag::Creator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;
    use assert_matches::assert_matches;

    #[derive(Debug, Default, PartialEq)]
    struct Target {
        value: u32,
    }

    #[test]
    fn field_assign() {
        // Setup
        let member = MemberDescriptor::field(
            "value",
            Visibility::Public,
            ValueType::scalar::<u32>(),
            |target: &mut Target, value: u32| target.value = value,
        );
        let mut target = Target::default();
        let assign = match member.kind() {
            MemberKind::Field {
                assign: Some(assign),
                ..
            } => assign.clone(),
            _ => unreachable!("un-planned test case"),
        };

        // Execute
        assign(&mut target, &7u32).unwrap();

        // Verify
        assert_eq!(target, Target { value: 7 });
        assert_matches!(
            assign(&mut target, &"7".to_string()),
            Err(InvocationError::Value { .. })
        );
        assert_matches!(
            assign(&mut 0u8, &7u32),
            Err(InvocationError::Instance { .. })
        );
    }

    #[test]
    fn setter_failure() {
        // Setup
        let member = MemberDescriptor::setter(
            "set_value",
            Visibility::Public,
            ValueType::scalar::<u32>(),
            |_: &mut Target, value: u32| Err(format!("{value} is odd").into()),
        );
        let assign = match member.kind() {
            MemberKind::Setter { assign, .. } => assign.clone(),
            _ => unreachable!("un-planned test case"),
        };

        // Execute
        let error = assign(&mut Target::default(), &3u32).unwrap_err();

        // Verify
        assert_eq!(error.to_string(), "3 is odd");
    }

    #[test]
    fn member_kind_debug() {
        let field = MemberDescriptor::field(
            "value",
            Visibility::Public,
            ValueType::scalar::<u32>(),
            |target: &mut Target, value: u32| target.value = value,
        );
        let getter = MemberDescriptor::getter("get_value", Visibility::Public, ValueType::scalar::<u32>());

        let field = format!("{:?}", field.kind());
        assert!(field.starts_with("Field {"), "{field}");
        assert_contains!(field, "mutable: true");
        assert!(format!("{:?}", getter.kind()).starts_with("Getter {"));
    }

    #[test]
    fn creator_invoke() {
        // Setup
        let member = MemberDescriptor::creator(
            "new",
            Visibility::Public,
            vec![ParameterDescriptor::new("value", ValueType::scalar::<u32>())],
            |facts: &Facts| {
                Ok(Target {
                    value: facts.get("value")?,
                })
            },
        )
        .tag(Tag::Creator);
        let invoke = match member.kind() {
            MemberKind::Creator { invoke, .. } => invoke.clone(),
            _ => unreachable!("un-planned test case"),
        };
        let mut facts = Facts::new();
        facts.insert("value", Box::new(3u32));

        // Execute
        let built = invoke(&facts).unwrap();

        // Verify
        assert!(member.is_designated());
        assert_eq!(*built.downcast::<Target>().unwrap(), Target { value: 3 });
        assert_matches!(invoke(&Facts::new()), Err(InvocationError::Fact(_)));
    }

    #[test]
    fn tag_builders() {
        let tag = SwitchTag::new()
            .short('o')
            .long("output")
            .required()
            .default_value("a")
            .example_value("b")
            .description("c");
        assert_eq!(
            tag,
            SwitchTag {
                short: Some('o'),
                long: Some("output".to_string()),
                value: ValueTag {
                    required: true,
                    default_value: Some("a".to_string()),
                    example_value: Some("b".to_string()),
                    description: Some("c".to_string()),
                },
            }
        );
        assert!(Tag::Positional(PositionalTag::new(0)).is_category());
        assert!(Tag::Environment(VariableTag::new("HOME")).is_category());
        assert!(!Tag::Creator.is_category());
        assert!(!Tag::Name("x".to_string()).is_category());
    }
}
