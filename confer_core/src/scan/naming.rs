//! Naming schemes: how members are grouped into attributes.
//!
//! Every member which reads or writes the same conceptual attribute (ex: the field `port`, the setter `set_port`, the getter `get_port`) belongs to one group.
//! Schemes are consulted in order; the first to name a member decides its attribute.
use crate::describe::{MemberDescriptor, MemberKind, ParameterDescriptor, Tag, TypeDescriptor, ValueType};

/// Names the attribute a member belongs to, or `None` when the scheme does not apply.
pub type NamingScheme = fn(&MemberDescriptor) -> Option<String>;

/// A field belongs to the attribute of its own name.
pub fn field_naming(member: &MemberDescriptor) -> Option<String> {
    match member.kind() {
        MemberKind::Field { .. } => Some(member.name().to_string()),
        _ => None,
    }
}

/// A setter `set_x` belongs to the attribute `x`.
pub fn setter_naming(member: &MemberDescriptor) -> Option<String> {
    match member.kind() {
        MemberKind::Setter { .. } => strip(member.name(), &["set_"]),
        _ => None,
    }
}

/// A getter `get_x` or `is_x` belongs to the attribute `x`.
pub fn getter_naming(member: &MemberDescriptor) -> Option<String> {
    match member.kind() {
        MemberKind::Getter { .. } => strip(member.name(), &["get_", "is_"]),
        _ => None,
    }
}

/// A record-style accessor `x` (getter or setter) belongs to the attribute `x`.
pub fn accessor_naming(member: &MemberDescriptor) -> Option<String> {
    match member.kind() {
        MemberKind::Getter { .. } | MemberKind::Setter { .. } => Some(member.name().to_string()),
        _ => None,
    }
}

fn strip(name: &str, prefixes: &[&str]) -> Option<String> {
    prefixes
        .iter()
        .filter_map(|prefix| name.strip_prefix(prefix))
        .find(|rest| !rest.is_empty())
        .map(str::to_string)
}

/// The naming schemes consulted by default, in order.
pub fn default_naming_schemes() -> Vec<NamingScheme> {
    vec![field_naming, setter_naming, getter_naming, accessor_naming]
}

/// The attribute a member belongs to under `schemes`.
pub(crate) fn attribute_of(member: &MemberDescriptor, schemes: &[NamingScheme]) -> Option<String> {
    schemes.iter().find_map(|scheme| scheme(member))
}

/// A group of members (and creator parameters) reading or writing the same attribute.
#[derive(Debug)]
pub(crate) struct Attribute<'d> {
    pub(crate) key: String,
    pub(crate) members: Vec<&'d MemberDescriptor>,
    pub(crate) parameters: Vec<&'d ParameterDescriptor>,
}

impl<'d> Attribute<'d> {
    fn new(key: String) -> Self {
        Self {
            key,
            members: Vec::default(),
            parameters: Vec::default(),
        }
    }

    /// Every tag across the group, paired with the value type of its carrier.
    pub(crate) fn tags(&self) -> Vec<(&'d Tag, &'d ValueType)> {
        let mut tags = Vec::default();

        for member in self.members.iter().copied() {
            let value_type = match member.kind() {
                MemberKind::Field { value_type, .. }
                | MemberKind::Getter { value_type }
                | MemberKind::Setter { value_type, .. } => value_type,
                MemberKind::Creator { .. } => continue,
            };
            tags.extend(member.tags().iter().map(|tag| (tag, value_type)));
        }

        for parameter in self.parameters.iter().copied() {
            tags.extend(
                parameter
                    .tags()
                    .iter()
                    .map(|tag| (tag, parameter.value_type())),
            );
        }

        tags
    }

    /// The property name: the first name override, or else the attribute key.
    pub(crate) fn property_name(&self) -> String {
        self.tags()
            .into_iter()
            .find_map(|(tag, _)| match tag {
                Tag::Name(name) => Some(name.clone()),
                _ => None,
            })
            .unwrap_or_else(|| self.key.clone())
    }
}

/// Group the members of `descriptor` into attributes, in order of first appearance.
pub(crate) fn attributes<'d>(
    descriptor: &'d TypeDescriptor,
    schemes: &[NamingScheme],
) -> Vec<Attribute<'d>> {
    let mut attributes: Vec<Attribute<'d>> = Vec::default();

    fn entry<'a, 'd>(attributes: &'a mut Vec<Attribute<'d>>, key: String) -> &'a mut Attribute<'d> {
        match attributes.iter().position(|a| a.key == key) {
            Some(index) => &mut attributes[index],
            None => {
                attributes.push(Attribute::new(key));
                let last = attributes.len() - 1;
                &mut attributes[last]
            }
        }
    }

    for member in descriptor.members() {
        if let MemberKind::Creator { parameters, .. } = member.kind() {
            for parameter in parameters {
                entry(&mut attributes, parameter.name().to_string())
                    .parameters
                    .push(parameter);
            }
        } else if let Some(key) = attribute_of(member, schemes) {
            entry(&mut attributes, key).members.push(member);
        }
    }

    attributes
}
