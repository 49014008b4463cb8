use std::collections::BTreeMap;

use crate::describe::{MemberDescriptor, Tag, TypeDescriptor, ValueType};
use crate::scan::naming::{attribute_of, NamingScheme};

/// An unvalidated property: a single category tag found on an attribute.
#[derive(Debug, Clone)]
pub struct CandidateSyntax {
    /// The attribute key the tag was found on.
    pub attribute: String,
    /// The property name (after any name override).
    pub name: String,
    /// The category tag.
    pub tag: Tag,
    /// The value type of the tagged member or parameter.
    pub value_type: ValueType,
}

/// An unvalidated rule: a member nominated to create or modify the instance.
#[derive(Debug, Clone)]
pub struct CandidateRule<'d> {
    /// The nominated member.
    pub member: &'d MemberDescriptor,
    /// The property a sink writes, if any.
    pub property: Option<String>,
}

/// What nominators and rule detectors know about the type under scan.
#[derive(Debug)]
pub struct ScanContext<'d> {
    descriptor: &'d TypeDescriptor,
    schemes: &'d [NamingScheme],
    properties: BTreeMap<String, String>,
}

impl<'d> ScanContext<'d> {
    pub(crate) fn new(
        descriptor: &'d TypeDescriptor,
        schemes: &'d [NamingScheme],
        properties: BTreeMap<String, String>,
    ) -> Self {
        Self {
            descriptor,
            schemes,
            properties,
        }
    }

    /// The type under scan.
    pub fn descriptor(&self) -> &'d TypeDescriptor {
        self.descriptor
    }

    /// The attribute `member` belongs to, under the scanner's naming schemes.
    pub fn attribute_of(&self, member: &MemberDescriptor) -> Option<String> {
        attribute_of(member, self.schemes)
    }

    /// The property name of a configured attribute; `None` when the attribute has no syntax.
    pub fn property(&self, attribute: &str) -> Option<&str> {
        self.properties.get(attribute).map(String::as_str)
    }

    /// The name of the fact read for the creator parameter `parameter`.
    pub fn parameter_fact(&self, parameter: &str) -> String {
        self.property(parameter).unwrap_or(parameter).to_string()
    }
}
