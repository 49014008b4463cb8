//! Scanning: a type description in, a validated command out.
//!
//! Scanning is where every authoring mistake is caught.
//! Per concrete type, the scanner:
//! 1. groups members into attributes (see [`NamingScheme`]),
//! 2. detects a [`NamedSyntax`] from each attribute's category tag (see [`SyntaxDetector`]),
//! 3. nominates the members which create or modify the instance (see [`Nominator`]),
//! 4. detects a [`NamedRule`] from each nominated member (see [`RuleDetector`]),
//! 5. statically verifies that the rules can always build the instance, consume every property, and do not diverge.
mod candidate;
mod detect;
mod naming;
mod nominate;
pub(crate) mod syntax;
mod validate;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::command::{Command, MultiCommand, SingleCommand, Subcommand};
use crate::constant::INSTANCE;
use crate::deserialize::DeserializerRegistry;
use crate::describe::TypeDescriptor;
use crate::error::ScanError;
use crate::model::Discriminator;
use crate::rules::{analysis, display_fact, NamedRule};

pub use candidate::*;
pub use detect::*;
pub use naming::{
    accessor_naming, default_naming_schemes, field_naming, getter_naming, setter_naming,
    NamingScheme,
};
pub use nominate::*;
pub use syntax::{NamedSyntax, SyntaxKind};

/// Scans type descriptions into commands.
///
/// Every strategy list (naming schemes, nominators, rule detectors, syntax detectors) is pluggable.
pub struct Scanner {
    schemes: Vec<NamingScheme>,
    nominators: Vec<Box<dyn Nominator>>,
    rule_detectors: Vec<Box<dyn RuleDetector>>,
    syntax_detectors: Vec<Box<dyn SyntaxDetector>>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            schemes: default_naming_schemes(),
            nominators: vec![Box::new(CreatorNominator), Box::new(SinkNominator)],
            rule_detectors: vec![
                Box::new(DesignatedCreatorDetector),
                Box::new(DefaultConstructorDetector),
                Box::new(FieldAssignmentDetector),
                Box::new(SetterDetector),
            ],
            syntax_detectors: vec![
                Box::new(FlagDetector),
                Box::new(OptionDetector),
                Box::new(PositionalDetector),
                Box::new(EnvironmentDetector),
                Box::new(PropertyDetector),
            ],
        }
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("schemes", &self.schemes.len())
            .field("nominators", &self.nominators.len())
            .field("rule_detectors", &self.rule_detectors.len())
            .field("syntax_detectors", &self.syntax_detectors.len())
            .finish()
    }
}

impl Scanner {
    /// Consult `scheme` ahead of the existing naming schemes.
    pub fn with_naming_scheme(mut self, scheme: NamingScheme) -> Self {
        self.schemes.insert(0, scheme);
        self
    }

    /// Consult `nominator` after the existing nominators.
    pub fn with_nominator(mut self, nominator: impl Nominator + 'static) -> Self {
        self.nominators.push(Box::new(nominator));
        self
    }

    /// Consult `detector` ahead of the existing rule detectors.
    pub fn with_rule_detector(mut self, detector: impl RuleDetector + 'static) -> Self {
        self.rule_detectors.insert(0, Box::new(detector));
        self
    }

    /// Consult `detector` ahead of the existing syntax detectors.
    pub fn with_syntax_detector(mut self, detector: impl SyntaxDetector + 'static) -> Self {
        self.syntax_detectors.insert(0, Box::new(detector));
        self
    }

    /// Scan `descriptor` (and, recursively, its subcommands) into a command.
    pub fn scan(
        &self,
        descriptor: &TypeDescriptor,
        registry: &DeserializerRegistry,
    ) -> Result<Command, ScanError> {
        let tag = descriptor
            .configurable_tag()
            .ok_or_else(|| ScanError::NotConfigurable {
                type_name: descriptor.type_name().to_string(),
            })?;

        if descriptor.has_subcommands() {
            self.scan_multi(descriptor, registry).map(Command::Multi)
        } else if descriptor.is_abstract() {
            Err(ScanError::NoSubcommands {
                type_name: descriptor.type_name().to_string(),
            })
        } else {
            debug!("Scanning '{}' ({:?}).", descriptor.type_name(), tag.name);
            self.scan_single(descriptor, registry).map(Command::Single)
        }
    }

    fn scan_multi(
        &self,
        descriptor: &TypeDescriptor,
        registry: &DeserializerRegistry,
    ) -> Result<MultiCommand, ScanError> {
        let type_name = descriptor.type_name().to_string();

        if !descriptor.subcommands().is_empty() && !descriptor.permitted_subcommands().is_empty() {
            return Err(ScanError::ConflictingSubcommands { type_name });
        }

        if !descriptor.is_abstract() {
            return Err(ScanError::NotAbstract { type_name });
        }

        let mut subcommands = BTreeMap::default();

        for edge in descriptor
            .subcommands()
            .iter()
            .chain(descriptor.permitted_subcommands())
        {
            let subdescriptor = edge.describe();
            let discriminator = subdescriptor
                .configurable_tag()
                .ok_or_else(|| ScanError::NotConfigurable {
                    type_name: subdescriptor.type_name().to_string(),
                })?
                .discriminator
                .clone()
                .ok_or_else(|| ScanError::MissingDiscriminator {
                    type_name: subdescriptor.type_name().to_string(),
                    parent: type_name.clone(),
                })?;
            let discriminator: Discriminator =
                discriminator
                    .parse()
                    .map_err(|_| ScanError::InvalidDiscriminator {
                        type_name: subdescriptor.type_name().to_string(),
                        discriminator: discriminator.clone(),
                    })?;

            if subcommands.contains_key(&discriminator) {
                return Err(ScanError::DuplicateDiscriminator {
                    type_name,
                    discriminator: discriminator.to_string(),
                });
            }

            trace!("Scanning subcommand '{discriminator}' of '{type_name}'.");
            let command = self.scan(&subdescriptor, registry)?;
            subcommands.insert(
                discriminator,
                Subcommand {
                    command,
                    wrap: edge.wrap(),
                },
            );
        }

        Ok(MultiCommand {
            type_name: descriptor.type_name(),
            name: descriptor.display_name(),
            tag: descriptor.configurable_tag().cloned().unwrap_or_default(),
            subcommands,
        })
    }

    fn scan_single(
        &self,
        descriptor: &TypeDescriptor,
        registry: &DeserializerRegistry,
    ) -> Result<SingleCommand, ScanError> {
        let syntax = self.detect_syntax(descriptor)?;
        validate::validate(&syntax, registry)?;

        let properties: BTreeMap<String, String> = naming::attributes(descriptor, &self.schemes)
            .into_iter()
            .filter(|attribute| attribute.tags().iter().any(|(tag, _)| tag.is_category()))
            .map(|attribute| {
                let name = attribute.property_name();
                (attribute.key, name)
            })
            .collect();
        let context = ScanContext::new(descriptor, &self.schemes, properties);
        let rules = self.detect_rules(&context)?;
        verify(descriptor, &syntax, &rules)?;

        Ok(SingleCommand {
            type_name: descriptor.type_name(),
            name: descriptor.display_name(),
            tag: descriptor.configurable_tag().cloned().unwrap_or_default(),
            syntax,
            rules,
        })
    }

    fn detect_syntax(&self, descriptor: &TypeDescriptor) -> Result<Vec<NamedSyntax>, ScanError> {
        let mut syntax = Vec::default();

        for attribute in naming::attributes(descriptor, &self.schemes) {
            let tags = attribute.tags();
            let categories: Vec<_> = tags.iter().filter(|(tag, _)| tag.is_category()).collect();

            let (tag, value_type) = match categories.as_slice() {
                [] => continue,
                [single] => **single,
                _ => {
                    return Err(ScanError::TooManyAnnotations {
                        attribute: attribute.key.clone(),
                        tags: categories.iter().map(|(tag, _)| tag.label()).collect(),
                    })
                }
            };

            let candidate = CandidateSyntax {
                attribute: attribute.key.clone(),
                name: attribute.property_name(),
                tag: tag.clone(),
                value_type: value_type.clone(),
            };
            let detected = self
                .syntax_detectors
                .iter()
                .find_map(|detector| detector.detect(&candidate))
                .ok_or_else(|| ScanError::UndetectableSyntax {
                    attribute: attribute.key.clone(),
                })??;
            trace!("Detected {} '{}'.", detected.kind(), detected.name());
            syntax.push(detected);
        }

        Ok(syntax)
    }

    fn detect_rules(&self, context: &ScanContext<'_>) -> Result<Vec<NamedRule>, ScanError> {
        let type_name = context.descriptor().type_name();
        let mut candidates: Vec<CandidateRule<'_>> = Vec::default();

        for nominator in &self.nominators {
            for candidate in nominator.nominate(context)? {
                if candidates
                    .iter()
                    .any(|existing| std::ptr::eq(existing.member, candidate.member))
                {
                    return Err(ScanError::DuplicateNomination {
                        member: format!("{type_name}::{}", candidate.member.name()),
                    });
                }

                candidates.push(candidate);
            }
        }

        let mut rules = Vec::with_capacity(candidates.len());

        for candidate in &candidates {
            let rule = self
                .rule_detectors
                .iter()
                .find_map(|detector| detector.detect(candidate, context))
                .ok_or_else(|| ScanError::UndetectableRule {
                    member: format!("{type_name}::{}", candidate.member.name()),
                })?;
            trace!("Detected rule {rule}.");
            rules.push(rule);
        }

        Ok(rules)
    }
}

/// Static verification of a command's rules against its syntax.
///
/// 1. Seeded with only the guaranteed properties, the rules must produce the instance.
/// 2. The choice among alternative sources (ex: two creators) must not change what is built.
/// 3. Seeded with every property, the rules must consume every property.
fn verify(
    descriptor: &TypeDescriptor,
    syntax: &[NamedSyntax],
    rules: &[NamedRule],
) -> Result<(), ScanError> {
    let type_name = descriptor.type_name().to_string();
    let guaranteed: BTreeSet<String> = syntax
        .iter()
        .filter(|property| property.is_guaranteed())
        .map(|property| property.name().to_string())
        .collect();
    let instance = BTreeSet::from([INSTANCE.to_string()]);

    if let Err(insufficiency) = analysis::verify(&guaranteed, &instance, rules) {
        let mut reachable = guaranteed.clone();
        reachable.extend(insufficiency.reaction.produced.iter().cloned());
        let mut missing: BTreeSet<String> = rules
            .iter()
            .filter(|rule| rule.consequent() == Some(INSTANCE))
            .flat_map(|rule| rule.antecedents().iter())
            .filter(|antecedent| !reachable.contains(*antecedent))
            .cloned()
            .collect();

        if missing.is_empty() {
            missing = insufficiency
                .gap
                .iter()
                .map(|name| display_fact(name).to_string())
                .collect();
        }

        return Err(ScanError::InsufficientRules {
            type_name,
            properties: missing.into_iter().collect(),
        });
    }

    let everything: BTreeSet<String> = syntax
        .iter()
        .map(|property| property.name().to_string())
        .collect();

    if let Err(disagreement) = analysis::divergence(&everything, rules) {
        return Err(ScanError::DivergentRules {
            type_name,
            antecedents: disagreement
                .iter()
                .map(|name| display_fact(name).to_string())
                .collect(),
        });
    }

    let mut necessary = everything.clone();
    necessary.insert(INSTANCE.to_string());

    if let Err(insufficiency) = analysis::verify(&everything, &necessary, rules) {
        return Err(ScanError::InsufficientRules {
            type_name,
            properties: insufficiency
                .gap
                .iter()
                .map(|name| display_fact(name).to_string())
                .collect(),
        });
    }

    debug!(
        "Verified '{}': {} propert(ies), {} rule(s).",
        descriptor.type_name(),
        syntax.len(),
        rules.len()
    );
    Ok(())
}
