use tracing::trace;

use crate::describe::MemberKind;
use crate::error::ScanError;
use crate::scan::candidate::{CandidateRule, ScanContext};

/// Behaviour to nominate the members which create or modify the instance.
///
/// Nominators are consulted in order and their candidates concatenated; a member may be nominated at most once.
pub trait Nominator: Send + Sync {
    /// Nominate members of the type under scan.
    fn nominate<'d>(&self, context: &ScanContext<'d>) -> Result<Vec<CandidateRule<'d>>, ScanError>;
}

/// Nominates the eligible creators: the designated creator, followed by the public zero-parameter creator.
#[derive(Debug, Default)]
pub struct CreatorNominator;

impl Nominator for CreatorNominator {
    fn nominate<'d>(&self, context: &ScanContext<'d>) -> Result<Vec<CandidateRule<'d>>, ScanError> {
        let descriptor = context.descriptor();
        let creators: Vec<_> = descriptor
            .members()
            .iter()
            .filter(|member| matches!(member.kind(), MemberKind::Creator { .. }))
            .filter(|member| member.is_public())
            .collect();
        let designated: Vec<_> = creators
            .iter()
            .copied()
            .filter(|member| member.is_designated())
            .collect();

        if designated.len() > 1 {
            return Err(ScanError::AmbiguousCreator {
                type_name: descriptor.type_name().to_string(),
                creators: designated.iter().map(|m| m.name().to_string()).collect(),
            });
        }

        let default_constructors = creators.iter().copied().filter(|member| {
            !member.is_designated()
                && matches!(member.kind(), MemberKind::Creator { parameters, .. } if parameters.is_empty())
        });
        let eligible: Vec<CandidateRule<'d>> = designated
            .iter()
            .copied()
            .chain(default_constructors)
            .map(|member| CandidateRule {
                member,
                property: None,
            })
            .collect();

        if eligible.is_empty() {
            return Err(ScanError::NoCreator {
                type_name: descriptor.type_name().to_string(),
            });
        }

        trace!(
            "Nominated creators {:?} for '{}'.",
            eligible.iter().map(|c| c.member.name()).collect::<Vec<_>>(),
            descriptor.type_name()
        );
        Ok(eligible)
    }
}

/// Nominates the public writable fields and public setters of configured attributes.
#[derive(Debug, Default)]
pub struct SinkNominator;

impl Nominator for SinkNominator {
    fn nominate<'d>(&self, context: &ScanContext<'d>) -> Result<Vec<CandidateRule<'d>>, ScanError> {
        let mut candidates = Vec::default();

        for member in context.descriptor().members() {
            let writable = match member.kind() {
                MemberKind::Field { assign, .. } => assign.is_some(),
                MemberKind::Setter { .. } => true,
                _ => false,
            };

            if !writable || !member.is_public() {
                continue;
            }

            let property = context
                .attribute_of(member)
                .and_then(|attribute| context.property(&attribute).map(str::to_string));

            if let Some(property) = property {
                candidates.push(CandidateRule {
                    member,
                    property: Some(property),
                });
            }
        }

        Ok(candidates)
    }
}
