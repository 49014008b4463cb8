use crate::describe::{MemberKind, SwitchTag, Tag, ValueTag};
use crate::error::ScanError;
use crate::model::{is_long_switch, is_short_switch, Coordinate};
use crate::rules::{Invocation, MemberRef, NamedRule};
use crate::scan::candidate::{CandidateRule, CandidateSyntax, ScanContext};
use crate::scan::syntax::{NamedSyntax, SyntaxKind};

/// Behaviour to turn a nominated member into a rule.
///
/// Detectors are consulted in order; the first to return `Some` decides the member.
pub trait RuleDetector: Send + Sync {
    /// Detect the rule for `candidate`, or return `None` to decline.
    fn detect(&self, candidate: &CandidateRule<'_>, context: &ScanContext<'_>) -> Option<NamedRule>;
}

fn member_ref(candidate: &CandidateRule<'_>, context: &ScanContext<'_>, invocation: Invocation) -> MemberRef {
    MemberRef::new(
        context.descriptor().type_name(),
        candidate.member.name(),
        invocation,
    )
}

/// The designated creator consumes the facts of its parameters and produces the instance.
#[derive(Debug, Default)]
pub struct DesignatedCreatorDetector;

impl RuleDetector for DesignatedCreatorDetector {
    fn detect(&self, candidate: &CandidateRule<'_>, context: &ScanContext<'_>) -> Option<NamedRule> {
        match candidate.member.kind() {
            MemberKind::Creator { parameters, invoke } if candidate.member.is_designated() => {
                let antecedents: Vec<String> = parameters
                    .iter()
                    .map(|parameter| context.parameter_fact(parameter.name()))
                    .collect();
                Some(NamedRule::creator(
                    antecedents,
                    member_ref(candidate, context, Invocation::Create(invoke.clone())),
                ))
            }
            _ => None,
        }
    }
}

/// A zero-parameter creator produces the instance from nothing.
#[derive(Debug, Default)]
pub struct DefaultConstructorDetector;

impl RuleDetector for DefaultConstructorDetector {
    fn detect(&self, candidate: &CandidateRule<'_>, context: &ScanContext<'_>) -> Option<NamedRule> {
        match candidate.member.kind() {
            MemberKind::Creator { parameters, invoke } if parameters.is_empty() => {
                Some(NamedRule::creator(
                    Vec::<String>::default(),
                    member_ref(candidate, context, Invocation::Create(invoke.clone())),
                ))
            }
            _ => None,
        }
    }
}

/// A writable field consumes the instance and its property.
#[derive(Debug, Default)]
pub struct FieldAssignmentDetector;

impl RuleDetector for FieldAssignmentDetector {
    fn detect(&self, candidate: &CandidateRule<'_>, context: &ScanContext<'_>) -> Option<NamedRule> {
        match (candidate.member.kind(), &candidate.property) {
            (
                MemberKind::Field {
                    assign: Some(assign),
                    ..
                },
                Some(property),
            ) => Some(NamedRule::assignment(
                property.clone(),
                member_ref(
                    candidate,
                    context,
                    Invocation::Assign {
                        property: property.clone(),
                        assign: assign.clone(),
                    },
                ),
            )),
            _ => None,
        }
    }
}

/// A setter consumes the instance and its property.
#[derive(Debug, Default)]
pub struct SetterDetector;

impl RuleDetector for SetterDetector {
    fn detect(&self, candidate: &CandidateRule<'_>, context: &ScanContext<'_>) -> Option<NamedRule> {
        match (candidate.member.kind(), &candidate.property) {
            (MemberKind::Setter { assign, .. }, Some(property)) => Some(NamedRule::assignment(
                property.clone(),
                member_ref(
                    candidate,
                    context,
                    Invocation::Assign {
                        property: property.clone(),
                        assign: assign.clone(),
                    },
                ),
            )),
            _ => None,
        }
    }
}

/// Behaviour to turn a candidate property into a validated syntax.
///
/// Detectors are consulted in order; the first to return `Some` decides the candidate.
pub trait SyntaxDetector: Send + Sync {
    /// Detect (and validate) the syntax for `candidate`, or return `None` to decline.
    fn detect(&self, candidate: &CandidateSyntax) -> Option<Result<NamedSyntax, ScanError>>;
}

fn named(
    candidate: &CandidateSyntax,
    kind: SyntaxKind,
    coordinates: Vec<Coordinate>,
    value: &ValueTag,
) -> NamedSyntax {
    NamedSyntax {
        name: candidate.name.clone(),
        coordinates,
        kind,
        value_type: candidate.value_type.clone(),
        required: value.required,
        default_value: value.default_value.clone(),
        example_value: value.example_value.clone(),
        description: value.description.clone(),
    }
}

fn switches(name: &str, tag: &SwitchTag) -> Result<Vec<Coordinate>, ScanError> {
    let mut coordinates = Vec::default();

    if let Some(short) = tag.short {
        if !is_short_switch(short) {
            return Err(ScanError::InvalidSwitchName {
                name: name.to_string(),
                switch: format!("-{short}"),
            });
        }

        coordinates.push(Coordinate::ShortSwitch(short));
    }

    if let Some(long) = &tag.long {
        if !is_long_switch(long) {
            return Err(ScanError::InvalidSwitchName {
                name: name.to_string(),
                switch: format!("--{long}"),
            });
        }

        coordinates.push(Coordinate::LongSwitch(long.clone()));
    }

    if coordinates.is_empty() {
        return Err(ScanError::MissingSwitch {
            name: name.to_string(),
        });
    }

    Ok(coordinates)
}

/// Detects flags: `bool` properties addressed by switches.
#[derive(Debug, Default)]
pub struct FlagDetector;

impl SyntaxDetector for FlagDetector {
    fn detect(&self, candidate: &CandidateSyntax) -> Option<Result<NamedSyntax, ScanError>> {
        let tag = match &candidate.tag {
            Tag::Flag(tag) => tag,
            _ => return None,
        };

        if !candidate.value_type.is_boolean() {
            return Some(Err(ScanError::InvalidFlagType {
                name: candidate.name.clone(),
                type_name: candidate.value_type.type_name(),
            }));
        }

        Some(
            switches(&candidate.name, tag)
                .map(|coordinates| named(candidate, SyntaxKind::Flag, coordinates, &tag.value)),
        )
    }
}

/// Detects options: properties addressed by switches followed by a value.
#[derive(Debug, Default)]
pub struct OptionDetector;

impl SyntaxDetector for OptionDetector {
    fn detect(&self, candidate: &CandidateSyntax) -> Option<Result<NamedSyntax, ScanError>> {
        match &candidate.tag {
            Tag::Option(tag) => Some(
                switches(&candidate.name, tag)
                    .map(|coordinates| named(candidate, SyntaxKind::Option, coordinates, &tag.value)),
            ),
            _ => None,
        }
    }
}

/// Detects positional properties.
#[derive(Debug, Default)]
pub struct PositionalDetector;

impl SyntaxDetector for PositionalDetector {
    fn detect(&self, candidate: &CandidateSyntax) -> Option<Result<NamedSyntax, ScanError>> {
        match &candidate.tag {
            Tag::Positional(tag) => Some(Ok(named(
                candidate,
                SyntaxKind::Positional,
                vec![Coordinate::Positional(tag.position)],
                &tag.value,
            ))),
            _ => None,
        }
    }
}

/// Detects properties read from environment variables.
#[derive(Debug, Default)]
pub struct EnvironmentDetector;

impl SyntaxDetector for EnvironmentDetector {
    fn detect(&self, candidate: &CandidateSyntax) -> Option<Result<NamedSyntax, ScanError>> {
        match &candidate.tag {
            Tag::Environment(tag) => Some(Ok(named(
                candidate,
                SyntaxKind::Environment,
                vec![Coordinate::EnvironmentVariable(tag.name.clone())],
                &tag.value,
            ))),
            _ => None,
        }
    }
}

/// Detects properties read from process properties.
#[derive(Debug, Default)]
pub struct PropertyDetector;

impl SyntaxDetector for PropertyDetector {
    fn detect(&self, candidate: &CandidateSyntax) -> Option<Result<NamedSyntax, ScanError>> {
        match &candidate.tag {
            Tag::Property(tag) => Some(Ok(named(
                candidate,
                SyntaxKind::Property,
                vec![Coordinate::Property(tag.name.clone())],
                &tag.value,
            ))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{PositionalTag, ValueType, VariableTag};
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn candidate(tag: Tag, value_type: ValueType) -> CandidateSyntax {
        CandidateSyntax {
            attribute: "attribute".to_string(),
            name: "item".to_string(),
            tag,
            value_type,
        }
    }

    #[test]
    fn flag() {
        // Setup
        let candidate = candidate(
            Tag::Flag(SwitchTag::new().short('v').long("verbose").description("loud")),
            ValueType::scalar::<bool>(),
        );

        // Execute
        let syntax = FlagDetector.detect(&candidate).unwrap().unwrap();

        // Verify
        assert_eq!(syntax.kind(), SyntaxKind::Flag);
        assert_eq!(
            syntax.coordinates(),
            &[
                Coordinate::ShortSwitch('v'),
                Coordinate::LongSwitch("verbose".to_string())
            ]
        );
        assert_eq!(syntax.description(), Some("loud"));
        assert!(OptionDetector.detect(&candidate).is_none());
    }

    #[rstest]
    #[case(ValueType::scalar::<u8>())]
    #[case(ValueType::optional::<bool>())]
    #[case(ValueType::collection::<bool>())]
    fn flag_type(#[case] value_type: ValueType) {
        let candidate = candidate(Tag::Flag(SwitchTag::new().short('v')), value_type);
        assert_matches!(
            FlagDetector.detect(&candidate),
            Some(Err(ScanError::InvalidFlagType { name, .. })) if name == "item"
        );
    }

    #[rstest]
    #[case(SwitchTag::new(), ScanError::MissingSwitch { name: "item".to_string() })]
    #[case(SwitchTag::new().short('1'), ScanError::InvalidSwitchName { name: "item".to_string(), switch: "-1".to_string() })]
    #[case(SwitchTag::new().short('-'), ScanError::InvalidSwitchName { name: "item".to_string(), switch: "--".to_string() })]
    #[case(SwitchTag::new().long("-x"), ScanError::InvalidSwitchName { name: "item".to_string(), switch: "---x".to_string() })]
    #[case(SwitchTag::new().long("a b"), ScanError::InvalidSwitchName { name: "item".to_string(), switch: "--a b".to_string() })]
    fn option_invalid(#[case] tag: SwitchTag, #[case] expected: ScanError) {
        let candidate = candidate(Tag::Option(tag), ValueType::scalar::<String>());
        assert_eq!(OptionDetector.detect(&candidate).unwrap().unwrap_err(), expected);
    }

    #[test]
    fn option_long_only() {
        let candidate = candidate(
            Tag::Option(SwitchTag::new().long("out-dir").required()),
            ValueType::scalar::<String>(),
        );
        let syntax = OptionDetector.detect(&candidate).unwrap().unwrap();
        assert_eq!(
            syntax.coordinates(),
            &[Coordinate::LongSwitch("out-dir".to_string())]
        );
        assert!(syntax.is_required());
    }

    #[test]
    fn positional() {
        let candidate = candidate(
            Tag::Positional(PositionalTag::new(2).default_value("x").example_value("y")),
            ValueType::scalar::<String>(),
        );
        let syntax = PositionalDetector.detect(&candidate).unwrap().unwrap();
        assert_eq!(syntax.position(), Some(2));
        assert_eq!(syntax.default_value(), Some("x"));
        assert_eq!(syntax.example_value(), Some("y"));
    }

    #[test]
    fn variables() {
        let environment = candidate(
            Tag::Environment(VariableTag::new("APP_PORT")),
            ValueType::scalar::<u16>(),
        );
        let property = candidate(
            Tag::Property(VariableTag::new("app.port")),
            ValueType::scalar::<u16>(),
        );

        assert_eq!(
            EnvironmentDetector
                .detect(&environment)
                .unwrap()
                .unwrap()
                .coordinates(),
            &[Coordinate::EnvironmentVariable("APP_PORT".to_string())]
        );
        assert!(EnvironmentDetector.detect(&property).is_none());
        assert_eq!(
            PropertyDetector.detect(&property).unwrap().unwrap().kind(),
            SyntaxKind::Property
        );
    }
}
