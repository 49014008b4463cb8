use std::any::Any;

use crate::constant::INSTANCE;
use crate::describe::{FactError, Facts, InvocationError};
use crate::rules::{Invocation, NamedRule};

/// The outcome of evaluating a rule: the produced value (for sources), or nothing (for sinks).
pub type Evaluation = Result<Option<Box<dyn Any>>, InvocationError>;

/// Behaviour to evaluate a ready rule against the facts.
///
/// Evaluators are consulted in order; the first to return `Some` decides the rule.
pub trait RuleEvaluator: Send + Sync {
    /// Evaluate `rule`, or return `None` to decline it.
    fn evaluate(&self, rule: &NamedRule, facts: &mut Facts) -> Option<Evaluation>;
}

/// Evaluates creator rules by invoking the creator with the facts.
#[derive(Debug, Default)]
pub struct CreatorEvaluator;

impl RuleEvaluator for CreatorEvaluator {
    fn evaluate(&self, rule: &NamedRule, facts: &mut Facts) -> Option<Evaluation> {
        match rule.nominated().invocation() {
            Invocation::Create(invoke) => Some(invoke(facts).map(Some)),
            _ => None,
        }
    }
}

/// Evaluates sink rules by writing the property's fact into the instance.
#[derive(Debug, Default)]
pub struct AssignmentEvaluator;

impl RuleEvaluator for AssignmentEvaluator {
    fn evaluate(&self, rule: &NamedRule, facts: &mut Facts) -> Option<Evaluation> {
        let (property, assign) = match rule.nominated().invocation() {
            Invocation::Assign { property, assign } => (property, assign),
            _ => return None,
        };

        let mut instance = match facts.remove(INSTANCE) {
            Some(instance) => instance,
            None => {
                return Some(Err(FactError::Missing {
                    name: INSTANCE.to_string(),
                }
                .into()))
            }
        };

        let result = match facts.get_any(property) {
            Some(value) => assign(instance.as_mut(), value),
            None => Err(FactError::Missing {
                name: property.clone(),
            }
            .into()),
        };
        facts.insert(INSTANCE, instance);

        Some(result.map(|_| None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{MemberDescriptor, MemberKind, ValueType, Visibility};
    use crate::rules::MemberRef;
    use assert_matches::assert_matches;

    #[derive(Debug, Default, PartialEq)]
    struct Config {
        port: u16,
    }

    fn assignment() -> NamedRule {
        let member = MemberDescriptor::field(
            "port",
            Visibility::Public,
            ValueType::scalar::<u16>(),
            |config: &mut Config, port: u16| config.port = port,
        );
        let assign = match member.kind() {
            MemberKind::Field {
                assign: Some(assign),
                ..
            } => assign.clone(),
            _ => unreachable!("un-planned test case"),
        };
        NamedRule::assignment(
            "port",
            MemberRef::new(
                "Config",
                "port",
                Invocation::Assign {
                    property: "port".to_string(),
                    assign,
                },
            ),
        )
    }

    #[test]
    fn assignment_evaluate() {
        // Setup
        let rule = assignment();
        let mut facts = Facts::new();
        facts.insert(INSTANCE, Box::new(Config::default()));
        facts.insert("port", Box::new(8080u16));

        // Execute
        let result = AssignmentEvaluator.evaluate(&rule, &mut facts);

        // Verify
        assert_matches!(result, Some(Ok(None)));
        assert_eq!(facts.len(), 2);
        assert_eq!(
            facts.remove(INSTANCE).unwrap().downcast::<Config>().unwrap(),
            Box::new(Config { port: 8080 })
        );
    }

    #[test]
    fn assignment_missing_instance() {
        let rule = assignment();
        let mut facts = Facts::new();
        facts.insert("port", Box::new(8080u16));

        assert_matches!(
            AssignmentEvaluator.evaluate(&rule, &mut facts),
            Some(Err(InvocationError::Fact(FactError::Missing { name }))) if name == INSTANCE
        );
    }

    #[test]
    fn assignment_missing_property() {
        // Setup
        let rule = assignment();
        let mut facts = Facts::new();
        facts.insert(INSTANCE, Box::new(Config::default()));

        // Execute
        let result = AssignmentEvaluator.evaluate(&rule, &mut facts);

        // Verify
        assert_matches!(
            result,
            Some(Err(InvocationError::Fact(FactError::Missing { name }))) if name == "port"
        );
        // The instance is restored even when the assignment fails.
        assert!(facts.contains(INSTANCE));
    }

    #[test]
    fn decline() {
        let rule = NamedRule::creator(Vec::<String>::new(), MemberRef::opaque("Config", "new"));
        let mut facts = Facts::new();
        assert!(CreatorEvaluator.evaluate(&rule, &mut facts).is_none());
        assert!(AssignmentEvaluator.evaluate(&rule, &mut facts).is_none());
        assert!(AssignmentEvaluator.evaluate(&assignment(), &mut facts).is_some());
        assert!(CreatorEvaluator.evaluate(&assignment(), &mut facts).is_none());
    }
}
