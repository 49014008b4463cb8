use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, trace};

use crate::describe::{Facts, InvocationError};
use crate::error::ArgumentError;
use crate::rules::{AssignmentEvaluator, CreatorEvaluator, NamedRule, Reaction, RuleEvaluator};

/// A rule failed while it was being evaluated.
#[derive(Debug, Error)]
#[error("Failed to evaluate '{rule}': {source}")]
pub struct RuleEvaluationError {
    /// The failing rule's name.
    pub rule: String,
    /// The underlying failure.
    #[source]
    pub source: InvocationError,
}

impl From<RuleEvaluationError> for ArgumentError {
    fn from(error: RuleEvaluationError) -> Self {
        ArgumentError::RuleEvaluation {
            rule: error.rule,
            source: error.source,
        }
    }
}

/// Forward-chaining evaluation of rules against concrete facts.
pub struct RulesEngine {
    evaluators: Vec<Box<dyn RuleEvaluator>>,
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self {
            evaluators: vec![Box::new(CreatorEvaluator), Box::new(AssignmentEvaluator)],
        }
    }
}

impl std::fmt::Debug for RulesEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesEngine")
            .field("evaluators", &self.evaluators.len())
            .finish()
    }
}

impl RulesEngine {
    /// An engine consulting exactly `evaluators`, in order.
    pub fn new(evaluators: Vec<Box<dyn RuleEvaluator>>) -> Self {
        Self { evaluators }
    }

    /// Consult `evaluator` ahead of the existing evaluators.
    pub fn with_evaluator(mut self, evaluator: impl RuleEvaluator + 'static) -> Self {
        self.evaluators.insert(0, Box::new(evaluator));
        self
    }

    /// Evaluate `rules` until no pending rule is ready.
    ///
    /// Rules are visited in their given order, in repeated passes.
    /// A ready rule is evaluated at most once, and a source whose consequent is already present is retired without evaluation.
    /// Evaluation stops (without error) once a full pass makes no progress; whether the instance was built is left to the caller.
    pub fn run(
        &self,
        rules: &[NamedRule],
        mut facts: Facts,
    ) -> Result<(Facts, Reaction), RuleEvaluationError> {
        let mut pending: VecDeque<&NamedRule> = rules.iter().collect();
        let mut reaction = Reaction::default();

        loop {
            let mut progressed = false;

            for _ in 0..pending.len() {
                let rule = match pending.pop_front() {
                    Some(rule) => rule,
                    None => break,
                };

                if let Some(consequent) = rule.consequent() {
                    if facts.contains(consequent) {
                        trace!("Retiring '{}': its consequent is already present.", rule.name());
                        continue;
                    }
                }

                if !rule.is_ready(|name| facts.contains(name)) {
                    pending.push_back(rule);
                    continue;
                }

                let consumed = rule.consumes(|name| facts.contains(name));
                debug!("Evaluating '{rule}'.");
                let produced = self.evaluate(rule, &mut facts)?;

                if let (Some(consequent), Some(value)) = (rule.consequent(), produced) {
                    facts.insert(consequent, value);
                }

                reaction.record(rule, consumed);
                progressed = true;
            }

            if !progressed {
                break;
            }
        }

        if !pending.is_empty() {
            debug!(
                "Stopping with {} unready rule(s): {:?}.",
                pending.len(),
                pending.iter().map(|r| r.name()).collect::<Vec<_>>()
            );
        }

        Ok((facts, reaction))
    }

    fn evaluate(
        &self,
        rule: &NamedRule,
        facts: &mut Facts,
    ) -> Result<Option<Box<dyn std::any::Any>>, RuleEvaluationError> {
        for evaluator in &self.evaluators {
            if let Some(evaluation) = evaluator.evaluate(rule, facts) {
                return evaluation.map_err(|source| RuleEvaluationError {
                    rule: rule.name(),
                    source,
                });
            }
        }

        Err(RuleEvaluationError {
            rule: rule.name(),
            source: InvocationError::Failed("no evaluator accepts the rule.".to_string()),
        })
    }
}
