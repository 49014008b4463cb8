//! Forward-chaining rules over named facts.
//!
//! A [`NamedRule`] consumes a set of named facts (its antecedents) and, when it is a source, produces a named fact (its consequent).
//! The same rules are analysed statically at scan time (see [`analysis`]) and evaluated dynamically at build time (see [`RulesEngine`]).
pub mod analysis;
mod engine;
mod evaluate;

use std::collections::BTreeSet;
use std::fmt;

use crate::constant::INSTANCE;
use crate::describe::{AssignFn, CreatorFn};

pub use engine::*;
pub use evaluate::*;

/// How the nominated member is invoked when its rule fires.
#[derive(Clone)]
pub enum Invocation {
    /// Call a creator, producing the instance.
    Create(CreatorFn),
    /// Write the fact named `property` into the instance.
    Assign {
        /// The fact supplying the value.
        property: String,
        #[doc(hidden)]
        assign: AssignFn,
    },
    /// No built-in invocation; a custom [`RuleEvaluator`] must decide the rule.
    Opaque,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Create(_) => write!(f, "Create"),
            Invocation::Assign { property, .. } => write!(f, "Assign({property:?})"),
            Invocation::Opaque => write!(f, "Opaque"),
        }
    }
}

/// The member a rule was nominated from.
#[derive(Debug, Clone)]
pub struct MemberRef {
    owner: String,
    member: String,
    invocation: Invocation,
}

impl MemberRef {
    /// Reference `owner::member`, invoked via `invocation`.
    pub fn new(owner: impl Into<String>, member: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            owner: owner.into(),
            member: member.into(),
            invocation,
        }
    }

    /// Reference `owner::member` with no built-in invocation.
    pub fn opaque(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(owner, member, Invocation::Opaque)
    }

    /// The owning type's name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The member's name.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// How the member is invoked.
    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.member == other.member
    }
}

impl Eq for MemberRef {}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = self.owner.rsplit("::").next().unwrap_or(&self.owner);
        write!(f, "{owner}::{}", self.member)
    }
}

/// A validated rule: antecedents (or alternative condition sets) → optional consequent.
///
/// A rule without a consequent is a *sink*: it has an effect on the instance but produces no new fact.
/// A rule with a consequent is a *source* of that fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRule {
    antecedents: BTreeSet<String>,
    conditions: Option<BTreeSet<BTreeSet<String>>>,
    consequent: Option<String>,
    nominated: MemberRef,
}

impl NamedRule {
    /// Create a rule.
    pub fn new<I, S>(antecedents: I, consequent: Option<String>, nominated: MemberRef) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            antecedents: antecedents.into_iter().map(Into::into).collect(),
            conditions: None,
            consequent,
            nominated,
        }
    }

    /// A source rule producing the instance under construction.
    pub fn creator<I, S>(antecedents: I, nominated: MemberRef) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(antecedents, Some(INSTANCE.to_string()), nominated)
    }

    /// A sink rule writing `property` into the instance under construction.
    pub fn assignment(property: impl Into<String>, nominated: MemberRef) -> Self {
        Self::new([INSTANCE.to_string(), property.into()], None, nominated)
    }

    /// Declare alternative condition sets; the rule is also ready when any one of them is fully available.
    pub fn with_conditions<I, C, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = Some(
            conditions
                .into_iter()
                .map(|condition| condition.into_iter().map(Into::into).collect())
                .collect(),
        );
        self
    }

    /// The facts this rule requires.
    pub fn antecedents(&self) -> &BTreeSet<String> {
        &self.antecedents
    }

    /// The alternative condition sets, if declared.
    pub fn conditions(&self) -> Option<&BTreeSet<BTreeSet<String>>> {
        self.conditions.as_ref()
    }

    /// The produced fact, if this is a source.
    pub fn consequent(&self) -> Option<&str> {
        self.consequent.as_deref()
    }

    /// The member this rule was nominated from.
    pub fn nominated(&self) -> &MemberRef {
        &self.nominated
    }

    /// The rule's name, used in diagnostics.
    pub fn name(&self) -> String {
        self.nominated.to_string()
    }

    /// Whether this rule produces a fact.
    pub fn is_source(&self) -> bool {
        self.consequent.is_some()
    }

    /// Whether this rule is ready given the available facts.
    ///
    /// A rule is ready when all its antecedents are available, or when one of its (non-empty) condition sets is fully available.
    /// An empty condition set never makes a rule ready.
    pub fn is_ready(&self, available: impl Fn(&str) -> bool) -> bool {
        if self.antecedents.iter().all(|a| available(a)) {
            return true;
        }

        match &self.conditions {
            Some(conditions) => conditions
                .iter()
                .any(|condition| !condition.is_empty() && condition.iter().all(|c| available(c))),
            None => false,
        }
    }

    /// The available facts this rule consumes when it fires.
    pub fn consumes(&self, available: impl Fn(&str) -> bool) -> BTreeSet<String> {
        let mut consumed: BTreeSet<String> = self
            .antecedents
            .iter()
            .filter(|a| available(a))
            .cloned()
            .collect();

        if let Some(conditions) = &self.conditions {
            for condition in conditions {
                if !condition.is_empty() && condition.iter().all(|c| available(c)) {
                    consumed.extend(condition.iter().cloned());
                }
            }
        }

        consumed
    }
}

impl fmt::Display for NamedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let antecedents: Vec<&str> = self.antecedents.iter().map(|a| display_fact(a)).collect();
        match &self.consequent {
            Some(consequent) => write!(
                f,
                "{} {{{}}} -> {}",
                self.nominated,
                antecedents.join(", "),
                display_fact(consequent)
            ),
            None => write!(f, "{} {{{}}}", self.nominated, antecedents.join(", ")),
        }
    }
}

pub(crate) fn display_fact(name: &str) -> &str {
    if name == INSTANCE {
        "<instance>"
    } else {
        name
    }
}

/// What happened (or would happen) when a set of rules reacts to a set of facts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    /// The names of the evaluated rules, in evaluation order.
    pub evaluated: Vec<String>,
    /// The facts produced by evaluated sources.
    pub produced: BTreeSet<String>,
    /// The facts consumed by evaluated rules.
    pub consumed: BTreeSet<String>,
}

impl Reaction {
    pub(crate) fn record(&mut self, rule: &NamedRule, consumed: BTreeSet<String>) {
        self.evaluated.push(rule.name());
        self.consumed.extend(consumed);

        if let Some(consequent) = rule.consequent() {
            self.produced.insert(consequent.to_string());
        }
    }
}
