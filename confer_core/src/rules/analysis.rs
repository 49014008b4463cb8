//! Shape-only analysis of rules, performed at scan time.
//!
//! The analysis mirrors [`RulesEngine::run`](crate::RulesEngine::run) over fact *names* alone: no member is invoked.
use std::collections::{BTreeMap, BTreeSet};

use crate::rules::{NamedRule, Reaction};

/// Simulate the reaction of `rules` to the facts named in `seed`.
///
/// Rules are visited in order with the same readiness and retirement semantics as the dynamic engine.
pub fn react<'r, I>(seed: &BTreeSet<String>, rules: I) -> Reaction
where
    I: IntoIterator<Item = &'r NamedRule>,
{
    let mut available = seed.clone();
    let mut pending: Vec<&NamedRule> = rules.into_iter().collect();
    let mut reaction = Reaction::default();

    loop {
        let mut progressed = false;
        let mut still_pending = Vec::with_capacity(pending.len());

        for rule in pending {
            if let Some(consequent) = rule.consequent() {
                if available.contains(consequent) {
                    continue;
                }
            }

            if rule.is_ready(|name| available.contains(name)) {
                let consumed = rule.consumes(|name| available.contains(name));

                if let Some(consequent) = rule.consequent() {
                    available.insert(consequent.to_string());
                }

                reaction.record(rule, consumed);
                progressed = true;
            } else {
                still_pending.push(rule);
            }
        }

        pending = still_pending;

        if !progressed {
            break;
        }
    }

    reaction
}

/// The facts left uncovered by a reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insufficiency {
    /// The necessary facts which were neither produced nor consumed.
    pub gap: BTreeSet<String>,
    /// The reaction that fell short.
    pub reaction: Reaction,
}

/// Verify that reacting to `seed` covers (produces or consumes) every `necessary` fact.
pub fn verify<'r, I>(
    seed: &BTreeSet<String>,
    necessary: &BTreeSet<String>,
    rules: I,
) -> Result<Reaction, Insufficiency>
where
    I: IntoIterator<Item = &'r NamedRule>,
{
    let reaction = react(seed, rules);
    let gap: BTreeSet<String> = necessary
        .iter()
        .filter(|name| !reaction.produced.contains(*name) && !reaction.consumed.contains(*name))
        .cloned()
        .collect();

    if gap.is_empty() {
        Ok(reaction)
    } else {
        Err(Insufficiency { gap, reaction })
    }
}

/// Check that every choice among alternative sources reacts identically to `seed`.
///
/// Sources sharing a consequent are alternatives.
/// Each combination of one alternative per contested consequent is reacted in isolation, and the consumed and produced facts of all combinations are compared.
/// When they disagree, returns the facts consumed by some but not all combinations (or, failing that, produced by some but not all).
pub fn divergence(seed: &BTreeSet<String>, rules: &[NamedRule]) -> Result<(), BTreeSet<String>> {
    let mut contested: BTreeMap<&str, Vec<usize>> = BTreeMap::default();

    for (index, rule) in rules.iter().enumerate() {
        if let Some(consequent) = rule.consequent() {
            contested.entry(consequent).or_default().push(index);
        }
    }

    contested.retain(|_, alternatives| alternatives.len() > 1);

    if contested.is_empty() {
        return Ok(());
    }

    let groups: Vec<&Vec<usize>> = contested.values().collect();
    let excluded: BTreeSet<usize> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let mut choice = vec![0usize; groups.len()];
    let mut reactions: Vec<Reaction> = Vec::default();

    loop {
        let chosen: BTreeSet<usize> = groups
            .iter()
            .zip(choice.iter())
            .map(|(group, index)| group[*index])
            .collect();
        let selection = rules
            .iter()
            .enumerate()
            .filter(|(index, _)| !excluded.contains(index) || chosen.contains(index))
            .map(|(_, rule)| rule);
        reactions.push(react(seed, selection));

        if !advance(&mut choice, &groups) {
            break;
        }
    }

    let consumed = disagreement(reactions.iter().map(|r| &r.consumed));

    if !consumed.is_empty() {
        return Err(consumed);
    }

    let produced = disagreement(reactions.iter().map(|r| &r.produced));

    if !produced.is_empty() {
        return Err(produced);
    }

    Ok(())
}

// Odometer increment over the alternatives; false once every combination is visited.
fn advance(choice: &mut [usize], groups: &[&Vec<usize>]) -> bool {
    for (digit, group) in choice.iter_mut().zip(groups.iter()) {
        *digit += 1;

        if *digit < group.len() {
            return true;
        }

        *digit = 0;
    }

    false
}

fn disagreement<'a>(sets: impl Iterator<Item = &'a BTreeSet<String>>) -> BTreeSet<String> {
    let mut union: BTreeSet<String> = BTreeSet::default();
    let mut intersection: Option<BTreeSet<String>> = None;

    for set in sets {
        union.extend(set.iter().cloned());
        intersection = Some(match intersection {
            Some(intersection) => intersection.intersection(set).cloned().collect(),
            None => set.clone(),
        });
    }

    let intersection = intersection.unwrap_or_default();
    union.difference(&intersection).cloned().collect()
}
