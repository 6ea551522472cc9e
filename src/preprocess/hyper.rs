//! Hyper-binary resolution.
//!
//! For a clause `{l₁, …, lₖ}` and a literal `m`: when every `lᵢ` implies `m`
//! through the implication graph, `m` is a unit; when all but a single `lⱼ`
//! imply `m`, the binary clause `{lⱼ, m}` is entailed. Both cases produce new
//! clauses and implication edges for the following passes to exploit.
use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};

use super::Preprocessor;
use crate::lit::Lit;

/// One hyper-binary resolution pass.
///
/// Bounded by its own budget in addition to the preprocessor's. The
/// implication graph is reseeded from the current binary clauses first, so
/// the pass starts from edges that are live.
///
/// Returns whether any clause was added.
pub(super) fn hyper_binary_resolve(pre: &mut Preprocessor, stop: Instant) -> bool {
    pre.graph.reseed(pre.clauses.iter().map(Vec::as_slice));

    let mut existing: FxHashSet<Vec<Lit>> = pre.clauses.iter().cloned().collect();
    let mut changed = false;

    let mut counts: FxHashMap<Lit, usize> = FxHashMap::default();

    // Only the clauses present at pass start are inspected; the pass itself
    // appends units and binaries.
    let clause_count = pre.clauses.len();
    for clause_index in 0..clause_count {
        if clause_index % 64 == 0 && Instant::now() > stop {
            break;
        }
        if pre.unsat {
            break;
        }

        let len = pre.clauses[clause_index].len();
        if len < 3 {
            continue;
        }

        counts.clear();
        for position in 0..len {
            let lit = pre.clauses[clause_index][position];
            if let Some(successors) = pre.graph.successors(lit) {
                for &implied in successors {
                    *counts.entry(implied).or_insert(0) += 1;
                }
            }
        }

        let candidates: Vec<(Lit, usize)> = counts
            .iter()
            .filter(|&(_, &count)| count >= len - 1)
            .map(|(&lit, &count)| (lit, count))
            .collect();

        for (implied, count) in candidates {
            if count >= len {
                changed |= add_unit(pre, &mut existing, implied);
                continue;
            }

            // Exactly one literal of the clause does not imply `implied`.
            let exception = pre.clauses[clause_index]
                .iter()
                .cloned()
                .find(|&lit| !pre.graph.implies(lit, implied))
                .expect("missing exception literal despite count");

            if exception == implied {
                changed |= add_unit(pre, &mut existing, implied);
            } else if exception == !implied {
                // The entailed clause would be a tautology.
            } else {
                changed |= add_binary(pre, &mut existing, exception, implied);
            }
        }
    }

    changed
}

/// Record a derived unit clause.
fn add_unit(pre: &mut Preprocessor, existing: &mut FxHashSet<Vec<Lit>>, unit: Lit) -> bool {
    match pre.lit_prior(unit) {
        Some(true) => return false,
        Some(false) => {
            // The negation is already fixed, but the unit is entailed.
            pre.unsat = true;
            return true;
        }
        None => {}
    }
    if pre.eliminated[unit.index()] || !existing.insert(vec![unit]) {
        return false;
    }
    pre.clauses.push(vec![unit]);
    pre.mark_touched(unit.var());
    true
}

/// Record a derived binary clause and its implication edges.
fn add_binary(
    pre: &mut Preprocessor,
    existing: &mut FxHashSet<Vec<Lit>>,
    a: Lit,
    b: Lit,
) -> bool {
    debug_assert_ne!(a.var(), b.var());

    let mut clause = vec![a, b];
    clause.sort_unstable();

    if !existing.insert(clause.clone()) {
        return false;
    }

    pre.graph.add(!a, b);
    pre.clauses.push(clause);
    pre.mark_touched(a.var());
    pre.mark_touched(b.var());
    true
}
