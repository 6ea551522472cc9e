//! Non-increasing variable elimination by resolution (NiVER).
//!
//! A variable can be removed by replacing the clauses that mention it with
//! all non-tautological resolvents on it, as long as the total length of the
//! resolvents does not exceed the total length of the replaced clauses. The
//! replaced clauses are remembered on the reconstruction log so that a model
//! of the reduced formula can be extended to the eliminated variable.
use std::time::Instant;

use super::{Preprocessor, ReconstructEvent};
use crate::lit::{Lit, Var};

/// One elimination pass over the candidate variables.
///
/// The first pass considers every variable; later passes only those touched
/// since. Eliminating a variable marks the variables of all involved clauses
/// as touched again.
///
/// Returns whether the formula changed.
pub(super) fn eliminate_variables(pre: &mut Preprocessor, stop: Instant) -> bool {
    let mut changed = false;

    let candidates: Vec<Var> = (0..pre.var_count)
        .map(Var::from_index)
        .filter(|&var| pre.visit_all || pre.touched[var.index()])
        .collect();
    pre.visit_all = false;
    for flag in pre.touched.iter_mut() {
        *flag = false;
    }

    // Occurrence lists by polarity; kept up to date as resolvents are added.
    // Deleted clauses stay listed and are filtered through `alive`.
    let mut pos_occurrences: Vec<Vec<usize>> = vec![vec![]; pre.var_count];
    let mut neg_occurrences: Vec<Vec<usize>> = vec![vec![]; pre.var_count];
    let mut alive = vec![true; pre.clauses.len()];

    for (index, clause) in pre.clauses.iter().enumerate() {
        for &lit in clause {
            if lit.is_positive() {
                pos_occurrences[lit.index()].push(index);
            } else {
                neg_occurrences[lit.index()].push(index);
            }
        }
    }

    for (count, &var) in candidates.iter().enumerate() {
        if count % 256 == 0 && Instant::now() > stop {
            break;
        }
        if !pre.is_open(var) {
            continue;
        }

        let positive: Vec<usize> = pos_occurrences[var.index()]
            .iter()
            .cloned()
            .filter(|&index| alive[index])
            .collect();
        let negative: Vec<usize> = neg_occurrences[var.index()]
            .iter()
            .cloned()
            .filter(|&index| alive[index])
            .collect();

        match (positive.is_empty(), negative.is_empty()) {
            (true, true) => {
                // The variable is unconstrained.
                pre.eliminated[var.index()] = true;
                pre.events.push((var, ReconstructEvent::Free));
                changed = true;
                continue;
            }
            (true, false) => {
                // Pure negative literal
                pre.fix_lit(var.negative());
                changed = true;
                continue;
            }
            (false, true) => {
                // Pure positive literal
                pre.fix_lit(var.positive());
                changed = true;
                continue;
            }
            (false, false) => {}
        }

        let old_length: usize = positive
            .iter()
            .chain(negative.iter())
            .map(|&index| pre.clauses[index].len())
            .sum();

        let mut resolvents: Vec<Vec<Lit>> = vec![];
        let mut total_length = 0;
        let mut aborted = false;

        'trial: for &p in positive.iter() {
            for &n in negative.iter() {
                if let Some(resolvent) = resolve(&pre.clauses[p], &pre.clauses[n], var) {
                    total_length += resolvent.len();
                    if total_length > old_length {
                        aborted = true;
                        break 'trial;
                    }
                    resolvents.push(resolvent);
                }
            }
        }

        if aborted {
            continue;
        }

        // The elimination shrinks the formula; commit it.
        let mut removed: Vec<Vec<Lit>> = Vec::with_capacity(positive.len() + negative.len());
        for &index in positive.iter().chain(negative.iter()) {
            alive[index] = false;
            let clause = &pre.clauses[index];
            for &lit in clause.iter() {
                pre.touched[lit.index()] = true;
            }
            removed.push(clause.clone());
        }

        for resolvent in resolvents {
            if resolvent.is_empty() {
                pre.unsat = true;
                return true;
            }
            let index = pre.clauses.len();
            for &lit in resolvent.iter() {
                pre.mark_touched(lit.var());
                if lit.is_positive() {
                    pos_occurrences[lit.index()].push(index);
                } else {
                    neg_occurrences[lit.index()].push(index);
                }
            }
            pre.clauses.push(resolvent);
            alive.push(true);
        }

        pre.eliminated[var.index()] = true;
        pre.events.push((var, ReconstructEvent::Resolved(removed)));
        changed = true;
    }

    // Compact the clause list, dropping the replaced clauses.
    let mut index = 0;
    pre.clauses.retain(|_| {
        let keep = alive[index];
        index += 1;
        keep
    });

    changed
}

/// Resolve two clauses on `var`.
///
/// Both inputs must contain `var` in the respective polarity. Returns `None`
/// for a tautological resolvent.
fn resolve(positive: &[Lit], negative: &[Lit], var: Var) -> Option<Vec<Lit>> {
    let mut resolvent: Vec<Lit> = Vec::with_capacity(positive.len() + negative.len() - 2);
    resolvent.extend(positive.iter().filter(|lit| lit.var() != var));
    resolvent.extend(negative.iter().filter(|lit| lit.var() != var));
    resolvent.sort_unstable();
    resolvent.dedup();

    if resolvent.windows(2).any(|pair| pair[0] == !pair[1]) {
        None
    } else {
        Some(resolvent)
    }
}
