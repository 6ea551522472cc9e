//! Unit propagation.
use partial_ref::{partial, PartialRef};

use crate::context::{
    AssignmentP, ClauseAllocP, Context, ImplGraphP, SolverStateP, TrailP, WatchlistsP,
};

pub mod assignment;
pub mod clauses;
pub mod graph;
pub mod watch;

pub use assignment::{
    apply_priors, backtrack_until, enqueue_assignment, full_restart, Assignment, Trail,
};
pub use graph::{Conflict, ImplGraph, ImplNode, Reason};
pub use watch::{Watch, Watchlists};

/// Propagate enqueued assignments.
///
/// Returns when all enqueued assignments are propagated, including newly
/// propagated assignments, or if there is a conflict.
///
/// On conflict the clause that would assign the opposite value to an already
/// assigned literal is returned; the propagation queue is drained.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Result<(), Conflict> {
    while let Some(lit) = ctx.part_mut(TrailP).pop_queue() {
        ctx.part_mut(SolverStateP).stats.propagations += 1;
        let result = clauses::propagate_watched(ctx.borrow(), lit);
        if result.is_err() {
            ctx.part_mut(TrailP).drain_queue();
            return result;
        }
    }
    Ok(())
}

/// Propagate at decision level 0 and make the derived assignments permanent.
///
/// Everything assigned by propagation at level 0 holds unconditionally, so
/// the whole new trail suffix is promoted to prior values that survive
/// restarts.
pub fn propagate_level_zero(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Result<(), Conflict> {
    debug_assert_eq!(ctx.part(TrailP).current_level(), 0);

    let start = ctx.part(TrailP).trail().len();
    propagate(ctx.borrow())?;

    let (assignment, ctx) = ctx.split_part_mut(AssignmentP);
    for &lit in &ctx.part(TrailP).trail()[start..] {
        assignment.set_prior(lit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use rand::seq::SliceRandom;
    use rand::Rng;

    use partial_ref::IntoPartialRefMut;

    use crate::cnf::CnfFormula;
    use crate::context::set_var_count;
    use crate::lit::Lit;
    use crate::load::load_clause;
    use crate::state::SatState;

    /// Generate a random formula and a list of literals implied by it.
    ///
    /// The first `vars` literals of a random shuffle get an implying clause
    /// each; extra clauses are satisfied by construction.
    pub fn prop_formula(
        vars: impl Strategy<Value = usize>,
        extra_vars: impl Strategy<Value = usize>,
        extra_clauses: impl Strategy<Value = usize>,
        density: impl Strategy<Value = f64>,
    ) -> impl Strategy<Value = (Vec<Lit>, CnfFormula)> {
        (vars, extra_vars, extra_clauses, density).prop_flat_map(
            |(vars, extra_vars, extra_clauses, density)| {
                let negate = proptest::collection::vec(proptest::bool::ANY, vars + extra_vars);

                let lits = negate
                    .prop_map(|negate| {
                        negate
                            .into_iter()
                            .enumerate()
                            .map(|(index, negate)| Lit::from_index(index, negate))
                            .collect::<Vec<_>>()
                    })
                    .prop_shuffle();

                lits.prop_perturb(move |mut lits, mut rng| {
                    let assigned_lits = &lits[..vars];

                    let mut clauses: Vec<Vec<Lit>> = vec![];
                    for (i, &lit) in assigned_lits.iter().enumerate() {
                        // Build a clause that implies lit
                        let mut clause = vec![lit];
                        for &reason_lit in assigned_lits[..i].iter() {
                            if rng.gen_bool(density) {
                                clause.push(!reason_lit);
                            }
                        }
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }

                    for _ in 0..extra_clauses {
                        // Build a clause that is satisfied
                        let &true_lit = assigned_lits.choose(&mut rng).unwrap();
                        let mut clause = vec![true_lit];
                        for &other_lit in lits.iter() {
                            if other_lit != true_lit && rng.gen_bool(density) {
                                clause.push(other_lit ^ rng.gen::<bool>());
                            }
                        }
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }

                    clauses.shuffle(&mut rng);

                    // Only return implied lits
                    lits.drain(vars..);

                    (lits, CnfFormula::from(clauses))
                })
            },
        )
    }

    proptest! {
        #[test]
        fn propagation_no_conflict(
            (mut lits, formula) in prop_formula(
                2..30usize,
                0..10usize,
                0..20usize,
                0.1..0.9
            ),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

            apply_priors(ctx.borrow());
            let prop_result = propagate(ctx.borrow());

            prop_assert!(prop_result.is_ok());

            lits.sort();

            let mut prop_lits = ctx.part(TrailP).trail().to_owned();
            prop_lits.sort();

            prop_assert_eq!(prop_lits, lits);

            // Exit invariant: every stored clause that is not satisfied has
            // two non-false watched literals.
            let alloc = ctx.part(ClauseAllocP);
            let assignment = ctx.part(AssignmentP);
            for &cref in ctx.part(crate::context::ClauseDbP).clauses() {
                let lits = alloc.clause(cref).lits();
                let satisfied = lits.iter().any(|&l| assignment.lit_is_true(l));
                if !satisfied {
                    prop_assert!(!assignment.lit_is_false(lits[0]));
                    prop_assert!(!assignment.lit_is_false(lits[1]));
                }
            }
        }

        #[test]
        fn propagation_conflict(
            (lits, formula) in prop_formula(
                2..30usize,
                0..10usize,
                0..20usize,
                0.1..0.9
            ),
            conflict_size in any::<proptest::sample::Index>(),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            // We add the conflict clause first to make sure that it isn't
            // simplified during loading
            let conflict_size = conflict_size.index(lits.len() - 1) + 2;
            let conflict_clause: Vec<_> = lits[..conflict_size].iter().map(|&lit| !lit).collect();

            load_clause(ctx.borrow(), &conflict_clause);

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

            apply_priors(ctx.borrow());
            let prop_result = propagate(ctx.borrow());

            prop_assert!(prop_result.is_err());

            let conflict = prop_result.unwrap_err();
            let conflict_lits = ctx
                .part(ClauseAllocP)
                .clause(conflict.cref)
                .lits()
                .to_owned();

            for &lit in conflict_lits.iter() {
                prop_assert!(ctx.part(AssignmentP).lit_is_false(lit));
            }
        }
    }
}
