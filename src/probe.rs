//! Failed-literal probing.
//!
//! Before the main search starts, each polarity of each unassigned variable
//! is assumed at decision level 1 and propagated. When that leads to a
//! conflict, conflict analysis at level 1 yields a clause with a single
//! level 1 literal, which therefore holds unconditionally and is promoted to
//! a prior value. Probing repeats while it makes progress, within a
//! wall-clock budget.
use std::time::Instant;

use log::info;

use partial_ref::{partial, PartialRef};

use rand::seq::SliceRandom;

use crate::analyze_conflict::analyze_conflict;
use crate::context::{
    AnalyzeConflictP, AssignmentP, ClauseAllocP, ConfigP, Context, ImplGraphP, RngP,
    SolverStateP, TrailP, VsidsP, WatchlistsP,
};
use crate::lit::Var;
use crate::prop::{
    backtrack_until, enqueue_assignment, propagate, propagate_level_zero, Reason,
};
use crate::state::SatState;

/// Probe both polarities of every variable, deriving prior values from
/// failed assumptions.
///
/// Expects all prior values to be applied and propagated. Sets the solver
/// state to unsatisfiable when a derived prior conflicts at the top level.
pub fn probe_literals(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut RngP,
        mut SolverStateP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        ConfigP,
    ),
) {
    debug_assert_eq!(ctx.part(TrailP).current_level(), 0);

    let start = Instant::now();
    let budget = ctx.part(ConfigP).probe_timeout;
    let var_count = ctx.part(AssignmentP).var_count();

    let mut order: Vec<Var> = (0..var_count).map(Var::from_index).collect();
    order.shuffle(&mut ctx.part_mut(RngP).0);

    let mut probes = 0u64;
    let mut derived = 0u64;

    let mut changed = true;
    'probing: while changed {
        changed = false;
        for &var in order.iter() {
            if start.elapsed() > budget {
                break 'probing;
            }

            for value in [false, true] {
                if ctx.part(AssignmentP).var_value(var).is_some() {
                    continue;
                }
                probes += 1;

                ctx.part_mut(TrailP).new_decision_level();
                enqueue_assignment(ctx.borrow(), var.lit(value), Reason::None);

                match propagate(ctx.borrow()) {
                    Ok(()) => {
                        backtrack_until(ctx.borrow(), 1);
                    }
                    Err(conflict) => {
                        let target = analyze_conflict(ctx.borrow(), conflict);
                        debug_assert_eq!(target, 1);
                        debug_assert_eq!(ctx.part(AnalyzeConflictP).clause().len(), 1);
                        let failed = ctx.part(AnalyzeConflictP).clause()[0];

                        backtrack_until(ctx.borrow(), 1);

                        ctx.part_mut(AssignmentP).set_prior(failed);
                        enqueue_assignment(ctx.borrow(), failed, Reason::None);
                        derived += 1;
                        changed = true;

                        if propagate_level_zero(ctx.borrow()).is_err() {
                            ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
                            break 'probing;
                        }
                    }
                }
            }
        }
    }

    if ctx.part(SolverStateP).sat_state == SatState::Unsat {
        info!("unsat from failed-literal probing");
    }
    info!(
        "failed-literal probing: {} probes, {} derived values, {} ms",
        probes,
        derived,
        start.elapsed().as_millis(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use crate::context::set_var_count;
    use crate::load::load_clause;
    use crate::prop::apply_priors;

    #[test]
    fn derives_forced_literal() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        // Assuming 1 fails, so -1 becomes a prior and forces 3
        let formula = cnf_formula![
            -1, 2;
            -1, -2;
            1, 3;
        ];

        set_var_count(ctx.borrow(), formula.var_count());

        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        apply_priors(ctx.borrow());
        propagate_level_zero(ctx.borrow()).unwrap();

        probe_literals(ctx.borrow());

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);
        assert!(ctx.part(AssignmentP).lit_is_true(lit!(-1)));
        assert!(ctx.part(AssignmentP).lit_is_true(lit!(3)));
        assert!(ctx.part(AssignmentP).var_has_prior(var!(1)));
        assert!(ctx.part(AssignmentP).var_has_prior(var!(3)));
    }

    #[test]
    fn detects_unsat_by_probing() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            -1, 2;
            -1, -2;
            1, 3;
            1, -3;
        ];

        set_var_count(ctx.borrow(), formula.var_count());

        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        apply_priors(ctx.borrow());
        propagate_level_zero(ctx.borrow()).unwrap();

        probe_literals(ctx.borrow());

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }
}
