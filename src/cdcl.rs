//! Conflict driven clause learning.
use std::time::Instant;

use log::info;

use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::{db, reduce::reduce_and_restart, ClauseHeader};
use crate::context::{
    AnalyzeConflictP, AssignmentP, ClauseAllocP, ClauseDbP, ConfigP, Context, ImplGraphP, RngP,
    SolverStateP, TrailP, VsidsP, WatchlistsP,
};
use crate::decision::make_decision;
use crate::prop::{backtrack_until, enqueue_assignment, propagate, propagate_level_zero, Reason};
use crate::state::SatState;

/// Run the decide / propagate / analyse / backtrack loop until an answer is
/// found or the deadline expires.
///
/// Expects prior values to be applied and propagated without conflict.
/// Leaves the result in the solver state: satisfiable once every variable is
/// assigned without conflict, unsatisfiable when an unconditional conflict is
/// derived, unknown when the deadline expires.
pub fn search(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut RngP,
        mut SolverStateP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        ConfigP,
    ),
) {
    let log_period = ctx.part(ConfigP).log_period;
    let mut iteration: u64 = 0;

    loop {
        if !make_decision(ctx.borrow()) {
            ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
            return;
        }

        match propagate(ctx.borrow()) {
            Ok(()) => {
                let learned = ctx.part(ClauseDbP).learned_count();
                if (learned as f64) > ctx.part(SolverStateP).clause_limit
                    && reduce_and_restart(ctx.borrow()).is_err()
                {
                    ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
                    return;
                }
            }
            Err(mut conflict) => loop {
                let target = analyze_conflict(ctx.borrow(), conflict);

                if target == 0 {
                    ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
                    return;
                }

                backtrack_until(ctx.borrow(), target);

                if ctx.part(AnalyzeConflictP).clause().len() == 1 {
                    // A unit was derived; it holds unconditionally and
                    // becomes a prior value.
                    let promoted = ctx.part(AnalyzeConflictP).clause()[0];
                    ctx.part_mut(AssignmentP).set_prior(promoted);
                    enqueue_assignment(ctx.borrow(), promoted, Reason::None);

                    match propagate_level_zero(ctx.borrow()) {
                        Ok(()) => break,
                        Err(prior_conflict) => {
                            conflict = prior_conflict;
                            continue;
                        }
                    }
                }

                let lbd = ctx.part(AnalyzeConflictP).lbd();
                let clause = ctx.part(AnalyzeConflictP).clause().to_vec();
                db::add_clause(ctx.borrow(), ClauseHeader::learned(lbd), &clause);
                break;
            },
        }

        iteration += 1;
        if iteration % log_period == 0 {
            let stats = ctx.part(SolverStateP).stats;
            info!(
                "decisions: {} propagations: {} conflicts: {} restarts: {} priors: {}",
                stats.decisions,
                stats.propagations,
                stats.conflicts,
                stats.restarts,
                ctx.part(AssignmentP).prior_count(),
            );
            if let Some(deadline) = ctx.part(SolverStateP).deadline {
                if Instant::now() > deadline {
                    info!("deadline exceeded, giving up");
                    return;
                }
            }
        }
    }
}
