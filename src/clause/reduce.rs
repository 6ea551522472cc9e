//! Clause database reduction.
//!
//! When the number of learned clauses exceeds the current limit, the search
//! backtracks to the top level, drops the worse half of the learned clauses
//! by literal block distance, and rebuilds the clause arena and watchlists
//! wholesale from the survivors. Prior values are reapplied afterwards.
use std::mem::take;

use log::info;

use partial_ref::{partial, PartialRef};

use crate::context::{
    AssignmentP, ClauseAllocP, ClauseDbP, ConfigP, Context, ImplGraphP, SolverStateP, TrailP,
    VsidsP, WatchlistsP,
};
use crate::lit::Lit;
use crate::prop::{apply_priors, full_restart, propagate_level_zero, Conflict};

use super::{ClauseAlloc, ClauseHeader, ClauseRef};

/// A learned clause extracted from the arena during reduction.
struct ExtractedClause {
    lbd: u32,
    used: u32,
    lits: Vec<Lit>,
}

/// Reduce the learned clause database and restart the search.
///
/// Must be called with no conflict pending. Returns an error when reapplying
/// the prior values leads to a conflict, which makes the formula
/// unsatisfiable.
pub fn reduce_and_restart(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        ConfigP,
    ),
) -> Result<(), Conflict> {
    full_restart(ctx.borrow());

    let old_refs = take(&mut ctx.part_mut(ClauseDbP).clauses);
    let original_count = ctx.part(ClauseDbP).original_count();
    ctx.part_mut(ClauseDbP).original_count = 0;

    let mut originals: Vec<Vec<Lit>> = Vec::with_capacity(original_count);
    let mut learned: Vec<ExtractedClause> = Vec::with_capacity(old_refs.len() - original_count);

    {
        let alloc = ctx.part(ClauseAllocP);
        for &cref in old_refs.iter() {
            let clause = alloc.clause(cref);
            let header = clause.header();
            if header.is_learned() {
                learned.push(ExtractedClause {
                    lbd: header.lbd(),
                    used: header.used(),
                    lits: clause.lits().to_vec(),
                });
            } else {
                originals.push(clause.lits().to_vec());
            }
        }
    }

    learned.sort_by_key(|clause| clause.lbd);

    let keep_ratio = ctx.part(ConfigP).clause_keep_ratio;
    let mut keep_count = (learned.len() as f64 * keep_ratio).ceil() as usize;
    // Always keep glue clauses
    while keep_count < learned.len() && learned[keep_count].lbd <= 2 {
        keep_count += 1;
    }
    learned.truncate(keep_count);

    // Rebuild the arena and watchlists from the survivors. The watches go
    // back to positions 0 and 1; reapplying the priors below restores the
    // watch invariant for every rebuilt clause.
    let old_buffer_size = ctx.part(ClauseAllocP).buffer_size();
    *ctx.part_mut(ClauseAllocP) = ClauseAlloc::with_capacity(old_buffer_size);
    ctx.part_mut(WatchlistsP).clear();

    for lits in originals.iter() {
        rebuild_clause(ctx.borrow(), ClauseHeader::new(), lits);
        ctx.part_mut(ClauseDbP).original_count += 1;
    }
    for clause in learned.iter() {
        let mut header = ClauseHeader::learned(clause.lbd);
        for _ in 0..clause.used {
            header.bump_used();
        }
        rebuild_clause(ctx.borrow(), header, &clause.lits);
    }

    let inc_factor = ctx.part(ConfigP).clause_limit_inc_factor;
    let state = ctx.part_mut(SolverStateP);
    state.clause_limit *= inc_factor;
    state.stats.restarts += 1;

    info!(
        "restart {}: kept {} of {} learned clauses, new limit {}",
        ctx.part(SolverStateP).stats.restarts,
        keep_count,
        old_refs.len() - original_count,
        ctx.part(SolverStateP).clause_limit as usize,
    );

    ctx.part_mut(VsidsP).rebuild();

    apply_priors(ctx.borrow());
    propagate_level_zero(ctx.borrow())
}

fn rebuild_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);
    ctx.part_mut(WatchlistsP).watch_clause(cref, [lits[0], lits[1]]);
    ctx.part_mut(ClauseDbP).clauses.push(cref);
    cref
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use crate::clause::db;
    use crate::context::set_var_count;
    use crate::load::load_clause;

    #[test]
    fn keeps_good_lbd_and_glue() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1, 2, 3;
            -1, -2, -3;
        ];

        set_var_count(ctx.borrow(), 10);

        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        let learned = [
            (5, lits![4, 5, 6]),
            (2, lits![-4, -5, 6]),
            (7, lits![7, 8, 9]),
            (2, lits![-7, 8, -9]),
            (3, lits![4, 7, -8]),
        ];

        for (lbd, lits) in learned.iter() {
            db::add_clause(ctx.borrow(), ClauseHeader::learned(*lbd), lits);
        }

        ctx.part_mut(SolverStateP).clause_limit = 4.0;

        reduce_and_restart(ctx.borrow()).unwrap();

        // ceil(5 * 0.5) = 3 kept by ratio; sorted by lbd the cut falls after
        // [2, 2, 3] and the next clause has lbd 5, so nothing extra is kept.
        assert_eq!(ctx.part(ClauseDbP).original_count(), 2);
        assert_eq!(ctx.part(ClauseDbP).learned_count(), 3);

        let alloc = ctx.part(ClauseAllocP);
        for &cref in &ctx.part(ClauseDbP).clauses()[2..] {
            assert!(alloc.header(cref).lbd() <= 3);
        }
    }

    #[test]
    fn priors_survive_restart() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        load_clause(ctx.borrow(), &lits![1]);
        load_clause(ctx.borrow(), &lits![-1, 2]);
        load_clause(ctx.borrow(), &lits![-2, 3, 4]);

        apply_priors(ctx.borrow());
        propagate_level_zero(ctx.borrow()).unwrap();

        assert!(ctx.part(AssignmentP).var_has_prior(var!(2)));

        reduce_and_restart(ctx.borrow()).unwrap();

        assert!(ctx.part(AssignmentP).lit_is_true(lit!(1)));
        assert!(ctx.part(AssignmentP).lit_is_true(lit!(2)));
    }
}
