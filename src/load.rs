//! Loading a formula into the solver.
use partial_ref::{partial, PartialRef};

use crate::clause::{db, ClauseHeader};
use crate::context::{
    AssignmentP, ClauseAllocP, ClauseDbP, Context, SolverStateP, TmpDataP, WatchlistsP,
};
use crate::lit::Lit;
use crate::state::SatState;

/// Adds a clause to the current formula.
///
/// Removes duplicated literals, ignores tautological clauses (eg. x v -x v
/// y) and literals already false under a prior value, and dispatches among
/// empty (unsatisfiable), unit (a new prior value) and stored clauses.
///
/// Does not adjust the solver's variable count. If necessary that has to be
/// done before calling this.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut SolverStateP,
        mut TmpDataP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) {
    if ctx.part(SolverStateP).sat_state == SatState::Unsat {
        return;
    }

    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp_data.lits.clear();
    tmp_data.lits.extend_from_slice(lits);
    let lits = &mut tmp_data.lits;
    let simplified_lits = &mut tmp_data.lits_2;

    lits.sort_unstable();
    lits.dedup();

    // Detect tautological clauses
    let mut last = None;

    for &lit in lits.iter() {
        if last == Some(!lit) {
            return;
        }
        last = Some(lit);
    }

    // Remove literals false under prior values, drop satisfied clauses
    simplified_lits.clear();

    for &lit in lits.iter() {
        match ctx.part(AssignmentP).var_prior(lit.var()) {
            Some(value) if value == lit.is_positive() => return,
            Some(_) => (),
            None => simplified_lits.push(lit),
        }
    }

    match simplified_lits[..] {
        [] => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        [lit] => ctx.part_mut(AssignmentP).set_prior(lit),
        _ => {
            db::add_clause(ctx.borrow(), ClauseHeader::new(), simplified_lits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use crate::context::set_var_count;

    #[test]
    fn unsat_on_empty_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &[]);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn unit_clauses_become_priors() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1]);

        assert_eq!(ctx.part(AssignmentP).prior_count(), 1);

        load_clause(ctx.borrow(), &lits![3, -3]);

        assert_eq!(ctx.part(AssignmentP).prior_count(), 1);

        load_clause(ctx.borrow(), &lits![-2]);

        assert_eq!(ctx.part(AssignmentP).prior_count(), 2);

        load_clause(ctx.borrow(), &lits![1, 1]);

        assert_eq!(ctx.part(AssignmentP).prior_count(), 2);
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);
    }

    #[test]
    fn conflicting_units_are_unsat() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![2]);
        load_clause(ctx.borrow(), &lits![-2]);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn prior_values_simplify_loaded_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1]);
        // Satisfied by the prior, dropped entirely
        load_clause(ctx.borrow(), &lits![1, 2, 3]);

        assert_eq!(ctx.part(ClauseDbP).clauses().len(), 0);

        // -1 is false under the prior, leaving a binary clause
        load_clause(ctx.borrow(), &lits![-1, 2, 3]);

        assert_eq!(ctx.part(ClauseDbP).clauses().len(), 1);

        // ... or a new prior
        load_clause(ctx.borrow(), &lits![-1, 4]);

        assert_eq!(ctx.part(AssignmentP).prior_count(), 2);
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);
    }
}
