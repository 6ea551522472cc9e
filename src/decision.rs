//! Decision heuristics.
use partial_ref::{partial, PartialRef};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Polarity, SolverConfig};
use crate::context::{
    AssignmentP, ClauseAllocP, ClauseDbP, ConfigP, Context, ImplGraphP, RngP, SolverStateP,
    TrailP, VsidsP,
};
use crate::lit::Var;
use crate::prop::{enqueue_assignment, Reason};

pub mod vsids;

pub use vsids::Vsids;

/// The solver's random number generator.
///
/// Seeded once at solver construction; nothing reseeds from the wall clock.
pub struct SolverRng(pub StdRng);

impl Default for SolverRng {
    fn default() -> SolverRng {
        SolverRng(StdRng::seed_from_u64(SolverConfig::default().rng_seed))
    }
}

/// Initialise VSIDS activities from occurrence counts of the stored clauses
/// and rebuild the candidate heap.
pub fn init_vsids(mut ctx: partial!(Context, mut VsidsP, ClauseAllocP, ClauseDbP)) {
    let (vsids, mut ctx) = ctx.split_part_mut(VsidsP);
    let (alloc, ctx) = ctx.split_part(ClauseAllocP);

    vsids.init_occurrence_scores(
        ctx.part(ClauseDbP)
            .clauses()
            .iter()
            .map(|&cref| alloc.clause(cref).lits()),
    );
}

/// Make a decision and enqueue it.
///
/// With a small probability the decision variable is drawn uniformly from the
/// unassigned variables instead of taking the VSIDS choice. The polarity is a
/// static policy.
///
/// Returns `false` if no decision was made because all variables are
/// assigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut RngP,
        mut SolverStateP,
        mut TrailP,
        mut VsidsP,
        ClauseAllocP,
        ConfigP,
    ),
) -> bool {
    if ctx.part(AssignmentP).is_complete() {
        return false;
    }

    let random_prob = ctx.part(ConfigP).random_pick_var_prob;
    let use_random = ctx.part_mut(RngP).0.gen_bool(random_prob);

    let decision_var = if use_random {
        pick_var_random(ctx.borrow())
    } else {
        pick_var_vsids(ctx.borrow())
    };

    let polarity = match ctx.part(ConfigP).polarity {
        Polarity::Positive => true,
        Polarity::Negative => false,
        Polarity::Random => ctx.part_mut(RngP).0.gen(),
    };

    let decision = decision_var.lit(polarity);

    ctx.part_mut(TrailP).new_decision_level();
    enqueue_assignment(ctx.borrow(), decision, Reason::None);

    ctx.part_mut(SolverStateP).stats.decisions += 1;

    true
}

/// Pop the heap until an unassigned variable surfaces.
///
/// Every unassigned variable is in the heap, so this cannot fail while any
/// variable is unassigned.
fn pick_var_vsids(mut ctx: partial!(Context, mut VsidsP, AssignmentP)) -> Var {
    let (vsids, ctx) = ctx.split_part_mut(VsidsP);
    let assignment = ctx.part(AssignmentP);

    loop {
        let var = vsids
            .pop_max()
            .expect("vsids heap empty with unassigned variables left");
        if assignment.var_value(var).is_none() {
            return var;
        }
    }
}

/// Pick a uniformly random unassigned variable.
fn pick_var_random(mut ctx: partial!(Context, mut RngP, AssignmentP)) -> Var {
    let (rng, ctx) = ctx.split_part_mut(RngP);
    let assignment = ctx.part(AssignmentP);

    let unassigned = assignment.var_count() - assignment.assigned_count();
    debug_assert!(unassigned > 0);
    let target = rng.0.gen_range(0..unassigned);

    let mut seen = 0;
    for (index, value) in assignment.assignment().iter().enumerate() {
        if value.is_none() {
            if seen == target {
                return Var::from_index(index);
            }
            seen += 1;
        }
    }

    unreachable!("failed to pick a random unassigned variable")
}
