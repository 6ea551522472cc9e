//! Partial assignment and decision trail.
use partial_ref::{partial, PartialRef};

use crate::context::{AssignmentP, ClauseAllocP, Context, ImplGraphP, TrailP, VsidsP};
use crate::lit::{Lit, LitIdx, Var};

use super::{Reason, ImplNode};

/// Current partial assignment with permanent prior values.
///
/// A prior value is a top-level fact: it is reapplied after every restart and
/// is never backtracked. Priors are monotonic, a variable's prior is set at
/// most once.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
    prior: Vec<Option<bool>>,
    assigned_count: usize,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
        self.prior.resize(count, None);
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.assignment.len()
    }

    /// Whether every variable is assigned.
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.assignment.len()
    }

    /// Number of assigned variables.
    pub fn assigned_count(&self) -> usize {
        self.assigned_count
    }

    /// Current assignment by variable index.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    pub fn lit_is_unk(&self, lit: Lit) -> bool {
        self.assignment[lit.index()].is_none()
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        debug_assert!(self.lit_is_unk(lit));
        self.assignment[lit.index()] = lit.is_positive().into();
        self.assigned_count += 1;
    }

    pub fn unassign_var(&mut self, var: Var) {
        debug_assert!(self.assignment[var.index()].is_some());
        self.assignment[var.index()] = None;
        self.assigned_count -= 1;
    }

    /// Prior value of a variable.
    pub fn var_prior(&self, var: Var) -> Option<bool> {
        self.prior[var.index()]
    }

    /// Whether a variable has a prior value.
    pub fn var_has_prior(&self, var: Var) -> bool {
        self.prior[var.index()].is_some()
    }

    /// Make the given literal a permanent top-level fact.
    ///
    /// Setting an already set prior to the same value is a no-op; to the
    /// opposite value a bug.
    pub fn set_prior(&mut self, lit: Lit) {
        let prior = &mut self.prior[lit.index()];
        debug_assert_ne!(*prior, Some(lit.is_negative()), "prior value flipped");
        *prior = Some(lit.is_positive());
    }

    /// Number of variables with a prior value.
    pub fn prior_count(&self) -> usize {
        self.prior.iter().filter(|prior| prior.is_some()).count()
    }
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all propagated and enqueued assignments.
    trail: Vec<Lit>,
    /// Next assignment in trail to propagate.
    queue_head_pos: usize,
    /// Trail lengths recorded when each decision level was entered.
    decisions: Vec<LitIdx>,
}

impl Trail {
    /// Return the next assigned literal to propagate and advance the queue.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        let head = self.trail.get(self.queue_head_pos).cloned();
        if head.is_some() {
            self.queue_head_pos += 1;
        }
        head
    }

    /// Discard all unprocessed queue entries.
    pub fn drain_queue(&mut self) {
        self.queue_head_pos = self.trail.len();
    }

    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Record a snapshot and enter a new decision level.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx);
    }

    /// Current decision level.
    ///
    /// Level 0 holds the unconditional assignments derived from prior values.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }
}

/// Enqueues the assignment of true to a literal.
///
/// This updates the assignment and trail but does not perform any
/// propagation. The literal has to be unassigned when calling this.
///
/// The implied depth of the assignment is one more than the largest implied
/// depth among the reason's literals of the current level, or 0 when there is
/// no reason clause.
pub fn enqueue_assignment(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        ClauseAllocP,
    ),
    lit: Lit,
    reason: Reason,
) {
    ctx.part_mut(AssignmentP).assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    trail.trail.push(lit);
    let level = trail.decisions.len() as LitIdx;

    let (graph, ctx) = ctx.split_part_mut(ImplGraphP);

    let mut depth = 0;
    if let Reason::Clause(cref) = reason {
        let alloc = ctx.part(ClauseAllocP);
        for &reason_lit in alloc.clause(cref).lits() {
            if reason_lit.var() == lit.var() {
                continue;
            }
            let node = &graph.nodes[reason_lit.index()];
            if node.level == level {
                depth = depth.max(node.depth + 1);
            }
        }
    }

    graph.nodes[lit.index()] = ImplNode {
        reason,
        level,
        depth,
    };
}

/// Undo all levels down to, but not including, `target_level - 1`.
///
/// Afterwards the current decision level is `target_level - 1` and every
/// trail entry has a level below `target_level`.
pub fn backtrack_until(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP, mut VsidsP),
    target_level: usize,
) {
    debug_assert!(target_level >= 1);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    if trail.decisions.len() < target_level {
        return;
    }

    let keep = trail.decisions[target_level - 1] as usize;
    debug_assert!(trail.queue_head_pos >= keep);

    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
    for &lit in &trail.trail[keep..] {
        assignment.unassign_var(lit.var());
        ctx.part_mut(VsidsP).make_available(lit.var());
    }

    trail.trail.truncate(keep);
    trail.decisions.truncate(target_level - 1);
    trail.queue_head_pos = keep;
}

/// Undo all assignments, including the unconditional ones of level 0.
///
/// Prior values survive; [`apply_priors`] puts them back onto the trail.
pub fn full_restart(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP, mut VsidsP),
) {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);

    for &lit in &trail.trail {
        assignment.unassign_var(lit.var());
        ctx.part_mut(VsidsP).make_available(lit.var());
    }

    trail.trail.clear();
    trail.decisions.clear();
    trail.queue_head_pos = 0;
}

/// Enqueue every prior value that is not currently assigned.
///
/// Must be called at decision level 0. The caller is responsible for
/// propagating afterwards.
pub fn apply_priors(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        ClauseAllocP,
    ),
) {
    debug_assert_eq!(ctx.part(TrailP).current_level(), 0);

    for index in 0..ctx.part(AssignmentP).var_count() {
        let var = Var::from_index(index);
        if let Some(value) = ctx.part(AssignmentP).var_prior(var) {
            if ctx.part(AssignmentP).var_value(var).is_none() {
                enqueue_assignment(ctx.borrow(), var.lit(value), Reason::None);
            }
        }
    }
}
