//! Learns a new clause by analyzing a conflict.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use partial_ref::{partial, PartialRef};

use rustc_hash::FxHashSet;

use crate::context::{
    AnalyzeConflictP, AssignmentP, ClauseAllocP, Context, ImplGraphP, SolverStateP, TrailP,
    VsidsP,
};
use crate::lit::{Lit, Var};
use crate::prop::{Conflict, Reason};

/// Queue entry of the resolution queue.
///
/// Ordered by the implied depth of the literal's variable, so that the most
/// recently implied literal of the conflict level is resolved first. The
/// literal code breaks ties to keep the derivation deterministic.
#[derive(Copy, Clone, Eq, PartialEq)]
struct Resolvable {
    depth: usize,
    lit: Lit,
}

impl Ord for Resolvable {
    fn cmp(&self, other: &Resolvable) -> Ordering {
        (self.depth, self.lit.code()).cmp(&(other.depth, other.lit.code()))
    }
}

impl PartialOrd for Resolvable {
    fn partial_cmp(&self, other: &Resolvable) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Temporaries for conflict analysis.
#[derive(Default)]
pub struct AnalyzeConflict {
    /// The learned clause after analysis finishes, asserting literal in
    /// position 0 and the literal of the backjump level in position 1.
    clause: Vec<Lit>,
    /// Literal block distance of the learned clause.
    lbd: u32,
    /// Pending resolution candidates, deepest implication first.
    queue: BinaryHeap<Resolvable>,
    /// Variables already part of the derivation.
    var_seen: Vec<bool>,
    /// Entries to clean in `var_seen`.
    to_clean: Vec<Var>,
    /// Distinct nonzero decision levels, for the LBD computation.
    levels: FxHashSet<usize>,
    /// Queued literals at the conflict's decision level.
    current_level_count: usize,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_seen.resize(count, false);
    }

    /// The learned clause.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }

    /// Literal block distance of the learned clause.
    pub fn lbd(&self) -> u32 {
        self.lbd
    }
}

/// Learns a new clause by analyzing a conflict.
///
/// The derivation starts from the literals of the conflict clause and
/// repeatedly resolves the queued literal with the largest implied depth
/// against its reason clause, until a single literal of the conflict's
/// decision level remains: the first unique implication point. Literals fixed
/// by prior values are dropped from the result.
///
/// Fills the learned clause (asserting literal in position 0) and returns the
/// backjump target level: the learned clause stays intact below that level.
/// A target of 0 means the conflict is unconditional and the formula is
/// unsatisfiable.
pub fn analyze_conflict(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut ClauseAllocP,
        mut SolverStateP,
        mut VsidsP,
        AssignmentP,
        ImplGraphP,
        TrailP,
    ),
    conflict: Conflict,
) -> usize {
    ctx.part_mut(SolverStateP).stats.conflicts += 1;
    ctx.part_mut(VsidsP).on_conflict();

    let conflict_level = ctx.part(TrailP).current_level();

    {
        let analyze = ctx.part_mut(AnalyzeConflictP);
        analyze.clause.clear();
        analyze.queue.clear();
        analyze.levels.clear();
        analyze.lbd = 0;
        analyze.current_level_count = 0;
    }

    if conflict_level == 0 {
        // Conflict with no decisions, the empty clause is derivable.
        return 0;
    }

    {
        let header = ctx.part_mut(ClauseAllocP).header_mut(conflict.cref);
        if header.is_learned() {
            header.bump_used();
        }
    }

    // We start with all literals of the conflicted clause.
    let conflict_len = ctx.part(ClauseAllocP).clause(conflict.cref).lits().len();
    for i in 0..conflict_len {
        let lit = ctx.part(ClauseAllocP).clause(conflict.cref).lits()[i];
        add_literal(ctx.borrow(), lit, conflict_level);
    }

    // To get rid of all but one literal of the conflict level, we resolve the
    // clause with the reasons of those literals, deepest implication first.
    while ctx.part(AnalyzeConflictP).current_level_count > 1 {
        let resolvable = ctx
            .part_mut(AnalyzeConflictP)
            .queue
            .pop()
            .expect("conflict level literals lost from resolution queue");
        let lit = resolvable.lit;
        let level = ctx.part(ImplGraphP).level(lit.var());

        if level != conflict_level {
            // Deeper levels are exhausted, but the queue can still surface
            // literals below the conflict level; they belong to the learned
            // clause unless a prior value fixes them.
            if !ctx.part(AssignmentP).var_has_prior(lit.var()) {
                ctx.part_mut(AnalyzeConflictP).clause.push(lit);
            }
            continue;
        }

        ctx.part_mut(AnalyzeConflictP).current_level_count -= 1;

        let reason = ctx.part(ImplGraphP).reason(lit.var());
        let cref = match reason {
            Reason::Clause(cref) => cref,
            Reason::None => unreachable!(
                "resolved through the decision of the conflict level"
            ),
        };

        {
            let header = ctx.part_mut(ClauseAllocP).header_mut(cref);
            if header.is_learned() {
                header.bump_used();
            }
        }

        let reason_len = ctx.part(ClauseAllocP).clause(cref).lits().len();
        for i in 0..reason_len {
            let reason_lit = ctx.part(ClauseAllocP).clause(cref).lits()[i];
            if reason_lit.var() != lit.var() {
                add_literal(ctx.borrow(), reason_lit, conflict_level);
            }
        }
    }

    // Exactly one conflict level literal is left in the queue: the first
    // unique implication point. Drain it and the remaining lower level
    // literals into the learned clause.
    while let Some(resolvable) = ctx.part_mut(AnalyzeConflictP).queue.pop() {
        let lit = resolvable.lit;
        if !ctx.part(AssignmentP).var_has_prior(lit.var()) {
            ctx.part_mut(AnalyzeConflictP).clause.push(lit);
        }
    }

    finish_clause(ctx.borrow(), conflict_level)
}

/// Add a literal to the derivation if its variable is new.
///
/// Newly seen variables get a VSIDS bump; the literal is queued for
/// resolution or inclusion.
fn add_literal(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut VsidsP,
        ImplGraphP,
    ),
    lit: Lit,
    conflict_level: usize,
) {
    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);
    if analyze.var_seen[lit.index()] {
        return;
    }
    analyze.var_seen[lit.index()] = true;
    analyze.to_clean.push(lit.var());

    let level = ctx.part(ImplGraphP).level(lit.var());
    let depth = ctx.part(ImplGraphP).depth(lit.var());
    if level == conflict_level {
        analyze.current_level_count += 1;
    }
    if level > 0 {
        ctx.part_mut(VsidsP).bump(lit.var());
    }
    analyze.queue.push(Resolvable { depth, lit });
}

/// Order the learned clause, compute its statistics and the backjump level.
fn finish_clause(
    mut ctx: partial!(Context, mut AnalyzeConflictP, ImplGraphP),
    conflict_level: usize,
) -> usize {
    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let graph = ctx.part(ImplGraphP);

    for var in analyze.to_clean.drain(..) {
        analyze.var_seen[var.index()] = false;
    }

    for &lit in analyze.clause.iter() {
        let level = graph.level(lit.var());
        if level > 0 {
            analyze.levels.insert(level);
        }
    }
    analyze.lbd = analyze.levels.len() as u32;

    if analyze.clause.is_empty() {
        return 0;
    }

    // The asserting literal is the unique literal of the conflict level; move
    // it into position 0.
    let asserting = analyze
        .clause
        .iter()
        .position(|&lit| graph.level(lit.var()) == conflict_level)
        .expect("learned clause lost its conflict level literal");
    analyze.clause.swap(0, asserting);

    if analyze.clause.len() == 1 {
        return 1;
    }

    // The backjump target is the largest level below the conflict level; move
    // its literal into position 1 so the watch invariant survives the jump.
    let mut target = 1;
    for i in 1..analyze.clause.len() {
        let level = graph.level(analyze.clause[i].var());
        let target_level = graph.level(analyze.clause[1].var());
        if level > target_level {
            analyze.clause.swap(1, i);
        }
    }
    let max_level = graph.level(analyze.clause[1].var());
    if max_level > 0 {
        target = max_level;
    }

    target
}
