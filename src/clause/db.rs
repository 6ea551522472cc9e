//! Database of stored clauses.
use partial_ref::{partial, PartialRef};

use super::{ClauseHeader, ClauseRef};

use crate::context::{ClauseAllocP, ClauseDbP, Context, WatchlistsP};
use crate::lit::Lit;

/// Database of stored clauses.
///
/// Tracks every clause in the allocator in insertion order. Original clauses
/// are inserted first, learned clauses are appended behind them and are the
/// only clauses ever deleted (wholesale, during clause database reduction).
#[derive(Default)]
pub struct ClauseDb {
    /// All clauses in insertion order, original clauses first.
    pub(super) clauses: Vec<ClauseRef>,
    /// Number of original clauses at the front of `clauses`.
    pub(super) original_count: usize,
}

impl ClauseDb {
    /// The number of original clauses.
    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// The number of learned clauses currently stored.
    pub fn learned_count(&self) -> usize {
        self.clauses.len() - self.original_count
    }

    /// All stored clauses in insertion order.
    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }
}

/// Add a clause to the database and watch its first two literals.
///
/// `lits[0]` and `lits[1]` become the watched pair, so the caller has to
/// arrange the literals accordingly.
pub fn add_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let learned = header.is_learned();

    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);

    ctx.part_mut(WatchlistsP)
        .watch_clause(cref, [lits[0], lits[1]]);

    let db = ctx.part_mut(ClauseDbP);

    if !learned {
        debug_assert_eq!(
            db.original_count,
            db.clauses.len(),
            "original clause added after learned clauses"
        );
        db.original_count += 1;
    }
    db.clauses.push(cref);

    cref
}
