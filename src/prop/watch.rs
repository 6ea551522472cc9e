//! Watchlists to detect clauses that became unit.
//!
//! Every stored clause has two watches pointing to it, kept in the watchlists
//! of two different literals of the clause. Whenever the watches move to
//! different literals the literals of the clause are permuted so that the
//! watched literals are in positions 0 and 1.
//!
//! While a clause is not unit under the current assignment, the watches point
//! at two non-false literals. When a clause becomes unit the propagated
//! literal is watched and in position 0, the other watched literal is the one
//! with the largest decision level, in position 1. When a clause becomes
//! satisfied before becoming unit the watches can stay where they are.
//!
//! Assigning a literal false can invalidate the invariant; scanning the
//! watches of that literal and moving them restores it, unless a clause has
//! no non-false literals left, which is a conflict. There is no need to touch
//! watchlists on backtracking, as unassigning variables cannot invalidate the
//! invariant.
//!
//! Each watch also stores a blocking literal of the watched clause. When the
//! blocking literal is true the clause is satisfied and the clause data does
//! not need to be accessed at all.
use crate::clause::ClauseRef;
use crate::lit::Lit;

/// A watch on a clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause which has the referring lit in position 0 or 1.
    pub cref: ClauseRef,
    /// A lit of the clause, different from the referring lit.
    pub blocking: Lit,
}

/// Watchlists to detect clauses that became unit.
#[derive(Default)]
pub struct Watchlists {
    /// Watches of clauses in which the negation of the indexing literal is
    /// watched.
    watches: Vec<Vec<Watch>>,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Start watching a clause.
    ///
    /// `lits` have to be the first two literals of the given clause.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.watches[(!lits[i]).code()].push(watch);
        }
    }

    /// Return watches that have to be checked when the given literal became
    /// true.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[(!lit).code()].push(watch)
    }

    /// Remove all watches, keeping the variable count.
    ///
    /// Used when the clause database is rebuilt during reduction.
    pub fn clear(&mut self) {
        for watch_list in self.watches.iter_mut() {
            watch_list.clear();
        }
    }
}
