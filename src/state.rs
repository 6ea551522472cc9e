//! Miscellaneous solver state.
use std::time::Instant;

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Counters kept during solving.
#[derive(Copy, Clone, Default, Debug)]
pub struct SolverStats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub restarts: u64,
}

/// Miscellaneous solver state.
///
/// Anything larger or any group of related state variables should be moved
/// into a separate part of [`Context`](crate::context::Context).
pub struct SolverState {
    pub sat_state: SatState,
    /// Whether solve was called; a solver cannot be reused.
    pub solver_invoked: bool,
    /// Learned clauses allowed before the next database reduction.
    pub clause_limit: f64,
    /// Wall-clock deadline after which the search reports unknown.
    pub deadline: Option<Instant>,
    pub stats: SolverStats,
}

impl Default for SolverState {
    fn default() -> SolverState {
        SolverState {
            sat_state: SatState::Unknown,
            solver_invoked: false,
            clause_limit: 0.0,
            deadline: None,
            stats: SolverStats::default(),
        }
    }
}
