//! Temporary data.
use crate::lit::Lit;

/// Scratch buffers used by various parts of the solver.
///
/// Check the documented invariants when adding users.
#[derive(Default)]
pub struct TmpData {
    /// Cleared before use.
    pub lits: Vec<Lit>,
    /// Cleared before use.
    pub lits_2: Vec<Lit>,
}
