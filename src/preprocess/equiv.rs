//! Equivalent literal merging.
//!
//! Two literals on a cycle of the implication graph are equivalent. Every
//! equivalence class is collapsed into its representative, the literal of
//! the smallest participating variable, and the merged variables are removed
//! from the formula.
use super::{Preprocessor, ReconstructEvent};
use crate::lit::{Lit, Var};

/// Union-find over variables with a polarity relative to the parent.
///
/// `find` returns the root and the sign of the variable's value relative to
/// the root's value: `value(v) = value(root) ^ sign`.
struct PolarityForest {
    parent: Vec<u32>,
    sign: Vec<bool>,
}

impl PolarityForest {
    fn new(count: usize) -> PolarityForest {
        PolarityForest {
            parent: (0..count as u32).collect(),
            sign: vec![false; count],
        }
    }

    fn find(&mut self, var: Var) -> (Var, bool) {
        let mut index = var.index();
        let mut sign = false;
        while self.parent[index] as usize != index {
            sign ^= self.sign[index];
            index = self.parent[index] as usize;
        }
        let root = index;

        // Path compression toward the root
        let mut index = var.index();
        let mut relative = sign;
        while self.parent[index] as usize != root {
            let next = self.parent[index] as usize;
            let next_relative = relative ^ self.sign[index];
            self.parent[index] = root as u32;
            self.sign[index] = relative;
            index = next;
            relative = next_relative;
        }

        (Var::from_index(root), sign)
    }

    /// Join the classes of two equivalent literals.
    ///
    /// Returns `false` when the union shows a literal equivalent to its own
    /// negation, which makes the formula unsatisfiable.
    fn union(&mut self, a: Lit, b: Lit) -> bool {
        let (root_a, sign_a) = self.find(a.var());
        let (root_b, sign_b) = self.find(b.var());

        // value(a.var) ^ sign_of(a) == value(b.var) ^ sign_of(b)
        let parity = sign_a ^ sign_b ^ a.is_negative() ^ b.is_negative();

        if root_a == root_b {
            return !parity;
        }

        // The smaller variable index becomes the class representative.
        if root_a.index() < root_b.index() {
            self.parent[root_b.index()] = root_a.index() as u32;
            self.sign[root_b.index()] = parity;
        } else {
            self.parent[root_a.index()] = root_b.index() as u32;
            self.sign[root_a.index()] = parity;
        }
        true
    }
}

/// Merge all equivalence classes found in the implication graph.
///
/// Returns whether any variable was merged away.
pub(super) fn merge_equivalent_literals(pre: &mut Preprocessor) -> bool {
    let mut forest = PolarityForest::new(pre.var_count);
    let mut any_union = false;

    for (&from, successors) in pre.graph.edges.iter() {
        for &to in successors {
            if from.var() == to.var() || !pre.graph.implies(to, from) {
                continue;
            }
            // Both `from → to` and `to → from`: the literals are equivalent.
            if !pre.is_open(from.var()) || !pre.is_open(to.var()) {
                continue;
            }
            if !forest.union(from, to) {
                pre.unsat = true;
                return true;
            }
            any_union = true;
        }
    }

    if !any_union {
        return false;
    }

    // Substitute representatives and record the merges.
    let mut changed = false;
    for index in 0..pre.var_count {
        let var = Var::from_index(index);
        if !pre.is_open(var) {
            continue;
        }
        let (root, sign) = forest.find(var);
        if root == var {
            continue;
        }
        debug_assert!(pre.is_open(root));
        pre.eliminated[index] = true;
        pre.events
            .push((var, ReconstructEvent::Merged(root.lit(!sign))));
        pre.mark_touched(var);
        pre.mark_touched(root);
        changed = true;
    }

    if !changed {
        return false;
    }

    let mut substituted = Vec::new();
    let touched = &mut pre.touched;
    pre.clauses.retain_mut(|clause| {
        let needs_substitution = clause
            .iter()
            .any(|&lit| forest.find(lit.var()).0 != lit.var());
        if !needs_substitution {
            return true;
        }

        // Rewriting a clause makes all its variables elimination candidates
        // again.
        for &lit in clause.iter() {
            touched[lit.index()] = true;
        }

        substituted.clear();
        substituted.extend(clause.iter().map(|&lit| {
            let (root, sign) = forest.find(lit.var());
            root.lit(lit.is_positive() ^ sign)
        }));
        substituted.sort_unstable();
        substituted.dedup();

        if substituted.windows(2).any(|pair| pair[0] == !pair[1]) {
            return false;
        }

        clause.clear();
        clause.extend_from_slice(&substituted);
        true
    });

    changed
}
