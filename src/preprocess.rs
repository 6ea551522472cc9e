//! Formula simplification.
//!
//! The preprocessor runs a fixed-point loop over four satisfiability
//! preserving procedures: unit propagation, non-increasing variable
//! elimination by resolution, hyper-binary resolution and equivalent literal
//! merging. It deletes variables and clauses and emits the reduced formula
//! over densely renumbered variables, together with a [`Reconstructor`] that
//! can lift any model of the reduced formula back to the original variables.
//!
//! Everything here works on an owned copy of the formula and is independent
//! of the search engine.
use std::time::Instant;

use log::info;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::cnf::CnfFormula;
use crate::config::SolverConfig;
use crate::lit::{Lit, Var};

mod equiv;
mod hyper;
mod niver;
mod reconstruct;
mod unit;

pub use reconstruct::{ReconstructEvent, Reconstructor};

/// Result of preprocessing a formula.
pub enum Preprocessed {
    /// The formula was found unsatisfiable.
    Unsat,
    /// The reduced formula over densely renumbered variables, and the handle
    /// that lifts its models back to the original variables.
    Reduced {
        formula: CnfFormula,
        reconstruction: Reconstructor,
    },
}

/// Implication graph over literals.
///
/// An edge `a → b` records that the binary clause `{¬a, b}` has been observed
/// or derived, i.e. that `a` implies `b`. The graph is kept closed under
/// contraposition: `a → b` is always accompanied by `¬b → ¬a`. Cycles are
/// expected; they are what equivalent literal merging consumes.
#[derive(Default)]
struct Implications {
    edges: FxHashMap<Lit, FxHashSet<Lit>>,
}

impl Implications {
    /// Add the edge `from → to` and its contrapositive.
    ///
    /// Returns `true` when the edge was new.
    fn add(&mut self, from: Lit, to: Lit) -> bool {
        let new = self.edges.entry(from).or_default().insert(to);
        self.edges.entry(!to).or_default().insert(!from);
        new
    }

    /// Whether the edge `from → to` is present.
    fn implies(&self, from: Lit, to: Lit) -> bool {
        self.edges
            .get(&from)
            .map_or(false, |successors| successors.contains(&to))
    }

    /// All literals directly implied by `from`.
    fn successors(&self, from: Lit) -> Option<&FxHashSet<Lit>> {
        self.edges.get(&from)
    }

    /// Drop all edges and reseed from the binary clauses of the given
    /// formula.
    fn reseed<'a>(&mut self, clauses: impl Iterator<Item = &'a [Lit]>) {
        self.edges.clear();
        for clause in clauses {
            if let [a, b] = *clause {
                self.add(!a, b);
            }
        }
    }
}

/// The working state of the simplifier.
pub struct Preprocessor {
    var_count: usize,
    initial_clause_count: usize,
    /// Live clauses, each sorted, deduplicated and tautology free.
    clauses: Vec<Vec<Lit>>,
    /// Values fixed during simplification, by variable index.
    priors: Vec<Option<bool>>,
    /// Variables removed by resolution, merging or unconstrainedness.
    eliminated: Vec<bool>,
    /// Candidates for the next variable elimination pass.
    touched: Vec<bool>,
    /// Whether variable elimination has not run yet and must visit all
    /// variables.
    visit_all: bool,
    graph: Implications,
    /// Reconstruction log in the order events were recorded.
    events: Vec<(Var, ReconstructEvent)>,
    unsat: bool,
}

/// Simplify a formula within the configured budget.
///
/// The `deadline`, when given, caps the preprocessing budget as well; partial
/// simplification is still sound, so running out of time finalises whatever
/// was achieved instead of discarding it.
pub fn preprocess(
    formula: &CnfFormula,
    config: &SolverConfig,
    deadline: Option<Instant>,
) -> Preprocessed {
    let mut stop = Instant::now() + config.preprocess_timeout;
    if let Some(deadline) = deadline {
        stop = stop.min(deadline);
    }

    let mut pre = Preprocessor::new(formula);

    while !pre.unsat && Instant::now() < stop {
        let mut changed = false;

        pre.graph.reseed(pre.clauses.iter().map(Vec::as_slice));
        changed |= unit::propagate_units(&mut pre);
        if pre.unsat || Instant::now() > stop {
            break;
        }

        changed |= niver::eliminate_variables(&mut pre, stop);
        if pre.unsat || Instant::now() > stop {
            break;
        }

        let hyper_stop = stop.min(Instant::now() + config.hyper_binary_timeout);
        changed |= hyper::hyper_binary_resolve(&mut pre, hyper_stop);
        if pre.unsat || Instant::now() > stop {
            break;
        }

        changed |= equiv::merge_equivalent_literals(&mut pre);

        if !changed {
            break;
        }
    }

    pre.finalize()
}

impl Preprocessor {
    fn new(formula: &CnfFormula) -> Preprocessor {
        let var_count = formula.var_count();
        let mut pre = Preprocessor {
            var_count,
            initial_clause_count: formula.len(),
            clauses: Vec::with_capacity(formula.len()),
            priors: vec![None; var_count],
            eliminated: vec![false; var_count],
            touched: vec![false; var_count],
            visit_all: true,
            graph: Implications::default(),
            events: vec![],
            unsat: false,
        };

        for clause in formula.iter() {
            let mut lits = clause.to_vec();
            lits.sort_unstable();
            lits.dedup();
            if lits.windows(2).any(|pair| pair[0] == !pair[1]) {
                continue;
            }
            if lits.is_empty() {
                pre.unsat = true;
            }
            pre.clauses.push(lits);
        }

        pre
    }

    /// Truth value of a literal under the fixed values, if any.
    fn lit_prior(&self, lit: Lit) -> Option<bool> {
        self.priors[lit.index()].map(|value| value == lit.is_positive())
    }

    /// Fix a literal to true.
    ///
    /// Fixing a literal whose negation is already fixed makes the formula
    /// unsatisfiable.
    fn fix_lit(&mut self, lit: Lit) -> bool {
        match self.lit_prior(lit) {
            Some(true) => false,
            Some(false) => {
                self.unsat = true;
                false
            }
            None => {
                debug_assert!(!self.eliminated[lit.index()]);
                self.priors[lit.index()] = Some(lit.is_positive());
                true
            }
        }
    }

    /// Whether a variable is still part of the working formula.
    fn is_open(&self, var: Var) -> bool {
        !self.eliminated[var.index()] && self.priors[var.index()].is_none()
    }

    fn mark_touched(&mut self, var: Var) {
        self.touched[var.index()] = true;
    }

    /// Emit the reduced formula and the reconstruction handle.
    fn finalize(mut self) -> Preprocessed {
        // A pass can leave fixed literals in clauses when it ran after the
        // last unit propagation; clean up so the output mentions open
        // variables only.
        if !self.unsat {
            unit::propagate_units(&mut self);
        }
        if self.unsat {
            info!("preprocessor: formula is unsatisfiable");
            return Preprocessed::Unsat;
        }

        let mut new_from_old: Vec<Option<Var>> = vec![None; self.var_count];
        let mut survivors = 0;
        for index in 0..self.var_count {
            if self.is_open(Var::from_index(index)) {
                new_from_old[index] = Some(Var::from_index(survivors));
                survivors += 1;
            }
        }

        let mut formula = CnfFormula::new();
        formula.set_var_count(survivors);
        let mut remapped = Vec::new();
        for clause in self.clauses.iter() {
            remapped.clear();
            for &lit in clause {
                let new_var = new_from_old[lit.index()]
                    .expect("fixed or eliminated variable left in clause");
                remapped.push(new_var.lit(lit.is_positive()));
            }
            formula.add_clause(&remapped);
        }

        info!(
            "preprocessor: {} -> {} variables, {} -> {} clauses",
            self.var_count,
            survivors,
            self.initial_clause_count,
            formula.len(),
        );

        Preprocessed::Reduced {
            formula,
            reconstruction: Reconstructor::new(
                self.var_count,
                new_from_old,
                self.priors,
                self.events,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::cnf::strategy::cnf_formula;

    pub(super) fn preprocessed(formula: &CnfFormula) -> Preprocessed {
        preprocess(formula, &SolverConfig::default(), None)
    }

    /// Solve the reduced formula by brute force and check the lifted model
    /// against the original clauses.
    fn check_lifted_models(original: &CnfFormula) {
        let (formula, reconstruction) = match preprocessed(original) {
            Preprocessed::Unsat => return,
            Preprocessed::Reduced {
                formula,
                reconstruction,
            } => (formula, reconstruction),
        };

        let vars = formula.var_count();
        assert!(vars <= 16, "brute force check needs a small formula");

        for bits in 0..(1u32 << vars) {
            let model: Vec<Lit> = (0..vars)
                .map(|index| Lit::from_index(index, bits & (1 << index) != 0))
                .collect();

            let satisfies = formula
                .iter()
                .all(|clause| clause.iter().any(|&l| model[l.index()] == l));

            if satisfies {
                let lifted = reconstruction.lift(&model);
                for clause in original.iter() {
                    assert!(
                        clause.iter().any(|&l| lifted[l.index()] == l),
                        "lifted model misses clause {:?}",
                        clause
                    );
                }
            }
        }
    }

    #[test]
    fn empty_clause_is_unsat() {
        let formula = cnf_formula![
            1, 2;
            ;
        ];
        assert!(matches!(preprocessed(&formula), Preprocessed::Unsat));
    }

    #[test]
    fn equivalent_vars_collapse() {
        // 1 and 2 are equivalent; elimination leaves at most one variable.
        let formula = cnf_formula![
            1, -2;
            -1, 2;
            2, 3;
            -2, -3;
        ];

        match preprocessed(&formula) {
            Preprocessed::Unsat => panic!("satisfiable formula"),
            Preprocessed::Reduced { formula, .. } => {
                assert!(formula.var_count() <= 1);
            }
        }

        check_lifted_models(&formula);
    }

    #[test]
    fn pure_literal_elimination() {
        // 1 appears only positively; the reduced formula is empty.
        let formula = cnf_formula![
            1, 2;
            1, -3;
        ];

        match preprocessed(&formula) {
            Preprocessed::Unsat => panic!("satisfiable formula"),
            Preprocessed::Reduced { formula, .. } => {
                assert_eq!(formula.len(), 0);
            }
        }

        check_lifted_models(&formula);
    }

    #[test]
    fn simplification_is_idempotent() {
        let formula = cnf_formula![
            1, -2;
            -1, 2;
            2, 3, 4;
            -2, -3, -4;
            5, 6;
            -5, 6;
            3, -6, 7;
        ];

        let reduced_once = match preprocessed(&formula) {
            Preprocessed::Unsat => panic!("satisfiable formula"),
            Preprocessed::Reduced { formula, .. } => formula,
        };

        let reduced_twice = match preprocessed(&reduced_once) {
            Preprocessed::Unsat => panic!("satisfiable formula"),
            Preprocessed::Reduced { formula, .. } => formula,
        };

        assert_eq!(reduced_once, reduced_twice);
    }

    proptest! {
        #[test]
        fn lifted_models_satisfy_original(formula in cnf_formula(1..8usize, 0..20, 1..4)) {
            check_lifted_models(&formula);
        }
    }
}
