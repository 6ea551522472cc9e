//! The two-stage solving pipeline.
//!
//! Runs the simplifier, hands the reduced formula to the search engine and
//! lifts a satisfying assignment back to the original variables.
use std::time::{Duration, Instant};

use crate::cnf::CnfFormula;
use crate::config::SolverConfig;
use crate::lit::Lit;
use crate::preprocess::{preprocess, Preprocessed};
use crate::solver::Solver;

/// Result of solving a formula.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// Satisfiable, with one literal per original variable.
    Sat(Vec<Lit>),
    Unsat,
    /// The deadline expired before an answer was found.
    Unknown,
}

/// Simplify and solve a formula.
///
/// `timeout`, when given, bounds the whole run; the result is
/// [`Outcome::Unknown`] once it expires.
pub fn solve_formula(
    formula: &CnfFormula,
    config: &SolverConfig,
    timeout: Option<Duration>,
) -> Outcome {
    let deadline = timeout.map(|timeout| Instant::now() + timeout);

    let (reduced, reconstruction) = match preprocess(formula, config, deadline) {
        Preprocessed::Unsat => return Outcome::Unsat,
        Preprocessed::Reduced {
            formula,
            reconstruction,
        } => (formula, reconstruction),
    };

    let mut solver = Solver::with_config(config.clone());
    solver.add_formula(&reduced);

    match solver.solve(deadline) {
        None => Outcome::Unknown,
        Some(false) => Outcome::Unsat,
        Some(true) => {
            let model = solver.model().expect("sat result without model");
            let lifted = reconstruction.lift(&model);

            debug_assert!(
                satisfies(formula, &lifted),
                "lifted model does not satisfy the original formula"
            );

            Outcome::Sat(lifted)
        }
    }
}

/// Whether a total assignment, one literal per variable, satisfies a
/// formula.
pub fn satisfies(formula: &CnfFormula, model: &[Lit]) -> bool {
    formula
        .iter()
        .all(|clause| clause.iter().any(|&lit| model[lit.index()] == lit))
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::test::{pigeon_hole_formula, sat_formula, sgen_unsat_formula};

    proptest! {
        #[test]
        fn sat_through_pipeline(
            formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0),
        ) {
            match solve_formula(&formula, &SolverConfig::default(), None) {
                Outcome::Sat(model) => prop_assert!(satisfies(&formula, &model)),
                other => prop_assert!(false, "expected sat, got {:?}", other),
            }
        }

        #[test]
        fn unsat_through_pipeline(formula in sgen_unsat_formula(1..5usize)) {
            let outcome = solve_formula(&formula, &SolverConfig::default(), None);
            prop_assert_eq!(outcome, Outcome::Unsat);
        }
    }

    #[test]
    fn pigeons_through_pipeline() {
        for holes in 1..5 {
            let formula = pigeon_hole_formula(holes);
            let outcome = solve_formula(&formula, &SolverConfig::default(), None);
            assert_eq!(outcome, Outcome::Unsat);
        }
    }
}
