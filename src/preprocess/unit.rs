//! Unit propagation on the working formula.
use super::Preprocessor;
use crate::lit::Lit;

/// Propagate fixed values to a fixed point.
///
/// Removes satisfied clauses, strips false literals, fixes the literal of
/// every clause that becomes a unit, and follows implication graph edges out
/// of fixed literals. An empty clause marks the formula unsatisfiable.
///
/// Returns whether the formula changed.
pub(super) fn propagate_units(pre: &mut Preprocessor) -> bool {
    let mut ever_changed = false;

    loop {
        let mut changed = false;

        changed |= sweep_clauses(pre);
        if pre.unsat {
            return true;
        }

        changed |= follow_implications(pre);
        if pre.unsat {
            return true;
        }

        ever_changed |= changed;
        if !changed {
            return ever_changed;
        }
    }
}

/// One sweep over all clauses, applying the current fixed values.
fn sweep_clauses(pre: &mut Preprocessor) -> bool {
    let mut changed = false;
    let mut unsat = false;
    let mut new_units: Vec<Lit> = vec![];
    let mut touched: Vec<Lit> = vec![];

    let priors = &pre.priors;
    pre.clauses.retain_mut(|clause| {
        let lit_prior =
            |lit: Lit| priors[lit.index()].map(|value: bool| value == lit.is_positive());

        if clause.iter().any(|&lit| lit_prior(lit) == Some(true)) {
            changed = true;
            touched.extend_from_slice(clause);
            return false;
        }

        let old_len = clause.len();
        clause.retain(|&lit| lit_prior(lit).is_none());
        if clause.len() != old_len {
            changed = true;
            touched.extend_from_slice(clause);
        }

        match clause[..] {
            [] => {
                unsat = true;
                true
            }
            [unit] => {
                new_units.push(unit);
                changed = true;
                false
            }
            _ => true,
        }
    });

    if unsat {
        pre.unsat = true;
        return true;
    }

    for lit in touched {
        pre.mark_touched(lit.var());
    }
    for unit in new_units {
        pre.fix_lit(unit);
        pre.mark_touched(unit.var());
        if pre.unsat {
            return true;
        }
    }

    changed
}

/// Fix every literal the implication graph derives from a fixed literal.
fn follow_implications(pre: &mut Preprocessor) -> bool {
    let mut changed = false;

    let mut worklist: Vec<Lit> = pre
        .priors
        .iter()
        .enumerate()
        .filter_map(|(index, prior)| prior.map(|value| Lit::from_index(index, value)))
        .collect();

    while let Some(fixed) = worklist.pop() {
        let implied: Vec<Lit> = match pre.graph.successors(fixed) {
            Some(successors) => successors.iter().cloned().collect(),
            None => continue,
        };

        for lit in implied {
            if pre.eliminated[lit.index()] {
                continue;
            }
            if pre.fix_lit(lit) {
                changed = true;
                pre.mark_touched(lit.var());
                worklist.push(lit);
            }
            if pre.unsat {
                return true;
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::super::{Preprocessed, SolverConfig};
    use super::*;

    use crate::cnf::CnfFormula;

    fn run(formula: &CnfFormula) -> Preprocessed {
        super::super::preprocess(formula, &SolverConfig::default(), None)
    }

    #[test]
    fn unit_chain_fixes_everything() {
        let formula = cnf_formula![
            1;
            -1, 2;
            -2, 3;
        ];

        match run(&formula) {
            Preprocessed::Unsat => panic!("satisfiable formula"),
            Preprocessed::Reduced {
                formula,
                reconstruction,
            } => {
                assert_eq!(formula.var_count(), 0);
                assert_eq!(formula.len(), 0);

                let lifted = reconstruction.lift(&[]);
                assert_eq!(lifted, vec![lit!(1), lit!(2), lit!(3)]);
            }
        }
    }

    #[test]
    fn contradicting_units_are_unsat() {
        let formula = cnf_formula![
            1;
            -1, 2;
            -2, -1;
        ];

        assert!(matches!(run(&formula), Preprocessed::Unsat));
    }
}
