//! Model reconstruction over the original variables.
//!
//! Preprocessing remembers how each variable left the formula: fixed to a
//! value, renamed, merged into another literal, unconstrained, or eliminated
//! by resolution together with the clauses that mentioned it. Given a model
//! of the reduced formula, walking the event log backwards assigns every
//! eliminated variable a value consistent with the clauses it once appeared
//! in.
use crate::lit::{Lit, Var};

/// How an eliminated variable left the formula.
#[derive(Clone, Debug)]
pub enum ReconstructEvent {
    /// The variable was unconstrained; any value works.
    Free,
    /// The variable was eliminated by resolution; the stored clauses are the
    /// ones that mentioned it.
    Resolved(Vec<Vec<Lit>>),
    /// The variable was merged into the given literal.
    Merged(Lit),
}

/// Extends models of the reduced formula to the original variables.
pub struct Reconstructor {
    old_var_count: usize,
    /// Old variable index to reduced variable, for the surviving variables.
    new_from_old: Vec<Option<Var>>,
    /// Values fixed during preprocessing, by old variable index.
    priors: Vec<Option<bool>>,
    /// Elimination events in the order they were recorded.
    events: Vec<(Var, ReconstructEvent)>,
}

impl Reconstructor {
    pub(super) fn new(
        old_var_count: usize,
        new_from_old: Vec<Option<Var>>,
        priors: Vec<Option<bool>>,
        events: Vec<(Var, ReconstructEvent)>,
    ) -> Reconstructor {
        Reconstructor {
            old_var_count,
            new_from_old,
            priors,
            events,
        }
    }

    /// Number of variables of the original formula.
    pub fn old_var_count(&self) -> usize {
        self.old_var_count
    }

    /// Lift a model of the reduced formula to the original variables.
    ///
    /// `model` holds one literal per reduced variable, indexed by variable.
    /// The result holds one literal per original variable.
    pub fn lift(&self, model: &[Lit]) -> Vec<Lit> {
        let mut values: Vec<Option<bool>> = vec![None; self.old_var_count];

        for (index, value) in values.iter_mut().enumerate() {
            if let Some(new_var) = self.new_from_old[index] {
                *value = Some(model[new_var.index()].is_positive());
            } else if let Some(prior) = self.priors[index] {
                *value = Some(prior);
            }
        }

        // Unconstrained variables are materialised as true up front; their
        // value may feed the clauses of later events.
        for (var, event) in self.events.iter() {
            if let ReconstructEvent::Free = event {
                values[var.index()] = Some(true);
            }
        }

        // Dependencies among eliminated variables resolve in LIFO order.
        for (var, event) in self.events.iter().rev() {
            match event {
                ReconstructEvent::Free => {}
                ReconstructEvent::Merged(lit) => {
                    let target = values[lit.index()]
                        .expect("merge target has no value during reconstruction");
                    values[var.index()] = Some(target == lit.is_positive());
                }
                ReconstructEvent::Resolved(clauses) => {
                    // The first stored clause not satisfied by the other
                    // variables pins this variable's value; with every
                    // clause satisfied any value works.
                    let mut value = true;
                    for clause in clauses {
                        let satisfied_without_var = clause.iter().any(|&lit| {
                            lit.var() != *var
                                && values[lit.index()] == Some(lit.is_positive())
                        });
                        if !satisfied_without_var {
                            let own = clause
                                .iter()
                                .find(|lit| lit.var() == *var)
                                .expect("stored clause misses its variable");
                            value = own.is_positive();
                            break;
                        }
                    }
                    values[var.index()] = Some(value);
                }
            }
        }

        values
            .iter()
            .enumerate()
            .map(|(index, value)| Lit::from_index(index, value.unwrap_or(true)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_variable_satisfies_pending_clause() {
        let reconstructor = Reconstructor::new(
            3,
            vec![None, Some(Var::from_index(0)), Some(Var::from_index(1))],
            vec![None, None, None],
            vec![(
                var!(1),
                ReconstructEvent::Resolved(vec![lits![1, 2].to_vec(), lits![-1, 3].to_vec()]),
            )],
        );

        // 2 false forces 1 true through the first stored clause.
        let lifted = reconstructor.lift(&[lit!(-1), lit!(2)]);
        assert_eq!(lifted, vec![lit!(1), lit!(-2), lit!(3)]);

        // With 2 true the first clause is satisfied; the second one forces
        // nothing either since 3 is true, so the default applies.
        let lifted = reconstructor.lift(&[lit!(1), lit!(2)]);
        assert_eq!(lifted, vec![lit!(1), lit!(2), lit!(3)]);
    }

    #[test]
    fn merged_variable_follows_target() {
        let reconstructor = Reconstructor::new(
            2,
            vec![Some(Var::from_index(0)), None],
            vec![None, None],
            vec![(var!(2), ReconstructEvent::Merged(lit!(-1)))],
        );

        let lifted = reconstructor.lift(&[lit!(1)]);
        assert_eq!(lifted, vec![lit!(1), lit!(-2)]);

        let lifted = reconstructor.lift(&[lit!(-1)]);
        assert_eq!(lifted, vec![lit!(-1), lit!(2)]);
    }

    #[test]
    fn events_resolve_in_reverse_order() {
        // 2 was merged into 3 first, 3 eliminated by resolution afterwards;
        // the reverse walk gives 3 a value before 2 needs it.
        let reconstructor = Reconstructor::new(
            3,
            vec![Some(Var::from_index(0)), None, None],
            vec![None, None, None],
            vec![
                (var!(2), ReconstructEvent::Merged(lit!(3))),
                (
                    var!(3),
                    ReconstructEvent::Resolved(vec![lits![1, -3].to_vec()]),
                ),
            ],
        );

        let lifted = reconstructor.lift(&[lit!(-1)]);
        assert_eq!(lifted, vec![lit!(-1), lit!(-2), lit!(-3)]);

        let lifted = reconstructor.lift(&[lit!(1)]);
        assert_eq!(lifted, vec![lit!(1), lit!(2), lit!(3)]);
    }
}
