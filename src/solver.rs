//! Boolean satisfiability solver.
use std::io;
use std::time::Instant;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cdcl::search;
use crate::cnf::CnfFormula;
use crate::config::SolverConfig;
use crate::context::{
    set_var_count, AssignmentP, ClauseDbP, ConfigP, Context, RngP, SolverStateP, VsidsP,
};
use crate::decision::init_vsids;
use crate::dimacs::DimacsParser;
use crate::lit::{Lit, Var};
use crate::load::load_clause;
use crate::probe::probe_literals;
use crate::prop::{apply_priors, propagate_level_zero};
use crate::state::SatState;

/// A boolean satisfiability solver.
///
/// Runs the CDCL search over the formula as given; use
/// [`pipeline`](crate::pipeline) to solve with preprocessing.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver with the default configuration.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Create a new solver with the given configuration.
    pub fn with_config(config: SolverConfig) -> Solver {
        let mut solver = Solver::default();
        let mut ctx = solver.ctx.into_partial_ref_mut();
        ctx.part_mut(RngP).0 = StdRng::seed_from_u64(config.rng_seed);
        ctx.part_mut(VsidsP).apply_config(&config);
        *ctx.part_mut(ConfigP) = config;
        solver
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        set_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let formula = DimacsParser::parse(input)?;
        self.add_formula(&formula);
        Ok(())
    }

    /// Check the satisfiability of the current formula.
    ///
    /// Returns `None` when the deadline expired before an answer was found.
    /// A solver cannot be reused after this returns.
    pub fn solve(&mut self, deadline: Option<Instant>) -> Option<bool> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        assert!(
            !ctx.part(SolverStateP).solver_invoked,
            "solve called twice on the same solver"
        );
        ctx.part_mut(SolverStateP).solver_invoked = true;
        ctx.part_mut(SolverStateP).deadline = deadline;

        if ctx.part(SolverStateP).sat_state == SatState::Unknown {
            let originals = ctx.part(ClauseDbP).original_count() as f64;
            let init_factor = ctx.part(ConfigP).clause_limit_init_factor;
            ctx.part_mut(SolverStateP).clause_limit = originals * init_factor;

            init_vsids(ctx.borrow());

            apply_priors(ctx.borrow());
            if propagate_level_zero(ctx.borrow()).is_err() {
                ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
            } else if ctx.part(AssignmentP).is_complete() {
                ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
            } else {
                probe_literals(ctx.borrow());
                if ctx.part(SolverStateP).sat_state == SatState::Unknown {
                    search(ctx.borrow());
                }
            }
        }

        let stats = ctx.part(SolverStateP).stats;
        info!(
            "decisions: {} propagations: {} conflicts: {} restarts: {} priors: {}",
            stats.decisions,
            stats.propagations,
            stats.conflicts,
            stats.restarts,
            ctx.part(AssignmentP).prior_count(),
        );

        match ctx.part(SolverStateP).sat_state {
            SatState::Unknown => None,
            SatState::Sat => Some(true),
            SatState::Unsat => Some(false),
        }
    }

    /// Set of literals that satisfy the formula.
    ///
    /// Contains one literal per variable. Only available after
    /// [`solve`](Solver::solve) returned `Some(true)`.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state == SatState::Sat {
            Some(
                ctx.part(AssignmentP)
                    .assignment()
                    .iter()
                    .enumerate()
                    .map(|(index, assignment)| {
                        // Unconstrained variables default to true
                        Var::from_index(index).lit(assignment.unwrap_or(true))
                    })
                    .collect(),
            )
        } else {
            None
        }
    }
}
