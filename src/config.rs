//! Solver configuration.
use std::time::Duration;

/// Polarity assigned to decision variables.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Polarity {
    Positive,
    Negative,
    Random,
}

/// Configurable parameters used during preprocessing and solving.
///
/// The defaults are compiled in; there is no config file.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Fraction of learned clauses kept during clause database reduction.
    ///
    /// [default: 0.5]
    pub clause_keep_ratio: f64,

    /// Initial learned clause limit as a fraction of the original clause
    /// count.
    ///
    /// [default: 1/3]
    pub clause_limit_init_factor: f64,

    /// Growth factor for the learned clause limit after each reduction.
    ///
    /// [default: 1.1]
    pub clause_limit_inc_factor: f64,

    /// Probability of making a uniformly random decision instead of the
    /// VSIDS choice.
    ///
    /// [default: 0.01]
    pub random_pick_var_prob: f64,

    /// Multiplicative decay for the VSIDS decision heuristic.
    ///
    /// [default: 0.5]
    pub vsids_decay_factor: f64,

    /// Number of conflicts between VSIDS decays.
    ///
    /// [default: 256]
    pub vsids_decay_period: u64,

    /// Rescale all activities when the bump value reaches this.
    ///
    /// [default: 1e100]
    pub vsids_rescale_threshold: f64,

    /// Polarity assigned to decision variables.
    ///
    /// [default: Negative]
    pub polarity: Polarity,

    /// Budget for failed-literal probing.
    ///
    /// [default: 20s]
    pub probe_timeout: Duration,

    /// Budget for the preprocessor as a whole.
    ///
    /// [default: 40s]
    pub preprocess_timeout: Duration,

    /// Budget for a single hyper-binary resolution pass.
    ///
    /// [default: 5s]
    pub hyper_binary_timeout: Duration,

    /// Number of search iterations between deadline checks and progress
    /// logs.
    ///
    /// [default: 20000]
    pub log_period: u64,

    /// Seed for the solver's random number generator.
    ///
    /// Seeded once at construction; nothing reseeds from the wall clock.
    pub rng_seed: u64,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            clause_keep_ratio: 0.5,
            clause_limit_init_factor: 1.0 / 3.0,
            clause_limit_inc_factor: 1.1,
            random_pick_var_prob: 0.01,
            vsids_decay_factor: 0.5,
            vsids_decay_period: 256,
            vsids_rescale_threshold: 1e100,
            polarity: Polarity::Negative,
            probe_timeout: Duration::from_secs(20),
            preprocess_timeout: Duration::from_secs(40),
            hyper_binary_timeout: Duration::from_secs(5),
            log_period: 20_000,
            rng_seed: 0x5EED_1E77,
        }
    }
}
