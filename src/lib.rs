//! A CNF satisfiability solver.
//!
//! The solving pipeline has two stages: a formula simplifier that deletes
//! variables and clauses while preserving satisfiability (see
//! [`preprocess`]), and a conflict driven clause learning search engine over
//! the reduced formula. A [`preprocess::Reconstructor`] lifts any model of
//! the reduced formula back to the original variables.

/// Shortcut for tests
#[cfg(test)]
#[doc(hidden)]
#[macro_export]
macro_rules! lit {
    ($x:expr) => {
        $crate::lit::Lit::from_dimacs($x)
    };
}

/// Shortcut for tests
#[cfg(test)]
#[doc(hidden)]
#[macro_export]
macro_rules! var {
    ($x:expr) => {
        $crate::lit::Var::from_dimacs($x)
    };
}

/// Shortcut for tests
#[cfg(test)]
#[doc(hidden)]
#[macro_export]
macro_rules! lits {
    ( $( $x:expr ),* ) => { [ $( $crate::lit!( $x ) ),* ] };
    ( $( $x:expr ),* , ) => { $crate::lits! [ $( $x ),* ] };
}

/// Shortcut for tests
#[cfg(test)]
#[doc(hidden)]
#[macro_export]
macro_rules! cnf {
    ( $( $( $x:expr ),* );* ; ) => {
        [ $( &[ $( $crate::lit!( $x ) ),* ] as &[$crate::lit::Lit] ),* ]
    };
}

/// Shortcut for tests
#[cfg(test)]
#[doc(hidden)]
#[macro_export]
macro_rules! cnf_formula {
    ( $( $t:tt )* ) => {
        $crate::cnf::CnfFormula::from($crate::cnf![ $($t)* ].iter().cloned())
    };
}

pub mod lit;
pub mod cnf;
pub mod config;
pub mod dimacs;
pub mod pipeline;
pub mod preprocess;
pub mod solver;

mod analyze_conflict;
mod cdcl;
mod clause;
mod context;
mod decision;
mod load;
mod probe;
mod prop;
mod state;
mod tmp;

#[cfg(test)]
mod test;
