//! # symreg-gp
//!
//! Symbolic regression by genetic programming.
//!
//! This library evolves a population of expression trees until one of them
//! approximates a target function sampled at a set of points.
//!
//! ## Core Concepts
//!
//! - **Expression trees**: owned node graphs over weighted operator and
//!   terminal sets, generated with the "full" and "grow" methods
//! - **Mean squared error fitness**: evaluation failures on a point cost a
//!   fixed penalty instead of aborting the run; lower is better
//! - **Depth-safe operators**: subtree crossover, subtree mutation and point
//!   mutation never break arity or the depth bound
//! - **Reproducible runs**: one seeded generator drives every random choice,
//!   and parallel evaluation draws no random numbers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use symreg_gp::prelude::*;
//!
//! let points = PointSet::linspace("x", -5.0, 5.0, 40, |x| x * x + 2.0 * x);
//! let config = GpConfig::default().with_seed(42);
//!
//! let result = evolve(&config, &points)?;
//! println!("{} (mse {:.6})", result.best, result.best_fitness);
//! ```

pub mod algorithms;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;
pub mod symbols;
pub mod termination;

pub use algorithms::symbolic_regression::evolve;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::config::GpConfig;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::symbols::prelude::*;
    pub use crate::termination::prelude::*;
}
