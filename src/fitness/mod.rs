//! Fitness evaluation
//!
//! This module provides the fitness abstraction, sample point sets, and the
//! mean squared error evaluator.

pub mod mse;
pub mod points;
pub mod traits;

pub mod prelude {
    pub use super::mse::*;
    pub use super::points::*;
    pub use super::traits::*;
}
