//! Population management
//!
//! A generation of expression trees together with its counter, ranking and
//! evaluation helpers.

#[allow(clippy::module_inception)]
pub mod population;

pub mod prelude {
    pub use super::population::*;
}
