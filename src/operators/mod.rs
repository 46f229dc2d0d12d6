//! Genetic operators for expression trees
//!
//! Tournament selection, subtree and leaf crossover, and subtree and point
//! mutation. Every operator preserves arity and the tree's depth bound.

pub mod crossover;
pub mod mutation;
pub mod selection;
pub mod traits;

pub mod prelude {
    pub use super::crossover::*;
    pub use super::mutation::*;
    pub use super::selection::*;
    pub use super::traits::*;
}
