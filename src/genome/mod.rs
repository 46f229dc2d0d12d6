//! Expression tree genome
//!
//! This module provides the node graph and the owning `ExpressionTree`
//! used as the individual of every GP run.

pub mod node;
pub mod tree;

pub mod prelude {
    pub use super::node::*;
    pub use super::tree::*;
}
