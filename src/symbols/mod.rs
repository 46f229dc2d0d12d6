//! Symbol catalog
//!
//! Operators, terminals and the weighted symbol table every tree is built from.

pub mod operator;
pub mod table;
pub mod terminal;

pub mod prelude {
    pub use super::operator::*;
    pub use super::table::*;
    pub use super::terminal::*;
}

