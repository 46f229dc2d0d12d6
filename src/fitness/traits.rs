//! Fitness traits
//!
//! This module defines the fitness evaluation trait. Fitness is an error
//! measure: lower is better, and `f64::INFINITY` marks an unusable tree.

use crate::genome::tree::ExpressionTree;

/// Fitness evaluation trait
///
/// Implementations must be deterministic: the same tree always yields the
/// same value, which is what makes memoization on the tree sound.
#[cfg(feature = "parallel")]
pub trait Fitness: Send + Sync {
    /// Evaluate fitness (lower = better)
    fn evaluate(&self, tree: &ExpressionTree) -> f64;
}

/// Fitness evaluation trait (non-parallel version)
///
/// Implementations must be deterministic: the same tree always yields the
/// same value, which is what makes memoization on the tree sound.
#[cfg(not(feature = "parallel"))]
pub trait Fitness {
    /// Evaluate fitness (lower = better)
    fn evaluate(&self, tree: &ExpressionTree) -> f64;
}

/// A simple function wrapper for fitness evaluation
pub struct FnFitness<F>
where
    F: Fn(&ExpressionTree) -> f64,
{
    f: F,
}

impl<F> FnFitness<F>
where
    F: Fn(&ExpressionTree) -> f64,
{
    /// Create a new function-based fitness evaluator
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[cfg(feature = "parallel")]
impl<F> Fitness for FnFitness<F>
where
    F: Fn(&ExpressionTree) -> f64 + Send + Sync,
{
    fn evaluate(&self, tree: &ExpressionTree) -> f64 {
        (self.f)(tree)
    }
}

#[cfg(not(feature = "parallel"))]
impl<F> Fitness for FnFitness<F>
where
    F: Fn(&ExpressionTree) -> f64,
{
    fn evaluate(&self, tree: &ExpressionTree) -> f64 {
        (self.f)(tree)
    }
}

impl<T: Fitness + ?Sized> Fitness for &T {
    fn evaluate(&self, tree: &ExpressionTree) -> f64 {
        (**self).evaluate(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::node::TreeNode;
    use crate::symbols::terminal::Terminal;

    #[test]
    fn test_fn_fitness() {
        let fitness = FnFitness::new(|tree: &ExpressionTree| tree.size() as f64);
        let tree = ExpressionTree::new(TreeNode::terminal(Terminal::var("x")), 2);
        assert_eq!(fitness.evaluate(&tree), 1.0);
    }

    #[test]
    fn test_reference_is_fitness() {
        fn score<F: Fitness>(f: F, tree: &ExpressionTree) -> f64 {
            f.evaluate(tree)
        }
        let fitness = FnFitness::new(|_: &ExpressionTree| 0.5);
        let tree = ExpressionTree::from(Terminal::Constant(1.0));
        assert_eq!(score(&fitness, &tree), 0.5);
    }
}
