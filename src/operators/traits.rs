//! Operator traits
//!
//! This module defines the core operator traits for tree-based GP.

use rand::Rng;

use crate::error::{MutationOutcome, OperatorResult};
use crate::genome::tree::ExpressionTree;

/// Selection operator trait
///
/// Selects individuals from a population for reproduction.
pub trait SelectionOperator: Send + Sync {
    /// Select a single individual from the population
    ///
    /// Returns the index of the selected individual. Trees without a
    /// memoized fitness compete as `f64::INFINITY`.
    fn select<R: Rng>(&self, population: &[ExpressionTree], rng: &mut R) -> usize;

    /// Select multiple individuals from the population
    fn select_many<R: Rng>(
        &self,
        population: &[ExpressionTree],
        count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        (0..count).map(|_| self.select(population, rng)).collect()
    }
}

/// Crossover operator trait
///
/// Combines genetic material from two parents into one offspring. The
/// offspring is a fresh tree with no memoized fitness and shares no nodes
/// with either parent.
pub trait CrossoverOperator: Send + Sync {
    /// Apply crossover to two parents and produce one offspring
    fn crossover<R: Rng>(
        &self,
        parent1: &ExpressionTree,
        parent2: &ExpressionTree,
        rng: &mut R,
    ) -> OperatorResult<ExpressionTree>;
}

/// Mutation operator trait
///
/// Applies a random change to a tree in place.
pub trait MutationOperator: Send + Sync {
    /// Apply mutation to a tree in place
    ///
    /// Returns [`MutationOutcome::NotApplicable`], leaving the tree and its
    /// memoized fitness untouched, when the tree has no eligible site.
    fn mutate<R: Rng>(&self, tree: &mut ExpressionTree, rng: &mut R) -> MutationOutcome;
}
