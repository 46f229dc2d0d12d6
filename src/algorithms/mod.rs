//! Evolutionary algorithms
//!
//! This module provides the two generation-step models and the driver that
//! runs them to termination.
//!
//! - [`generational::GenerationalStep`] rebuilds the whole population from
//!   offspring and carries the elites over unchanged.
//! - [`steady_state::SteadyStateStep`] inserts offspring one at a time in
//!   place of the current worst tree.

use std::sync::Arc;

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GpConfig;
use crate::error::{EvoResult, OperatorResult};
use crate::fitness::traits::Fitness;
use crate::genome::tree::ExpressionTree;
use crate::operators::crossover::SubtreeCrossover;
use crate::operators::mutation::{PointMutation, SubtreeMutation};
use crate::operators::selection::TournamentSelection;
use crate::operators::traits::{CrossoverOperator, MutationOperator, SelectionOperator};
use crate::population::population::Population;
use crate::symbols::table::SymbolTable;

pub mod generational;
pub mod steady_state;
pub mod symbolic_regression;

/// Generation step model
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementStrategy {
    /// Replace the population wholesale, keeping the elites
    #[default]
    Generational,
    /// Replace the worst tree whenever an offspring beats it
    SteadyState,
}

/// What a single generation step did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Offspring produced
    pub offspring: usize,
    /// Trees that left the population
    pub replaced: usize,
    /// Fitness evaluations performed inside the step
    pub evaluations: usize,
}

/// One generation of a GP run
pub trait GenerationStep: Send + Sync {
    /// Advance `population` by one generation
    ///
    /// Trees lacking a memoized fitness are evaluated before any selection
    /// takes place. The generation counter is incremented on success.
    fn step<Fit, R>(
        &self,
        population: &mut Population,
        fitness: &Fit,
        rng: &mut R,
    ) -> EvoResult<StepReport>
    where
        Fit: Fitness + ?Sized,
        R: Rng;
}

/// Selection, crossover and mutation settings shared by both step models
#[derive(Clone, Debug)]
pub struct Variation {
    /// Parent selection
    pub selection: TournamentSelection,
    /// Subtree crossover
    pub crossover: SubtreeCrossover,
    /// Subtree replacement mutation
    pub subtree_mutation: SubtreeMutation,
    /// Operator / terminal substitution
    pub point_mutation: PointMutation,
    /// Probability of crossover per offspring
    pub crossover_probability: f64,
    /// Probability of subtree mutation per offspring
    pub mutation_probability: f64,
    /// Probability of point mutation per offspring
    pub point_mutation_probability: f64,
}

impl Variation {
    /// Build the operators described by a validated configuration
    pub fn from_config(config: &GpConfig, symbols: Arc<SymbolTable>) -> Self {
        Self {
            selection: TournamentSelection::new(config.effective_tournament_size()),
            crossover: SubtreeCrossover::new(config.internal_bias),
            subtree_mutation: SubtreeMutation::new(Arc::clone(&symbols)),
            point_mutation: PointMutation::new(symbols),
            crossover_probability: config.crossover_probability,
            mutation_probability: config.mutation_probability,
            point_mutation_probability: config.point_mutation_probability,
        }
    }

    /// Tournament-select two parent indices
    pub fn select_parents<R: Rng>(
        &self,
        individuals: &[ExpressionTree],
        rng: &mut R,
    ) -> (usize, usize) {
        let first = self.selection.select(individuals, rng);
        let second = self.selection.select(individuals, rng);
        (first, second)
    }

    /// Cross two parents, copying the first one if crossover cannot act
    pub fn recombine<R: Rng>(
        &self,
        parent1: &ExpressionTree,
        parent2: &ExpressionTree,
        rng: &mut R,
    ) -> ExpressionTree {
        match self.crossover.crossover(parent1, parent2, rng) {
            OperatorResult::Success(child) => child,
            OperatorResult::Fallback(child, info) => {
                trace!("crossover fell back to {}: {}", info.method, info.reason);
                child
            }
            OperatorResult::Failed(err) => {
                trace!("{}; copying first parent", err);
                parent1.clone()
            }
        }
    }

    /// Apply subtree and point mutation with their probabilities
    ///
    /// Returns the number of mutations that changed the tree.
    pub fn mutate<R: Rng>(&self, tree: &mut ExpressionTree, rng: &mut R) -> usize {
        let mut applied = 0;

        if rng.gen::<f64>() < self.mutation_probability {
            if self.subtree_mutation.mutate(tree, rng).is_applied() {
                applied += 1;
            } else {
                trace!("subtree mutation not applicable to {}", tree);
            }
        }

        if rng.gen::<f64>() < self.point_mutation_probability {
            if self.point_mutation.mutate(tree, rng).is_applied() {
                applied += 1;
            } else {
                trace!("point mutation not applicable to {}", tree);
            }
        }

        applied
    }

    /// Produce one offspring from `individuals`
    ///
    /// Two parents are tournament-selected. The child is their crossover with
    /// probability `crossover_probability` and a copy of the first parent
    /// otherwise, then goes through [`Variation::mutate`].
    pub fn breed<R: Rng>(&self, individuals: &[ExpressionTree], rng: &mut R) -> ExpressionTree {
        let (first, second) = self.select_parents(individuals, rng);
        let mut child = if rng.gen::<f64>() < self.crossover_probability {
            self.recombine(&individuals[first], &individuals[second], rng)
        } else {
            individuals[first].clone()
        };
        self.mutate(&mut child, rng);
        debug_assert!(child.check_invariants().is_ok());
        child
    }
}

pub mod prelude {
    pub use super::generational::*;
    pub use super::steady_state::*;
    pub use super::symbolic_regression::*;
    pub use super::{GenerationStep, ReplacementStrategy, StepReport, Variation};
}
