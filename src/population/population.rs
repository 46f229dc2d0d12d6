//! Population type
//!
//! This module provides the Population container type. Fitness is an error
//! measure, so "best" means lowest. Trees whose fitness has not been computed
//! rank as `f64::INFINITY`.

use std::cmp::Ordering;

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fitness::traits::Fitness;
use crate::genome::tree::{ExpressionTree, GenerationMethod};
use crate::symbols::table::SymbolTable;

/// A population of expression trees
#[derive(Clone, Debug, Default)]
pub struct Population {
    /// The individuals in this population
    individuals: Vec<ExpressionTree>,
    /// Current generation number
    generation: usize,
}

fn rank_key(tree: &ExpressionTree) -> f64 {
    tree.cached_fitness().unwrap_or(f64::INFINITY)
}

fn by_fitness(a: &ExpressionTree, b: &ExpressionTree) -> Ordering {
    rank_key(a).total_cmp(&rank_key(b))
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self {
            individuals: Vec::new(),
            generation: 0,
        }
    }


    /// Create a population from a vector of trees
    pub fn from_individuals(individuals: Vec<ExpressionTree>) -> Self {
        Self {
            individuals,
            generation: 0,
        }
    }

    /// Create a random population
    ///
    /// The first `floor(size * full_ratio)` trees use the "full" method and
    /// the rest use "grow".
    pub fn initialize<R: Rng>(
        size: usize,
        max_depth: usize,
        symbols: &SymbolTable,
        full_ratio: f64,
        rng: &mut R,
    ) -> Self {
        let full = ((size as f64 * full_ratio) as usize).min(size);
        let individuals = (0..size)
            .map(|i| {
                let method = if i < full {
                    GenerationMethod::Full
                } else {
                    GenerationMethod::Grow
                };
                ExpressionTree::generate(method, symbols, max_depth, rng)
            })
            .collect();
        Self::from_individuals(individuals)
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Increment the generation counter
    pub fn increment_generation(&mut self) {
        self.generation += 1;
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get a tree by index
    pub fn get(&self, index: usize) -> Option<&ExpressionTree> {
        self.individuals.get(index)
    }

    /// Add a tree to the population
    pub fn push(&mut self, tree: ExpressionTree) {
        self.individuals.push(tree);
    }

    /// Get an iterator over the trees
    pub fn iter(&self) -> impl Iterator<Item = &ExpressionTree> {
        self.individuals.iter()
    }

    /// Get the underlying slice of trees
    pub fn individuals(&self) -> &[ExpressionTree] {
        &self.individuals
    }

    /// Swap in a new generation of trees, keeping the generation counter
    pub fn replace_individuals(&mut self, individuals: Vec<ExpressionTree>) {
        self.individuals = individuals;
    }

    /// Replace one tree, returning the old one
    pub fn replace(&mut self, index: usize, tree: ExpressionTree) -> ExpressionTree {
        std::mem::replace(&mut self.individuals[index], tree)
    }

    /// Take the trees out of this population
    pub fn into_individuals(self) -> Vec<ExpressionTree> {
        self.individuals
    }

    /// Index of the best (lowest fitness) tree; the first one on ties
    pub fn best_index(&self) -> Option<usize> {
        self.individuals
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| by_fitness(a, b))
            .map(|(i, _)| i)
    }

    /// Index of the worst (highest fitness) tree
    pub fn worst_index(&self) -> Option<usize> {
        self.individuals
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| by_fitness(a, b))
            .map(|(i, _)| i)
    }

    /// Get the best tree (by fitness)
    pub fn best(&self) -> Option<&ExpressionTree> {
        self.best_index().map(|i| &self.individuals[i])
    }

    /// Get the worst tree (by fitness)
    pub fn worst(&self) -> Option<&ExpressionTree> {
        self.worst_index().map(|i| &self.individuals[i])
    }

    /// Sort the population by fitness (best first, stable)
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(by_fitness);
    }

    /// Copies of the `count` best trees, best first
    pub fn elites(&self, count: usize) -> Vec<ExpressionTree> {
        let mut order: Vec<usize> = (0..self.individuals.len()).collect();
        order.sort_by(|&a, &b| by_fitness(&self.individuals[a], &self.individuals[b]));
        order
            .into_iter()
            .take(count)
            .map(|i| self.individuals[i].clone())
            .collect()
    }

    /// Check if all trees have a memoized fitness
    pub fn all_evaluated(&self) -> bool {
        self.individuals
            .iter()
            .all(|t| t.cached_fitness().is_some())
    }

    /// Count the trees with a memoized fitness
    pub fn count_evaluated(&self) -> usize {
        self.individuals
            .iter()
            .filter(|t| t.cached_fitness().is_some())
            .count()
    }

    /// Evaluate every tree lacking a memoized fitness (sequential)
    ///
    /// Returns the number of trees evaluated.
    pub fn evaluate<Fit>(&mut self, fitness: &Fit) -> usize
    where
        Fit: Fitness + ?Sized,
    {
        let mut evaluated = 0;
        for tree in &mut self.individuals {
            if tree.cached_fitness().is_none() {
                tree.fitness(fitness);
                evaluated += 1;
            }
        }
        evaluated
    }

    /// Fitness values of the evaluated trees
    pub fn fitness_values(&self) -> Vec<f64> {
        self.individuals
            .iter()
            .filter_map(|t| t.cached_fitness())
            .collect()
    }

    /// Compute mean fitness over finite values
    pub fn mean_fitness(&self) -> Option<f64> {
        let finite: Vec<f64> = self
            .fitness_values()
            .into_iter()
            .filter(|f| f.is_finite())
            .collect();

        if finite.is_empty() {
            None
        } else {
            Some(finite.iter().sum::<f64>() / finite.len() as f64)
        }
    }

    /// Compute fitness standard deviation over finite values
    pub fn fitness_std(&self) -> Option<f64> {
        let mean = self.mean_fitness()?;
        let finite: Vec<f64> = self
            .fitness_values()
            .into_iter()
            .filter(|f| f.is_finite())
            .collect();

        if finite.len() < 2 {
            return None;
        }

        let variance =
            finite.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / (finite.len() - 1) as f64;
        Some(variance.sqrt())
    }

    /// Compute population diversity (average pairwise distance)
    ///
    /// Matches [`ExpressionTree::distance`] averaged over all pairs. Sizes
    /// and depths are measured once per tree.
    pub fn diversity(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }

        let shapes: Vec<(f64, f64)> = self
            .individuals
            .iter()
            .map(|t| (t.size() as f64, t.depth() as f64))
            .collect();

        let mut total_distance = 0.0;
        let mut count = 0;

        for (i, (size_a, depth_a)) in shapes.iter().enumerate() {
            for (size_b, depth_b) in &shapes[i + 1..] {
                total_distance += (size_a - size_b).abs() + (depth_a - depth_b).abs();
                count += 1;
            }
        }

        total_distance / count as f64
    }
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl Population {
    /// Evaluate every tree lacking a memoized fitness (parallel)
    ///
    /// Returns once every tree has been evaluated. Returns the number of trees
    /// evaluated.
    pub fn evaluate_parallel<Fit>(&mut self, fitness: &Fit) -> usize
    where
        Fit: Fitness + ?Sized,
    {
        self.individuals
            .par_iter_mut()
            .filter(|t| t.cached_fitness().is_none())
            .map(|tree| {
                tree.fitness(fitness);
                1
            })
            .sum()
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl Population {
    /// Evaluate every tree lacking a memoized fitness (sequential fallback)
    ///
    /// Note: This is a sequential implementation used when the `parallel` feature is disabled.
    pub fn evaluate_parallel<Fit>(&mut self, fitness: &Fit) -> usize
    where
        Fit: Fitness + ?Sized,
    {
        self.evaluate(fitness)
    }
}

impl std::ops::Index<usize> for Population {
    type Output = ExpressionTree;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl std::ops::IndexMut<usize> for Population {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.individuals[index]
    }
}

impl IntoIterator for Population {
    type Item = ExpressionTree;
    type IntoIter = std::vec::IntoIter<ExpressionTree>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

impl FromIterator<ExpressionTree> for Population {
    fn from_iter<I: IntoIterator<Item = ExpressionTree>>(iter: I) -> Self {
        Self::from_individuals(iter.into_iter().collect())
    }
}
