//! Diagnostics and statistics
//!
//! This module provides the per-generation fitness trace of a run. Fitness is
//! an error measure, so the best value of a generation is its minimum.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::genome::tree::ExpressionTree;
use crate::population::population::Population;

/// Statistics for a single generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Best (lowest) fitness in this generation
    pub best_fitness: f64,
    /// Worst (highest) fitness in this generation, possibly infinite
    pub worst_fitness: f64,
    /// Mean of the finite fitness values
    pub mean_fitness: f64,
    /// Median of the finite fitness values
    pub median_fitness: f64,
    /// Standard deviation of the finite fitness values
    pub fitness_std: f64,
    /// Trees whose fitness is infinite
    pub failed: usize,
    /// Mean node count
    pub mean_size: f64,
    /// Population diversity
    pub diversity: f64,
    /// Timing information
    pub timing: TimingStats,
}

/// Timing statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    /// Time spent on fitness evaluation (ms)
    pub evaluation_ms: f64,
    /// Time spent on selection, crossover and mutation (ms)
    pub breeding_ms: f64,
    /// Total generation time (ms)
    pub total_ms: f64,
}

impl TimingStats {
    /// Create new timing stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Set evaluation time
    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set breeding time
    pub fn with_breeding(mut self, duration: Duration) -> Self {
        self.breeding_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set total time
    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = duration.as_secs_f64() * 1000.0;
        self
    }
}

impl GenerationStats {
    /// Compute statistics from a population
    pub fn from_population(population: &Population, generation: usize, evaluations: usize) -> Self {
        let values = population.fitness_values();
        let failed = values.iter().filter(|f| !f.is_finite()).count();
        let mut finite: Vec<f64> = values.iter().copied().filter(|f| f.is_finite()).collect();
        finite.sort_by(f64::total_cmp);

        let best = values.iter().copied().fold(f64::INFINITY, f64::min);
        let worst = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let (mean, median, std) = if finite.is_empty() {
            (f64::INFINITY, f64::INFINITY, 0.0)
        } else {
            let n = finite.len();
            let mean = finite.iter().sum::<f64>() / n as f64;
            let median = if n % 2 == 0 {
                (finite[n / 2 - 1] + finite[n / 2]) / 2.0
            } else {
                finite[n / 2]
            };
            let variance = if n > 1 {
                finite.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / (n - 1) as f64
            } else {
                0.0
            };
            (mean, median, variance.sqrt())
        };

        let mean_size = if population.is_empty() {
            0.0
        } else {
            population.iter().map(ExpressionTree::size).sum::<usize>() as f64
                / population.len() as f64
        };

        Self {
            generation,
            evaluations,
            best_fitness: best,
            worst_fitness: worst,
            mean_fitness: mean,
            median_fitness: median,
            fitness_std: std,
            failed,
            mean_size,
            diversity: population.diversity(),
            timing: TimingStats::default(),
        }
    }

    /// Set timing information
    pub fn with_timing(mut self, timing: TimingStats) -> Self {
        self.timing = timing;
        self
    }
}

/// Statistics collector for an entire evolution run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Statistics per generation
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
    /// Reason for termination
    pub termination_reason: Option<String>,
}

impl EvolutionStats {
    /// Create a new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Get the best fitness across all generations
    pub fn best_fitness(&self) -> Option<f64> {
        self.generations
            .iter()
            .map(|g| g.best_fitness)
            .min_by(f64::total_cmp)
    }

    /// Get the final best fitness
    pub fn final_best_fitness(&self) -> Option<f64> {
        self.generations.last().map(|g| g.best_fitness)
    }

    /// Get the history of best fitness values
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best_fitness).collect()
    }

    /// Get the history of mean fitness values
    pub fn mean_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.mean_fitness).collect()
    }

    /// Get the history of worst fitness values
    pub fn worst_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.worst_fitness).collect()
    }

    /// Get the history of diversity values
    pub fn diversity_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.diversity).collect()
    }

    /// Set the termination reason
    pub fn set_termination_reason(&mut self, reason: &str) {
        self.termination_reason = Some(reason.to_string());
    }

    /// Set the total runtime
    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = duration.as_secs_f64() * 1000.0;
    }

    /// Get a summary of the evolution run
    pub fn summary(&self) -> String {
        let best = self.best_fitness().unwrap_or(f64::INFINITY);
        let final_best = self.final_best_fitness().unwrap_or(f64::INFINITY);
        let generations = self.num_generations();
        let runtime = self.total_runtime_ms;

        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Best fitness: {:.6}\n\
             - Final best: {:.6}\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            generations,
            best,
            final_best,
            runtime,
            self.termination_reason.as_deref().unwrap_or("unknown")
        )
    }
}

/// Result of an evolution run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// The best tree found
    pub best: ExpressionTree,
    /// Its fitness
    pub best_fitness: f64,
    /// Number of generation steps completed
    pub generations: usize,
    /// Total fitness evaluations
    pub evaluations: usize,
    /// Whether the target fitness was reached
    pub reached_target: bool,
    /// Statistics for the run
    pub stats: EvolutionStats,
}

impl EvolutionResult {
    /// Best fitness per recorded generation
    pub fn fitness_history(&self) -> Vec<f64> {
        self.stats.best_fitness_history()
    }
}

pub mod prelude {
    pub use super::{EvolutionResult, EvolutionStats, GenerationStats, TimingStats};
}
