//! Symbolic regression driver
//!
//! This module runs a GP population from random initialisation to
//! termination. Each iteration evaluates the population, records a
//! [`GenerationStats`] entry, checks the stopping rules (target fitness
//! reached, or generation cap hit) and otherwise applies one generation step.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithms::generational::GenerationalStep;
use crate::algorithms::steady_state::SteadyStateStep;
use crate::algorithms::{GenerationStep, ReplacementStrategy, Variation};
use crate::config::GpConfig;
use crate::diagnostics::{EvolutionResult, EvolutionStats, GenerationStats, TimingStats};
use crate::error::{ConfigError, EvoResult, EvolutionError};
use crate::fitness::mse::MeanSquaredError;
use crate::fitness::points::PointSet;
use crate::fitness::traits::Fitness;
use crate::genome::tree::ExpressionTree;
use crate::population::population::Population;
use crate::symbols::table::SymbolTable;
use crate::termination::{AnyOf, EvolutionState, MaxGenerations, TargetFitness};

/// Builder for [`SymbolicRegression`]
#[derive(Clone, Debug, Default)]
pub struct SymbolicRegressionBuilder {
    config: GpConfig,
    points: Option<PointSet>,
}

impl SymbolicRegressionBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: GpConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the sample points to fit
    pub fn points(mut self, points: PointSet) -> Self {
        self.points = Some(points);
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the depth bound
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the generation cap
    pub fn generation_cap(mut self, cap: usize) -> Self {
        self.config.generation_cap = cap;
        self
    }

    /// Set the target fitness
    pub fn target_fitness(mut self, target: f64) -> Self {
        self.config.target_fitness = target;
        self
    }

    /// Set the number of elites
    pub fn elitism(mut self, count: usize) -> Self {
        self.config.elitism_count = count;
        self
    }

    /// Set the generation step model
    pub fn replacement(mut self, replacement: ReplacementStrategy) -> Self {
        self.config.replacement = replacement;
        self
    }

    /// Enable or disable parallel evaluation
    pub fn parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config.parallel_evaluation = enabled;
        self
    }

    /// Validate the configuration and points, then build the driver
    pub fn build(self) -> EvoResult<SymbolicRegression<MeanSquaredError>> {
        let points = self.points.ok_or(ConfigError::EmptyPointSet)?;
        points.validate()?;
        let fitness = MeanSquaredError::new(points).with_penalty(self.config.penalty);
        SymbolicRegression::with_fitness(self.config, fitness)
    }
}

/// Symbolic regression by genetic programming
///
/// Generic over the fitness measure; [`SymbolicRegression::builder`] builds
/// the usual mean-squared-error variant.
pub struct SymbolicRegression<Fit> {
    config: GpConfig,
    symbols: Arc<SymbolTable>,
    fitness: Fit,
}

impl SymbolicRegression<MeanSquaredError> {
    /// Create a builder for the mean-squared-error driver
    pub fn builder() -> SymbolicRegressionBuilder {
        SymbolicRegressionBuilder::new()
    }
}

impl<Fit: Fitness> SymbolicRegression<Fit> {
    /// Create a driver minimising an arbitrary fitness measure
    pub fn with_fitness(config: GpConfig, fitness: Fit) -> EvoResult<Self> {
        config.validate()?;
        let symbols = Arc::new(config.symbols.compile()?);
        Ok(Self {
            config,
            symbols,
            fitness,
        })
    }

    /// The validated configuration
    pub fn config(&self) -> &GpConfig {
        &self.config
    }

    /// The compiled symbol table
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The fitness measure
    pub fn fitness(&self) -> &Fit {
        &self.fitness
    }

    /// Run with the configured generation step model
    pub fn run<R: Rng>(&self, rng: &mut R) -> EvoResult<EvolutionResult> {
        let variation = Variation::from_config(&self.config, Arc::clone(&self.symbols));
        match self.config.replacement {
            ReplacementStrategy::Generational => {
                let step = GenerationalStep::new(variation, self.config.elitism_count);
                self.run_with(&step, rng)
            }
            ReplacementStrategy::SteadyState => self.run_with(&SteadyStateStep::new(variation), rng),
        }
    }

    /// Run with an explicit generation step
    pub fn run_with<S, R>(&self, step: &S, rng: &mut R) -> EvoResult<EvolutionResult>
    where
        S: GenerationStep,
        R: Rng,
    {
        let start_time = Instant::now();
        info!(
            "Starting symbolic regression: population {}, max depth {}, generation cap {}, target {}",
            self.config.population_size,
            self.config.max_depth,
            self.config.generation_cap,
            self.config.target_fitness
        );

        let mut population = Population::initialize(
            self.config.population_size,
            self.config.max_depth,
            &self.symbols,
            self.config.full_ratio,
            rng,
        );
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let termination = AnyOf::new(vec![
            Box::new(TargetFitness::new(self.config.target_fitness)),
            Box::new(MaxGenerations::new(self.config.generation_cap)),
        ]);

        let mut stats = EvolutionStats::new();
        let mut evaluations = 0;
        let mut best: Option<ExpressionTree> = None;
        let mut breeding_time = Duration::ZERO;
        let mut gen_start = Instant::now();

        let reason = loop {
            // Evaluate
            let eval_start = Instant::now();
            evaluations += self.evaluate(&mut population);
            let eval_time = eval_start.elapsed();

            // Track the best tree seen so far
            if let Some(current) = population.best() {
                let improved = match &best {
                    Some(b) => fitness_of(current) < fitness_of(b),
                    None => true,
                };
                if improved {
                    best = Some(current.clone());
                }
            }
            let best_fitness = best.as_ref().map_or(f64::INFINITY, fitness_of);

            // Record statistics
            let timing = TimingStats::new()
                .with_evaluation(eval_time)
                .with_breeding(breeding_time)
                .with_total(gen_start.elapsed());
            let gen_stats =
                GenerationStats::from_population(&population, population.generation(), evaluations)
                    .with_timing(timing);
            debug!(
                "Generation {}: best {:.6}, mean {:.6}, worst {:.6}, failed {}",
                gen_stats.generation,
                gen_stats.best_fitness,
                gen_stats.mean_fitness,
                gen_stats.worst_fitness,
                gen_stats.failed
            );
            stats.record(gen_stats);

            // Check termination
            let state = EvolutionState {
                generation: population.generation(),
                best_fitness,
            };
            if let Some(reason) = termination.triggered(&state) {
                break reason;
            }

            // Evolve
            gen_start = Instant::now();
            let report = step.step(&mut population, &self.fitness, rng)?;
            evaluations += report.evaluations;
            breeding_time = gen_start.elapsed();
        };

        let best = best.ok_or(EvolutionError::EmptyPopulation)?;
        let best_fitness = fitness_of(&best);

        stats.set_termination_reason(reason);
        stats.set_runtime(start_time.elapsed());
        info!(
            "{} after {} generations: best fitness {:.6}, {}",
            reason,
            population.generation(),
            best_fitness,
            best
        );

        Ok(EvolutionResult {
            best,
            best_fitness,
            generations: population.generation(),
            evaluations,
            reached_target: best_fitness <= self.config.target_fitness,
            stats,
        })
    }

    fn evaluate(&self, population: &mut Population) -> usize {
        if self.config.parallel_evaluation {
            population.evaluate_parallel(&self.fitness)
        } else {
            population.evaluate(&self.fitness)
        }
    }
}

fn fitness_of(tree: &ExpressionTree) -> f64 {
    tree.cached_fitness().unwrap_or(f64::INFINITY)
}

/// Fit `points` with the settings in `config`
///
/// The random generator is seeded from `config.seed`, or from system entropy
/// when no seed is given. Returns a configuration error before any evolution
/// takes place if `config` or `points` is invalid.
pub fn evolve(config: &GpConfig, points: &PointSet) -> EvoResult<EvolutionResult> {
    let driver = SymbolicRegression::builder()
        .config(config.clone())
        .points(points.clone())
        .build()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    driver.run(&mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::FnFitness;

    fn linear_points() -> PointSet {
        PointSet::linspace("x", -2.0, 2.0, 9, |x| 2.0 * x)
    }

    fn small_config() -> GpConfig {
        GpConfig::default()
            .with_population_size(30)
            .with_max_depth(3)
            .with_generation_cap(10)
            .with_target_fitness(0.0)
            .with_seed(3)
    }

    #[test]
    fn test_builder_requires_points() {
        let result = SymbolicRegression::builder().build();
        assert!(matches!(
            result,
            Err(EvolutionError::Configuration(ConfigError::EmptyPointSet))
        ));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = SymbolicRegression::builder()
            .points(linear_points())
            .population_size(0)
            .build();
        assert!(matches!(
            result,
            Err(EvolutionError::Configuration(ConfigError::InvalidPopulationSize))
        ));
    }

    #[test]
    fn test_run_stops_at_generation_cap() {
        let driver = SymbolicRegression::builder()
            .config(small_config().with_target_fitness(-1.0))
            .points(linear_points())
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let result = driver.run(&mut rng).unwrap();

        assert_eq!(result.generations, 10);
        assert!(!result.reached_target);
        // Initial population plus one entry per step
        assert_eq!(result.stats.num_generations(), 11);
        assert_eq!(
            result.stats.termination_reason.as_deref(),
            Some("Maximum generations reached")
        );
        assert_eq!(result.best_fitness, result.best.cached_fitness().unwrap());
    }

    #[test]
    fn test_run_stops_at_target() {
        // Every tree meets an infinite target immediately
        let driver = SymbolicRegression::builder()
            .config(small_config().with_target_fitness(f64::INFINITY))
            .points(linear_points())
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let result = driver.run(&mut rng).unwrap();

        assert_eq!(result.generations, 0);
        assert!(result.reached_target);
        assert_eq!(result.evaluations, 30);
        assert_eq!(
            result.stats.termination_reason.as_deref(),
            Some("Target fitness reached")
        );
    }

    #[test]
    fn test_best_fitness_history_non_increasing() {
        let driver = SymbolicRegression::builder()
            .config(small_config().with_generation_cap(15))
            .points(linear_points())
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let history = driver.run(&mut rng).unwrap().fitness_history();

        for pair in history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn test_steady_state_run() {
        let config = small_config().with_replacement(ReplacementStrategy::SteadyState);
        let result = evolve(&config, &linear_points()).unwrap();

        assert!(result.generations <= 10);
        assert!(result.best.check_invariants().is_ok());
        assert!(result.best_fitness.is_finite());
    }

    #[test]
    fn test_custom_fitness() {
        // Prefer small trees
        let fitness = FnFitness::new(|tree: &ExpressionTree| tree.size() as f64);
        let driver =
            SymbolicRegression::with_fitness(small_config().with_target_fitness(1.0), fitness)
                .unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let result = driver.run(&mut rng).unwrap();

        assert!(result.best_fitness >= 1.0);
        assert_eq!(result.best_fitness, result.best.size() as f64);
    }

    #[test]
    fn test_evolve_is_reproducible() {
        let config = small_config();
        let a = evolve(&config, &linear_points()).unwrap();
        let b = evolve(&config, &linear_points()).unwrap();

        assert_eq!(a.best, b.best);
        assert_eq!(a.best_fitness, b.best_fitness);
        assert_eq!(a.fitness_history(), b.fitness_history());
    }
}
