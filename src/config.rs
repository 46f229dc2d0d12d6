//! Run configuration
//!
//! [`GpConfig`] bundles every tunable of a run. It deserialises with
//! defaults for missing fields, so a configuration file only has to name the
//! values it changes. [`GpConfig::validate`] must pass before evolution
//! starts.

use serde::{Deserialize, Serialize};

use crate::algorithms::ReplacementStrategy;
use crate::error::ConfigError;
use crate::fitness::mse::DEFAULT_PENALTY;
use crate::symbols::table::SymbolSet;

/// Configuration of a symbolic regression run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpConfig {
    /// Number of trees in the population
    pub population_size: usize,
    /// Depth bound of every tree (root = 0)
    pub max_depth: usize,
    /// Available operators and terminals
    pub symbols: SymbolSet,
    /// Probability an offspring is produced by crossover rather than copied
    pub crossover_probability: f64,
    /// Probability of subtree mutation per offspring
    pub mutation_probability: f64,
    /// Probability of point mutation per offspring
    pub point_mutation_probability: f64,
    /// Individuals drawn per tournament; clamped to the population size
    pub tournament_size: usize,
    /// Best individuals copied unchanged into the next generation
    pub elitism_count: usize,
    /// Generation steps before the run stops
    pub generation_cap: usize,
    /// The run stops once the best fitness is at or below this value
    pub target_fitness: f64,
    /// Seed for the random generator; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Share of the initial population built with the "full" method
    pub full_ratio: f64,
    /// Probability crossover picks an internal node over a leaf
    pub internal_bias: f64,
    /// Squared-error contribution of a point that fails to evaluate
    pub penalty: f64,
    /// Generation step model
    pub replacement: ReplacementStrategy,
    /// Evaluate fitness across threads (requires the `parallel` feature)
    pub parallel_evaluation: bool,
}

impl Default for GpConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_depth: 4,
            symbols: SymbolSet::default(),
            crossover_probability: 0.5,
            mutation_probability: 0.3,
            point_mutation_probability: 0.2,
            tournament_size: 10,
            elitism_count: 1,
            generation_cap: 100,
            target_fitness: 0.001,
            seed: None,
            full_ratio: 0.5,
            internal_bias: 0.9,
            penalty: DEFAULT_PENALTY,
            replacement: ReplacementStrategy::Generational,
            parallel_evaluation: true,
        }
    }
}

impl GpConfig {
    /// Set the population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the depth bound
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the symbol set
    pub fn with_symbols(mut self, symbols: SymbolSet) -> Self {
        self.symbols = symbols;
        self
    }

    /// Set the generation cap
    pub fn with_generation_cap(mut self, cap: usize) -> Self {
        self.generation_cap = cap;
        self
    }

    /// Set the target fitness
    pub fn with_target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = target;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the generation step model
    pub fn with_replacement(mut self, replacement: ReplacementStrategy) -> Self {
        self.replacement = replacement;
        self
    }

    /// Set the elitism count
    pub fn with_elitism(mut self, count: usize) -> Self {
        self.elitism_count = count;
        self
    }

    /// Set the tournament size
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Set the crossover, subtree mutation and point mutation probabilities
    pub fn with_probabilities(mut self, crossover: f64, mutation: f64, point_mutation: f64) -> Self {
        self.crossover_probability = crossover;
        self.mutation_probability = mutation;
        self.point_mutation_probability = point_mutation;
        self
    }

    /// Check every parameter, including the symbol set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::InvalidPopulationSize);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::InvalidTournamentSize);
        }
        if self.replacement == ReplacementStrategy::Generational
            && self.elitism_count >= self.population_size
        {
            return Err(ConfigError::ElitismTooLarge {
                elitism: self.elitism_count,
                population: self.population_size,
            });
        }

        for (name, value) in [
            ("crossover_probability", self.crossover_probability),
            ("mutation_probability", self.mutation_probability),
            ("point_mutation_probability", self.point_mutation_probability),
            ("full_ratio", self.full_ratio),
            ("internal_bias", self.internal_bias),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if !(self.penalty.is_finite() && self.penalty > 0.0) {
            return Err(ConfigError::InvalidPenalty(self.penalty));
        }
        if self.target_fitness.is_nan() {
            return Err(ConfigError::InvalidTargetFitness);
        }

        self.symbols.compile().map(|_| ())
    }

    /// Tournament size clamped to the population size
    pub fn effective_tournament_size(&self) -> usize {
        self.tournament_size.clamp(1, self.population_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::operator::BinaryOp;

    #[test]
    fn test_default_is_valid() {
        let config = GpConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.generation_cap, 100);
        assert_eq!(config.target_fitness, 0.001);
    }

    #[test]
    fn test_rejects_zero_population() {
        let config = GpConfig::default().with_population_size(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidPopulationSize));
    }

    #[test]
    fn test_rejects_zero_tournament() {
        let config = GpConfig::default().with_tournament_size(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTournamentSize));
    }

    #[test]
    fn test_rejects_elitism_filling_population() {
        let config = GpConfig::default()
            .with_population_size(10)
            .with_elitism(10);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ElitismTooLarge { .. })
        ));

        // Steady-state replacement ignores elitism
        let config = config.with_replacement(ReplacementStrategy::SteadyState);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_probability() {
        let config = GpConfig::default().with_probabilities(1.5, 0.3, 0.2);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                name: "crossover_probability",
                value: 1.5
            })
        );

        let config = GpConfig {
            full_ratio: -0.1,
            ..GpConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability { name: "full_ratio", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_penalty() {
        let config = GpConfig {
            penalty: f64::INFINITY,
            ..GpConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPenalty(_))));
    }

    #[test]
    fn test_rejects_nan_target() {
        let config = GpConfig::default().with_target_fitness(f64::NAN);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTargetFitness));

        // Infinite and negative targets stay legal
        assert!(GpConfig::default()
            .with_target_fitness(f64::INFINITY)
            .validate()
            .is_ok());
        assert!(GpConfig::default().with_target_fitness(-1.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_overflowing_constant_range() {
        let config = GpConfig::default()
            .with_symbols(SymbolSet::default().with_constant_range(-1e308, 1e308));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConstantRange { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_symbols() {
        let config = GpConfig::default().with_symbols(SymbolSet::new().with_variable("x", 1.0));
        assert_eq!(config.validate(), Err(ConfigError::EmptyOperatorSet));

        let config =
            GpConfig::default().with_symbols(SymbolSet::new().with_operator(BinaryOp::Add, 1.0));
        assert_eq!(config.validate(), Err(ConfigError::EmptyTerminalSet));
    }

    #[test]
    fn test_tournament_clamped() {
        let config = GpConfig::default()
            .with_population_size(4)
            .with_tournament_size(10);
        assert_eq!(config.effective_tournament_size(), 4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GpConfig =
            serde_json::from_str(r#"{ "population_size": 50, "seed": 7 }"#).unwrap();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.symbols, SymbolSet::default());
    }
}
