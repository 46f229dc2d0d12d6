//! Generational replacement with elitism
//!
//! Each step breeds `population_size - elitism` offspring from the current
//! population, appends copies of the `elitism` best current trees, and swaps
//! the new buffer in wholesale. Elites keep their memoized fitness, so the
//! best fitness never gets worse from one generation to the next.

use rand::Rng;

use crate::algorithms::{GenerationStep, StepReport, Variation};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::Fitness;
use crate::population::population::Population;

/// Elitist generational step
#[derive(Clone, Debug)]
pub struct GenerationalStep {
    variation: Variation,
    elitism: usize,
}

impl GenerationalStep {
    /// Create a step carrying `elitism` best trees into each generation
    pub fn new(variation: Variation, elitism: usize) -> Self {
        Self { variation, elitism }
    }

    /// Number of elites carried over
    pub fn elitism(&self) -> usize {
        self.elitism
    }

    /// The variation operators in use
    pub fn variation(&self) -> &Variation {
        &self.variation
    }
}

impl GenerationStep for GenerationalStep {
    fn step<Fit, R>(
        &self,
        population: &mut Population,
        fitness: &Fit,
        rng: &mut R,
    ) -> EvoResult<StepReport>
    where
        Fit: Fitness + ?Sized,
        R: Rng,
    {
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        // Selection must see every fitness
        let evaluations = population.evaluate(fitness);

        let size = population.len();
        let elitism = self.elitism.min(size);
        let offspring_count = size - elitism;

        let mut next = Vec::with_capacity(size);
        while next.len() < offspring_count {
            next.push(self.variation.breed(population.individuals(), rng));
        }
        next.extend(population.elites(elitism));

        population.replace_individuals(next);
        population.increment_generation();

        Ok(StepReport {
            offspring: offspring_count,
            replaced: offspring_count,
            evaluations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GpConfig;
    use crate::fitness::mse::MeanSquaredError;
    use crate::fitness::points::PointSet;
    use crate::symbols::table::SymbolTable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn setup(size: usize, elitism: usize) -> (GenerationalStep, Population, Arc<SymbolTable>) {
        let config = GpConfig::default()
            .with_population_size(size)
            .with_elitism(elitism);
        let symbols = Arc::new(config.symbols.compile().unwrap());
        let mut rng = StdRng::seed_from_u64(11);
        let population = Population::initialize(size, config.max_depth, &symbols, 0.5, &mut rng);
        let step = GenerationalStep::new(Variation::from_config(&config, Arc::clone(&symbols)), elitism);
        (step, population, symbols)
    }

    fn quadratic() -> MeanSquaredError {
        MeanSquaredError::new(PointSet::linspace("x", -5.0, 5.0, 20, |x| x * x + 2.0 * x))
    }

    #[test]
    fn test_step_keeps_size_and_counts_generation() {
        let (step, mut population, _) = setup(30, 2);
        let fitness = quadratic();
        let mut rng = StdRng::seed_from_u64(5);

        let report = step.step(&mut population, &fitness, &mut rng).unwrap();

        assert_eq!(population.len(), 30);
        assert_eq!(population.generation(), 1);
        assert_eq!(report.offspring, 28);
        assert_eq!(report.replaced, 28);
        assert_eq!(report.evaluations, 30);
    }

    #[test]
    fn test_elites_survive_unchanged() {
        let (step, mut population, _) = setup(20, 3);
        let fitness = quadratic();
        let mut rng = StdRng::seed_from_u64(6);

        population.evaluate(&fitness);
        let elites = population.elites(3);

        step.step(&mut population, &fitness, &mut rng).unwrap();

        // Elites are appended after the offspring, best first
        let tail = &population.individuals()[17..];
        assert_eq!(tail, elites.as_slice());
        for (kept, original) in tail.iter().zip(&elites) {
            assert_eq!(kept.cached_fitness(), original.cached_fitness());
        }
    }

    #[test]
    fn test_best_never_regresses() {
        let (step, mut population, _) = setup(40, 1);
        let fitness = quadratic();
        let mut rng = StdRng::seed_from_u64(7);

        population.evaluate(&fitness);
        let mut previous = population.best().and_then(|t| t.cached_fitness()).unwrap();

        for _ in 0..15 {
            step.step(&mut population, &fitness, &mut rng).unwrap();
            population.evaluate(&fitness);
            let best = population.best().and_then(|t| t.cached_fitness()).unwrap();
            assert!(best <= previous, "best went from {} to {}", previous, best);
            previous = best;
        }
    }

    #[test]
    fn test_offspring_respect_invariants() {
        let (step, mut population, _) = setup(25, 1);
        let fitness = quadratic();
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..5 {
            step.step(&mut population, &fitness, &mut rng).unwrap();
            for tree in population.iter() {
                assert!(tree.check_invariants().is_ok());
                assert!(tree.depth() <= 4);
            }
        }
    }

    #[test]
    fn test_empty_population_is_an_error() {
        let (step, _, _) = setup(5, 1);
        let mut population = Population::new();
        let mut rng = StdRng::seed_from_u64(9);
        let result = step.step(&mut population, &quadratic(), &mut rng);
        assert!(matches!(result, Err(EvolutionError::EmptyPopulation)));
    }
}
