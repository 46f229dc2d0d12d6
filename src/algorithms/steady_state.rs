//! Steady-state replacement
//!
//! A step makes `population_size` insertion attempts. Each attempt crosses
//! two tournament-selected parents with probability `crossover_probability`;
//! the offspring replaces the current worst tree only if it is strictly
//! better. An inserted offspring may then be mutated and is re-evaluated.

use rand::Rng;

use crate::algorithms::{GenerationStep, StepReport, Variation};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::Fitness;
use crate::population::population::Population;

/// Worst-replacement steady-state step
#[derive(Clone, Debug)]
pub struct SteadyStateStep {
    variation: Variation,
}

impl SteadyStateStep {
    /// Create a steady-state step
    pub fn new(variation: Variation) -> Self {
        Self { variation }
    }

    /// The variation operators in use
    pub fn variation(&self) -> &Variation {
        &self.variation
    }
}

impl GenerationStep for SteadyStateStep {
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

        let mut report = StepReport {
            evaluations: population.evaluate(fitness),
            ..StepReport::default()
        };

        for _ in 0..population.len() {
            if rng.gen::<f64>() >= self.variation.crossover_probability {
                continue;
            }

            let (first, second) = self.variation.select_parents(population.individuals(), rng);
            let mut child = self
                .variation
                .recombine(&population[first], &population[second], rng);
            let child_fitness = child.fitness(fitness);
            report.offspring += 1;
            report.evaluations += 1;

            let Some(worst) = population.worst_index() else {
                break;
            };
            let worst_fitness = population[worst]
                .cached_fitness()
                .unwrap_or(f64::INFINITY);
            if child_fitness >= worst_fitness {
                continue;
            }

            if self.variation.mutate(&mut child, rng) > 0 {
                child.fitness(fitness);
                report.evaluations += 1;
            }
            debug_assert!(child.check_invariants().is_ok());
            population.replace(worst, child);
            report.replaced += 1;
        }

        population.increment_generation();
        Ok(report)
    }
}
