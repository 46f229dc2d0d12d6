//! Selection operators
//!
//! Fitness here is an error measure, so selection prefers the minimum.

use rand::Rng;

use crate::genome::tree::ExpressionTree;
use crate::operators::traits::SelectionOperator;

/// Tournament selection operator
///
/// Draws `tournament_size` individuals uniformly with replacement and
/// returns the one with the lowest fitness. Ties go to the earliest draw.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng>(&self, population: &[ExpressionTree], rng: &mut R) -> usize {
        assert!(!population.is_empty(), "Population cannot be empty");

        let fitness = |i: usize| population[i].cached_fitness().unwrap_or(f64::INFINITY);

        let mut best = rng.gen_range(0..population.len());
        for _ in 1..self.tournament_size {
            let challenger = rng.gen_range(0..population.len());
            if fitness(challenger) < fitness(best) {
                best = challenger;
            }
        }
        best
    }
}
