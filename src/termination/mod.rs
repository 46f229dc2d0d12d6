//! Termination criteria
//!
//! This module provides the stopping rules of a GP run: reaching a target
//! error, or exhausting the generation budget.

/// Evolution state for termination checking
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvolutionState {
    /// Current generation number
    pub generation: usize,
    /// Best (lowest) fitness found so far
    pub best_fitness: f64,
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

/// Terminate once the generation counter reaches a cap
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate when the best error is at or below a target
#[derive(Clone, Debug)]
pub struct TargetFitness {
    /// Target fitness value
    pub target: f64,
}

impl TargetFitness {
    /// Create a new target fitness criterion
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl TerminationCriterion for TargetFitness {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.best_fitness <= self.target
    }

    fn reason(&self) -> &'static str {
        "Target fitness reached"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }

    /// Reason of the first criterion that fires, in insertion order
    pub fn triggered(&self, state: &EvolutionState) -> Option<&'static str> {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map(|c| c.reason())
    }
}

pub mod prelude {
    pub use super::{AnyOf, EvolutionState, MaxGenerations, TargetFitness, TerminationCriterion};
}
