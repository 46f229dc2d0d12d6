//! Error types for symreg-gp
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error raised while evaluating an expression tree at one point
///
/// These never escape the fitness evaluator; each one is turned into a
/// penalty contribution for the offending point.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Logarithm of a non-positive argument
    #[error("Logarithm of non-positive value {0}")]
    LogDomain(f64),

    /// Power with an invalid base/exponent combination
    #[error("Invalid power: {base} ^ {exponent}")]
    PowDomain { base: f64, exponent: f64 },

    /// An operator produced NaN or an infinity
    #[error("Non-finite result from {symbol}")]
    NonFinite { symbol: &'static str },

    /// A variable leaf had no value in the evaluation context
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),

    /// An operator received the wrong number of operands
    #[error("Operator {symbol} expects {expected} operands, got {actual}")]
    ArityMismatch {
        symbol: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Error type for invalid run parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// No operator has a positive selection weight
    #[error("Operator set is empty")]
    EmptyOperatorSet,

    /// No terminal has a positive selection weight
    #[error("Terminal set is empty")]
    EmptyTerminalSet,

    /// A selection weight is negative or not finite
    #[error("Invalid weight {weight} for symbol {symbol}")]
    InvalidWeight { symbol: String, weight: f64 },

    /// Population size must be positive
    #[error("Population size must be at least 1")]
    InvalidPopulationSize,

    /// Tournament size must be positive
    #[error("Tournament size must be at least 1")]
    InvalidTournamentSize,

    /// Elites must leave room for at least one offspring
    #[error("Elitism count {elitism} must be smaller than population size {population}")]
    ElitismTooLarge { elitism: usize, population: usize },

    /// A probability parameter lies outside [0, 1]
    #[error("Probability {name} = {value} is outside [0, 1]")]
    InvalidProbability { name: &'static str, value: f64 },

    /// Constant range is empty or not finite
    #[error("Invalid constant range [{min}, {max}]")]
    InvalidConstantRange { min: f64, max: f64 },

    /// The fitness penalty must be a finite positive number
    #[error("Invalid penalty {0}")]
    InvalidPenalty(f64),

    /// The target fitness is NaN, so no tree could ever reach it
    #[error("Target fitness must not be NaN")]
    InvalidTargetFitness,

    /// The point set contains no points
    #[error("Point set is empty")]
    EmptyPointSet,

    /// A point carries a non-finite input or target
    #[error("Point {index} is not finite")]
    NonFinitePoint { index: usize },
}

/// Structural defect in a tree
///
/// Correct operators never produce these; `check_invariants` exists so that
/// tests can prove it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvariantViolation {
    /// Internal node child count differs from its operator arity
    #[error("Node at {path:?}: operator {symbol} expects {expected} children, found {actual}")]
    ArityMismatch {
        path: Vec<usize>,
        symbol: String,
        expected: usize,
        actual: usize,
    },

    /// Cached depth differs from the node's actual distance to the root
    #[error("Node at {path:?}: cached depth {cached}, actual depth {actual}")]
    DepthMismatch {
        path: Vec<usize>,
        cached: usize,
        actual: usize,
    },

    /// Tree is deeper than its configured maximum
    #[error("Tree depth {depth} exceeds maximum {max_depth}")]
    DepthExceeded { depth: usize, max_depth: usize },
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// The operator has nothing to act on in this tree
    #[error("Operator not applicable: {0}")]
    NotApplicable(String),
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// Structural invariant violated
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

/// Details recorded when an operator fell back to a weaker variant
#[derive(Debug, Clone)]
pub struct FallbackInfo {
    /// Why the preferred variant could not be used
    pub reason: String,
    /// Name of the variant that was applied instead
    pub method: &'static str,
}

/// Result of an operator application
#[derive(Debug, Clone)]
pub enum OperatorResult<G> {
    /// Operation succeeded as requested
    Success(G),
    /// Operation succeeded through a fallback variant
    Fallback(G, FallbackInfo),
    /// Operation failed unrecoverably
    Failed(OperatorError),
}

impl<G> OperatorResult<G> {
    /// Returns the genome if successful or a fallback was used, None if failed
    pub fn genome(self) -> Option<G> {
        match self {
            Self::Success(g) | Self::Fallback(g, _) => Some(g),
            Self::Failed(_) => None,
        }
    }

    /// Returns true if the operation produced a genome
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Returns true if a fallback variant was used
    pub fn used_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_, _))
    }

    /// Maps the genome type
    pub fn map<U, F: FnOnce(G) -> U>(self, f: F) -> OperatorResult<U> {
        match self {
            Self::Success(g) => OperatorResult::Success(f(g)),
            Self::Fallback(g, info) => OperatorResult::Fallback(f(g), info),
            Self::Failed(e) => OperatorResult::Failed(e),
        }
    }
}

/// Outcome of an in-place mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The tree was changed
    Applied,
    /// The tree offers no eligible mutation site; it is unchanged
    NotApplicable,
}

impl MutationOutcome {
    /// Returns true if the tree was changed
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_error_display() {
        assert_eq!(EvaluationError::DivisionByZero.to_string(), "Division by zero");
        assert_eq!(
            EvaluationError::UnboundVariable("y".to_string()).to_string(),
            "Unbound variable: y"
        );
        assert_eq!(
            EvaluationError::LogDomain(-2.0).to_string(),
            "Logarithm of non-positive value -2"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ElitismTooLarge {
            elitism: 10,
            population: 10,
        };
        assert_eq!(
            err.to_string(),
            "Elitism count 10 must be smaller than population size 10"
        );

        let err = ConfigError::InvalidProbability {
            name: "crossover_probability",
            value: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "Probability crossover_probability = 1.5 is outside [0, 1]"
        );
    }

    #[test]
    fn test_evolution_error_from_config_error() {
        let evo_err: EvolutionError = ConfigError::EmptyOperatorSet.into();
        assert!(matches!(evo_err, EvolutionError::Configuration(_)));
        assert!(evo_err.to_string().contains("Operator set is empty"));
    }

    #[test]
    fn test_operator_result_success() {
        let result: OperatorResult<i32> = OperatorResult::Success(42);
        assert!(result.is_ok());
        assert!(!result.used_fallback());
        assert_eq!(result.genome(), Some(42));
    }

    #[test]
    fn test_operator_result_fallback() {
        let info = FallbackInfo {
            reason: "no internal nodes".to_string(),
            method: "leaf_swap",
        };
        let result: OperatorResult<i32> = OperatorResult::Fallback(7, info);
        assert!(result.is_ok());
        assert!(result.used_fallback());
        assert_eq!(result.map(|x| x * 2).genome(), Some(14));
    }

    #[test]
    fn test_operator_result_failed() {
        let result: OperatorResult<i32> =
            OperatorResult::Failed(OperatorError::NotApplicable("leaf".to_string()));
        assert!(!result.is_ok());
        assert_eq!(result.genome(), None);
    }

    #[test]
    fn test_mutation_outcome() {
        assert!(MutationOutcome::Applied.is_applied());
        assert!(!MutationOutcome::NotApplicable.is_applied());
    }
}
