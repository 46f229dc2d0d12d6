//! Symbol set configuration and the compiled symbol table
//!
//! [`SymbolSet`] is the serialisable description of which operators and
//! terminals are available and how likely each one is to be drawn.
//! [`SymbolTable`] is its validated, immutable form: it owns pre-built
//! weighted distributions and is shared read-only by every tree operation.

use rand::Rng;
use rand_distr::{Distribution, Uniform, WeightedIndex};
use serde::{Deserialize, Serialize};

use super::operator::{BinaryOp, Operator, UnaryOp};
use super::terminal::{Terminal, TerminalKind};
use crate::error::ConfigError;

/// A symbol paired with its selection weight
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weighted<S> {
    /// The symbol
    pub symbol: S,
    /// Relative selection weight; zero disables the symbol
    pub weight: f64,
}

impl<S> Weighted<S> {
    /// Create a weighted entry
    pub fn new(symbol: S, weight: f64) -> Self {
        Self { symbol, weight }
    }
}

/// Serialisable description of the available symbols
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolSet {
    /// Operators and their weights
    pub operators: Vec<Weighted<Operator>>,
    /// Terminal kinds and their weights
    pub terminals: Vec<Weighted<TerminalKind>>,
    /// Range constants are drawn from (inclusive)
    pub constant_range: (f64, f64),
    /// Decimal places constants are rounded to; `None` keeps full precision
    pub constant_decimals: Option<u32>,
}

impl Default for SymbolSet {
    /// Arithmetic plus sine and cosine over `x` and random constants
    fn default() -> Self {
        Self::new()
            .with_operator(BinaryOp::Add, 1.0)
            .with_operator(BinaryOp::Sub, 1.0)
            .with_operator(BinaryOp::Mul, 1.0)
            .with_operator(BinaryOp::Div, 1.0)
            .with_operator(BinaryOp::Pow, 0.0)
            .with_operator(UnaryOp::Sin, 1.0)
            .with_operator(UnaryOp::Cos, 1.0)
            .with_operator(UnaryOp::Exp, 0.0)
            .with_operator(UnaryOp::Log, 0.0)
            .with_operator(UnaryOp::Abs, 0.0)
            .with_variable("x", 1.0)
            .with_constants(1.0)
    }
}

impl SymbolSet {
    /// Create an empty symbol set
    pub fn new() -> Self {
        Self {
            operators: Vec::new(),
            terminals: Vec::new(),
            constant_range: (-10.0, 10.0),
            constant_decimals: Some(1),
        }
    }

    /// Add an operator, or update its weight if already present
    pub fn with_operator(mut self, op: impl Into<Operator>, weight: f64) -> Self {
        let op = op.into();
        match self.operators.iter_mut().find(|w| w.symbol == op) {
            Some(entry) => entry.weight = weight,
            None => self.operators.push(Weighted::new(op, weight)),
        }
        self
    }

    /// Add a named variable, or update its weight if already present
    pub fn with_variable(self, name: impl Into<String>, weight: f64) -> Self {
        self.with_terminal(TerminalKind::Variable(name.into()), weight)
    }

    /// Enable random constants with the given weight
    pub fn with_constants(self, weight: f64) -> Self {
        self.with_terminal(TerminalKind::Constant, weight)
    }

    fn with_terminal(mut self, kind: TerminalKind, weight: f64) -> Self {
        match self.terminals.iter_mut().find(|w| w.symbol == kind) {
            Some(entry) => entry.weight = weight,
            None => self.terminals.push(Weighted::new(kind, weight)),
        }
        self
    }

    /// Set the inclusive range random constants are drawn from
    pub fn with_constant_range(mut self, min: f64, max: f64) -> Self {
        self.constant_range = (min, max);
        self
    }

    /// Set the rounding applied to random constants
    pub fn with_constant_decimals(mut self, decimals: Option<u32>) -> Self {
        self.constant_decimals = decimals;
        self
    }

    /// Validate and compile into a [`SymbolTable`]
    pub fn compile(&self) -> Result<SymbolTable, ConfigError> {
        SymbolTable::new(self)
    }
}

/// Outcome of a draw from the combined operator and terminal set
#[derive(Clone, Debug, PartialEq)]
pub enum SymbolDraw {
    /// An operator was drawn; the branch continues
    Operator(Operator),
    /// A terminal was drawn; the branch ends
    Terminal(Terminal),
}

/// Validated, immutable symbol catalog with pre-built weighted draws
#[derive(Clone, Debug)]
pub struct SymbolTable {
    operators: Vec<Operator>,
    operator_weights: Vec<f64>,
    operator_dist: WeightedIndex<f64>,
    terminals: Vec<TerminalKind>,
    terminal_weights: Vec<f64>,
    terminal_dist: WeightedIndex<f64>,
    combined_dist: WeightedIndex<f64>,
    constant_dist: Uniform<f64>,
    constant_range: (f64, f64),
    constant_decimals: Option<u32>,
}

impl SymbolTable {
    /// Compile a symbol set
    ///
    /// Entries with zero weight are dropped. Fails when a weight is negative
    /// or not finite, when no operator or no terminal remains, or when the
    /// constant range is invalid.
    pub fn new(set: &SymbolSet) -> Result<Self, ConfigError> {
        let (operators, operator_weights) = enabled(&set.operators, |op| op.to_string())?;
        let (terminals, terminal_weights) = enabled(&set.terminals, |t| t.to_string())?;

        if operators.is_empty() {
            return Err(ConfigError::EmptyOperatorSet);
        }
        if terminals.is_empty() {
            return Err(ConfigError::EmptyTerminalSet);
        }

        let (min, max) = set.constant_range;
        if !(min.is_finite() && max.is_finite() && min <= max && (max - min).is_finite()) {
            return Err(ConfigError::InvalidConstantRange { min, max });
        }

        let operator_dist =
            WeightedIndex::new(&operator_weights).map_err(|_| ConfigError::EmptyOperatorSet)?;
        let terminal_dist =
            WeightedIndex::new(&terminal_weights).map_err(|_| ConfigError::EmptyTerminalSet)?;
        let combined_dist = WeightedIndex::new(operator_weights.iter().chain(&terminal_weights))
            .map_err(|_| ConfigError::EmptyOperatorSet)?;

        Ok(Self {
            operators,
            operator_weights,
            operator_dist,
            terminals,
            terminal_weights,
            terminal_dist,
            combined_dist,
            constant_dist: Uniform::new_inclusive(min, max),
            constant_range: (min, max),
            constant_decimals: set.constant_decimals,
        })
    }

    /// Enabled operators
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Enabled terminal kinds
    pub fn terminals(&self) -> &[TerminalKind] {
        &self.terminals
    }

    /// Names of the enabled variables
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terminals.iter().filter_map(|t| match t {
            TerminalKind::Variable(name) => Some(name.as_str()),
            TerminalKind::Constant => None,
        })
    }

    /// Draw an operator by weight
    pub fn sample_operator<R: Rng>(&self, rng: &mut R) -> Operator {
        self.operators[self.operator_dist.sample(rng)]
    }

    /// Draw a terminal by weight, sampling a value for constants
    pub fn sample_terminal<R: Rng>(&self, rng: &mut R) -> Terminal {
        let kind = &self.terminals[self.terminal_dist.sample(rng)];
        self.instantiate(kind, rng)
    }

    /// Draw from the combined operator and terminal set by weight
    pub fn sample_symbol<R: Rng>(&self, rng: &mut R) -> SymbolDraw {
        let idx = self.combined_dist.sample(rng);
        match self.operators.get(idx) {
            Some(op) => SymbolDraw::Operator(*op),
            None => {
                let kind = &self.terminals[idx - self.operators.len()];
                SymbolDraw::Terminal(self.instantiate(kind, rng))
            }
        }
    }

    /// Draw a constant value from the configured range
    ///
    /// Rounded values are clamped back into the range.
    pub fn sample_constant<R: Rng>(&self, rng: &mut R) -> f64 {
        let value = self.constant_dist.sample(rng);
        match self.constant_decimals {
            Some(decimals) => {
                let (min, max) = self.constant_range;
                let scale = 10f64.powi(decimals as i32);
                ((value * scale).round() / scale).clamp(min, max)
            }
            None => value,
        }
    }

    /// Draw an operator of the same arity as `current`, excluding `current`
    ///
    /// Returns `None` when no such operator is enabled.
    pub fn alternative_operator<R: Rng>(&self, current: Operator, rng: &mut R) -> Option<Operator> {
        let candidates: Vec<(Operator, f64)> = self
            .operators
            .iter()
            .zip(&self.operator_weights)
            .filter(|(op, _)| **op != current && op.arity() == current.arity())
            .map(|(op, w)| (*op, *w))
            .collect();
        let dist = WeightedIndex::<f64>::new(candidates.iter().map(|(_, w)| *w)).ok()?;
        Some(candidates[dist.sample(rng)].0)
    }

    /// Draw a replacement terminal for `current`
    ///
    /// Constants may be replaced by a fresh constant; a variable is never
    /// replaced by itself. Returns `None` when nothing else is available.
    pub fn alternative_terminal<R: Rng>(&self, current: &Terminal, rng: &mut R) -> Option<Terminal> {
        let candidates: Vec<(&TerminalKind, f64)> = self
            .terminals
            .iter()
            .zip(&self.terminal_weights)
            .filter(|(kind, _)| match (kind, current) {
                (TerminalKind::Variable(name), Terminal::Variable(cur)) => name != cur,
                _ => true,
            })
            .map(|(kind, w)| (kind, *w))
            .collect();
        let dist = WeightedIndex::<f64>::new(candidates.iter().map(|(_, w)| *w)).ok()?;
        Some(self.instantiate(candidates[dist.sample(rng)].0, rng))
    }

    fn instantiate<R: Rng>(&self, kind: &TerminalKind, rng: &mut R) -> Terminal {
        match kind {
            TerminalKind::Variable(name) => Terminal::Variable(name.clone()),
            TerminalKind::Constant => Terminal::Constant(self.sample_constant(rng)),
        }
    }
}

fn enabled<S: Clone>(
    entries: &[Weighted<S>],
    name: impl Fn(&S) -> String,
) -> Result<(Vec<S>, Vec<f64>), ConfigError> {
    let mut symbols = Vec::new();
    let mut weights = Vec::new();
    for entry in entries {
        if !entry.weight.is_finite() || entry.weight < 0.0 {
            return Err(ConfigError::InvalidWeight {
                symbol: name(&entry.symbol),
                weight: entry.weight,
            });
        }
        if entry.weight > 0.0 {
            symbols.push(entry.symbol.clone());
            weights.push(entry.weight);
        }
    }
    Ok((symbols, weights))
}
