//! Operator symbols
//!
//! Binary and unary operators with domain-checked evaluation. Unlike the
//! protected operators common in GP libraries, a domain violation is reported
//! as an [`EvaluationError`] so the fitness evaluator can penalise it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

/// Operators consuming two operands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division (fails on a zero divisor)
    Div,
    /// Power (fails on a negative base with fractional exponent, or zero base with negative exponent)
    Pow,
}

impl BinaryOp {
    /// Every binary operator, in canonical order
    pub const ALL: [BinaryOp; 5] = [Self::Add, Self::Sub, Self::Mul, Self::Div, Self::Pow];

    /// Rendering symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }

    /// Apply the operator
    pub fn apply(self, a: f64, b: f64) -> Result<f64, EvaluationError> {
        let value = match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => {
                if b == 0.0 {
                    return Err(EvaluationError::DivisionByZero);
                }
                a / b
            }
            Self::Pow => {
                if (a < 0.0 && b.fract() != 0.0) || (a == 0.0 && b < 0.0) {
                    return Err(EvaluationError::PowDomain {
                        base: a,
                        exponent: b,
                    });
                }
                a.powf(b)
            }
        };
        finite(value, self.symbol())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operators consuming one operand
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Sine
    Sin,
    /// Cosine
    Cos,
    /// Exponential
    Exp,
    /// Natural logarithm (fails on non-positive input)
    Log,
    /// Absolute value
    Abs,
}

impl UnaryOp {
    /// Every unary operator, in canonical order
    pub const ALL: [UnaryOp; 5] = [Self::Sin, Self::Cos, Self::Exp, Self::Log, Self::Abs];

    /// Rendering symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Abs => "abs",
        }
    }

    /// Apply the operator
    pub fn apply(self, x: f64) -> Result<f64, EvaluationError> {
        let value = match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Exp => x.exp(),
            Self::Log => {
                if x <= 0.0 {
                    return Err(EvaluationError::LogDomain(x));
                }
                x.ln()
            }
            Self::Abs => x.abs(),
        };
        finite(value, self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An internal-node symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Two-operand operator
    Binary(BinaryOp),
    /// One-operand operator
    Unary(UnaryOp),
}

impl Operator {
    /// Number of children this operator requires
    pub fn arity(self) -> usize {
        match self {
            Self::Binary(_) => 2,
            Self::Unary(_) => 1,
        }
    }

    /// Rendering symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Binary(op) => op.symbol(),
            Self::Unary(op) => op.symbol(),
        }
    }

    /// Apply the operator to already-evaluated operands
    pub fn apply(self, args: &[f64]) -> Result<f64, EvaluationError> {
        match (self, args) {
            (Self::Binary(op), [a, b]) => op.apply(*a, *b),
            (Self::Unary(op), [x]) => op.apply(*x),
            _ => Err(EvaluationError::ArityMismatch {
                symbol: self.symbol(),
                expected: self.arity(),
                actual: args.len(),
            }),
        }
    }
}

impl From<BinaryOp> for Operator {
    fn from(op: BinaryOp) -> Self {
        Self::Binary(op)
    }
}

impl From<UnaryOp> for Operator {
    fn from(op: UnaryOp) -> Self {
        Self::Unary(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn finite(value: f64, symbol: &'static str) -> Result<f64, EvaluationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NonFinite { symbol })
    }
}
