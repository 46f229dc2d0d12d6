//! Terminal symbols and variable bindings

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A leaf symbol
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Terminal {
    /// Named input variable, looked up in the evaluation bindings
    Variable(String),
    /// Numeric constant fixed at generation time
    Constant(f64),
}

impl Terminal {
    /// Create a variable terminal
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Check if this is a constant
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// The kind this terminal was drawn from
    pub fn kind(&self) -> TerminalKind {
        match self {
            Self::Variable(name) => TerminalKind::Variable(name.clone()),
            Self::Constant(_) => TerminalKind::Constant,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => f.write_str(name),
            Self::Constant(c) => write!(f, "{}", c),
        }
    }
}

/// A terminal entry of the symbol set
///
/// Constants are a single entry; the concrete value is sampled each time the
/// entry is drawn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalKind {
    /// A named input variable
    Variable(String),
    /// An ephemeral random constant
    Constant,
}

impl fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => f.write_str(name),
            Self::Constant => f.write_str("const"),
        }
    }
}

/// Source of variable values during evaluation
pub trait Bindings {
    /// Value bound to `name`, if any
    fn value(&self, name: &str) -> Option<f64>;
}

impl Bindings for HashMap<String, f64> {
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Bindings for BTreeMap<String, f64> {
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Bindings for [(&str, f64)] {
    fn value(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> Bindings for [(&str, f64); N] {
    fn value(&self, name: &str) -> Option<f64> {
        self.as_slice().value(name)
    }
}

impl Bindings for (&str, f64) {
    fn value(&self, name: &str) -> Option<f64> {
        (self.0 == name).then_some(self.1)
    }
}

impl<B: Bindings + ?Sized> Bindings for &B {
    fn value(&self, name: &str) -> Option<f64> {
        (**self).value(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_display() {
        assert_eq!(Terminal::var("x").to_string(), "x");
        assert_eq!(Terminal::Constant(2.5).to_string(), "2.5");
        assert_eq!(Terminal::Constant(-3.0).to_string(), "-3");
    }

    #[test]
    fn test_terminal_kind() {
        assert_eq!(Terminal::var("x").kind(), TerminalKind::Variable("x".into()));
        assert_eq!(Terminal::Constant(1.0).kind(), TerminalKind::Constant);
    }

    #[test]
    fn test_bindings() {
        let mut map = HashMap::new();
        map.insert("x".to_string(), 3.0);
        assert_eq!(map.value("x"), Some(3.0));
        assert_eq!(map.value("y"), None);

        let pairs = [("x", 1.0), ("y", 2.0)];
        assert_eq!(pairs.value("y"), Some(2.0));
        assert_eq!(("x", 4.0).value("x"), Some(4.0));
        assert_eq!(("x", 4.0).value("z"), None);
    }
}
