//! Sample points
//!
//! A [`PointSet`] is the fixed sample of (inputs, expected output) pairs a
//! tree is scored against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::symbols::terminal::Bindings;

/// One sample: variable bindings and the expected output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Variable values at this sample
    pub inputs: BTreeMap<String, f64>,
    /// Expected output
    pub target: f64,
}

impl Point {
    /// Create a single-variable point
    pub fn new(variable: impl Into<String>, input: f64, target: f64) -> Self {
        let mut inputs = BTreeMap::new();
        inputs.insert(variable.into(), input);
        Self { inputs, target }
    }
}

impl Bindings for Point {
    fn value(&self, name: &str) -> Option<f64> {
        self.inputs.get(name).copied()
    }
}

/// The fixed sample a run is scored against
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    /// Create a point set from explicit points
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Sample `target` at `n` evenly spaced values of `variable` in `[min, max]`
    pub fn linspace<F>(variable: &str, min: f64, max: f64, n: usize, target: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        linspace(min, max, n)
            .map(|x| Point::new(variable, x, target(x)))
            .collect()
    }

    /// Build a single-variable point set from (input, target) pairs
    pub fn from_pairs<I>(variable: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        pairs
            .into_iter()
            .map(|(x, y)| Point::new(variable, x, y))
            .collect()
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points
    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Borrow the points
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Reject empty sets and non-finite values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points.is_empty() {
            return Err(ConfigError::EmptyPointSet);
        }
        for (index, point) in self.points.iter().enumerate() {
            if !point.target.is_finite() || point.inputs.values().any(|v| !v.is_finite()) {
                return Err(ConfigError::NonFinitePoint { index });
            }
        }
        Ok(())
    }
}

impl FromIterator<Point> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// `n` evenly spaced values covering `[min, max]`, both ends included
pub fn linspace(min: f64, max: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (max - min) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| if i + 1 == n && n > 1 { max } else { min + step * i as f64 })
}
