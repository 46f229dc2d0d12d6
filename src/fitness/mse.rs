//! Mean squared error fitness
//!
//! Points where a tree cannot be evaluated contribute a fixed penalty instead
//! of aborting the computation. A tree that fails on every point is
//! unusable and scores `f64::INFINITY`.

use crate::fitness::points::PointSet;
use crate::fitness::traits::Fitness;
use crate::genome::tree::ExpressionTree;

/// Squared-error contribution of a point the tree cannot evaluate
pub const DEFAULT_PENALTY: f64 = 1e10;

/// Mean squared error over a fixed point set
#[derive(Clone, Debug)]
pub struct MeanSquaredError {
    points: PointSet,
    penalty: f64,
}

impl MeanSquaredError {
    /// Create an evaluator with the default penalty
    pub fn new(points: PointSet) -> Self {
        Self {
            points,
            penalty: DEFAULT_PENALTY,
        }
    }

    /// Set the per-point penalty for evaluation failures
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// The point set
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// The per-point penalty
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// Score a tree, also reporting how many points failed
    pub fn score(&self, tree: &ExpressionTree) -> Score {
        let mut total = 0.0;
        let mut failed = 0;
        for point in &self.points {
            let error = tree
                .evaluate(point)
                .map(|y| (y - point.target).powi(2))
                .ok()
                .filter(|e| e.is_finite());
            match error {
                Some(e) => total += e,
                None => {
                    failed += 1;
                    total += self.penalty;
                }
            }
        }

        let n = self.points.len();
        let mse = if n == 0 || failed == n {
            f64::INFINITY
        } else {
            total / n as f64
        };
        Score { mse, failed }
    }
}

/// Detailed result of scoring one tree
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Score {
    /// Mean squared error including penalties
    pub mse: f64,
    /// Points at which evaluation failed
    pub failed: usize,
}

impl Fitness for MeanSquaredError {
    fn evaluate(&self, tree: &ExpressionTree) -> f64 {
        self.score(tree).mse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::node::TreeNode;
    use crate::symbols::operator::BinaryOp;
    use crate::symbols::terminal::Terminal;

    fn x() -> TreeNode {
        TreeNode::terminal(Terminal::var("x"))
    }

    fn reciprocal() -> ExpressionTree {
        ExpressionTree::new(
            TreeNode::function(
                BinaryOp::Div.into(),
                vec![TreeNode::terminal(Terminal::Constant(1.0)), x()],
            ),
            1,
        )
    }

    #[test]
    fn test_exact_fit_is_zero() {
        let points = PointSet::linspace("x", -5.0, 5.0, 40, |x| x * x);
        let fitness = MeanSquaredError::new(points);
        let tree = ExpressionTree::new(TreeNode::function(BinaryOp::Mul.into(), vec![x(), x()]), 1);
        assert!(fitness.evaluate(&tree).abs() < 1e-12);
    }

    #[test]
    fn test_mean_of_squares() {
        let points = PointSet::from_pairs("x", [(1.0, 0.0), (2.0, 0.0)]);
        let fitness = MeanSquaredError::new(points);
        let tree = ExpressionTree::new(x(), 0);
        // (1 + 4) / 2
        assert_eq!(fitness.evaluate(&tree), 2.5);
    }

    #[test]
    fn test_penalty_on_failure() {
        let points = PointSet::from_pairs("x", [(0.0, 1.0), (1.0, 1.0)]);
        let fitness = MeanSquaredError::new(points).with_penalty(100.0);
        let score = fitness.score(&reciprocal());
        assert_eq!(score.failed, 1);
        assert_eq!(score.mse, 50.0);
    }

    #[test]
    fn test_all_points_failing_is_infinite() {
        let points = PointSet::from_pairs("x", [(0.0, 1.0)]);
        let fitness = MeanSquaredError::new(points);
        assert_eq!(fitness.evaluate(&reciprocal()), f64::INFINITY);
    }

    #[test]
    fn test_unbound_variable_is_failure() {
        let points = PointSet::from_pairs("y", [(1.0, 1.0)]);
        let fitness = MeanSquaredError::new(points);
        assert_eq!(fitness.evaluate(&ExpressionTree::new(x(), 0)), f64::INFINITY);
    }
}
