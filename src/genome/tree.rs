//! Expression trees for symbolic regression
//!
//! An [`ExpressionTree`] owns a [`TreeNode`] graph, the depth bound it was
//! generated under, and a memoized fitness. Every structural edit made
//! through the tree clears the memoized value.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvaluationError, InvariantViolation};
use crate::fitness::traits::Fitness;
use crate::genome::node::{NodeSite, TreeNode};
use crate::symbols::table::{SymbolDraw, SymbolTable};
use crate::symbols::terminal::{Bindings, Terminal};

/// Tree construction strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationMethod {
    /// Every leaf sits at exactly the maximum depth
    Full,
    /// Branches may end early; leaves sit at or above the maximum depth
    Grow,
}

/// A candidate solution: one expression over the configured symbols
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpressionTree {
    root: TreeNode,
    max_depth: usize,
    #[serde(skip)]
    fitness: Option<f64>,
}

impl PartialEq for ExpressionTree {
    /// Structural equality; the memoized fitness is ignored
    fn eq(&self, other: &Self) -> bool {
        self.max_depth == other.max_depth && self.root == other.root
    }
}

impl ExpressionTree {
    /// Wrap a node graph, re-seating its cached depths from the root
    pub fn new(mut root: TreeNode, max_depth: usize) -> Self {
        root.reset_depth(0);
        Self {
            root,
            max_depth,
            fitness: None,
        }
    }

    /// Generate a tree using the "full" method
    pub fn generate_full<R: Rng>(symbols: &SymbolTable, max_depth: usize, rng: &mut R) -> Self {
        let root = full_node(symbols, 0, max_depth, rng);
        Self {
            root,
            max_depth,
            fitness: None,
        }
    }

    /// Generate a tree using the "grow" method
    pub fn generate_grow<R: Rng>(symbols: &SymbolTable, max_depth: usize, rng: &mut R) -> Self {
        let root = Self::grow_subtree(symbols, 0, max_depth, rng);
        Self {
            root,
            max_depth,
            fitness: None,
        }
    }

    /// Generate a tree with the given method
    pub fn generate<R: Rng>(
        method: GenerationMethod,
        symbols: &SymbolTable,
        max_depth: usize,
        rng: &mut R,
    ) -> Self {
        match method {
            GenerationMethod::Full => Self::generate_full(symbols, max_depth, rng),
            GenerationMethod::Grow => Self::generate_grow(symbols, max_depth, rng),
        }
    }

    /// Grow a subtree whose root sits at `depth`, bounded by `max_depth`
    pub(crate) fn grow_subtree<R: Rng>(
        symbols: &SymbolTable,
        depth: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> TreeNode {
        if depth >= max_depth {
            return TreeNode::leaf_at(symbols.sample_terminal(rng), depth);
        }
        match symbols.sample_symbol(rng) {
            SymbolDraw::Terminal(terminal) => TreeNode::leaf_at(terminal, depth),
            SymbolDraw::Operator(op) => {
                let children = (0..op.arity())
                    .map(|_| Self::grow_subtree(symbols, depth + 1, max_depth, rng))
                    .collect();
                TreeNode::function_at(op, children, depth)
            }
        }
    }

    /// Root node
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Depth bound this tree must respect
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Depth of the deepest leaf (0 for a single leaf)
    pub fn depth(&self) -> usize {
        self.root.height()
    }

    /// Get the number of nodes in the tree
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Check if the tree is a single leaf
    pub fn is_leaf(&self) -> bool {
        self.root.is_terminal()
    }

    /// Describe every node in preorder
    pub fn sites(&self) -> Vec<NodeSite> {
        self.root.sites()
    }

    /// Evaluate the tree under the given variable bindings
    pub fn evaluate<B: Bindings + ?Sized>(&self, bindings: &B) -> Result<f64, EvaluationError> {
        self.root.evaluate(bindings)
    }

    /// Fully parenthesised infix rendering, for diagnostics
    pub fn to_expression_string(&self) -> String {
        self.root.to_string()
    }

    /// Evaluate over `n` evenly spaced values of `variable` in `[min, max]`
    ///
    /// Points where evaluation fails are reported as `None`.
    pub fn sample_grid(
        &self,
        variable: &str,
        min: f64,
        max: f64,
        n: usize,
    ) -> Vec<(f64, Option<f64>)> {
        crate::fitness::points::linspace(min, max, n)
            .map(|x| (x, self.evaluate(&(variable, x)).ok()))
            .collect()
    }

    /// Memoized fitness under `fitness`
    pub fn fitness<F: Fitness + ?Sized>(&mut self, fitness: &F) -> f64 {
        match self.fitness {
            Some(value) => value,
            None => {
                let value = fitness.evaluate(self);
                self.fitness = Some(value);
                value
            }
        }
    }

    /// Memoized fitness, if it has been computed since the last edit
    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness
    }

    #[cfg(test)]
    pub(crate) fn set_fitness(&mut self, value: f64) {
        self.fitness = Some(value);
    }

    /// Drop the memoized fitness
    pub fn invalidate_fitness(&mut self) {
        self.fitness = None;
    }

    /// Replace the subtree at `path`, returning the removed subtree
    pub fn replace_subtree(&mut self, path: &[usize], subtree: TreeNode) -> Option<TreeNode> {
        let removed = self.root.replace_subtree(path, subtree)?;
        self.fitness = None;
        Some(removed)
    }

    /// Mutable access to a node for in-place symbol edits
    ///
    /// The memoized fitness is cleared up front. Callers must not change the
    /// node's arity.
    pub(crate) fn node_mut(&mut self, path: &[usize]) -> Option<&mut TreeNode> {
        self.fitness = None;
        self.root.get_subtree_mut(path)
    }

    /// Rough structural distance, for diversity diagnostics
    pub fn distance(&self, other: &Self) -> f64 {
        let size_diff = (self.size() as f64 - other.size() as f64).abs();
        let depth_diff = (self.depth() as f64 - other.depth() as f64).abs();
        size_diff + depth_diff
    }

    /// Verify arity, cached depths, and the depth bound
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.root.check_invariants(0)?;
        let depth = self.depth();
        if depth > self.max_depth {
            return Err(InvariantViolation::DepthExceeded {
                depth,
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }
}

impl From<Terminal> for ExpressionTree {
    fn from(terminal: Terminal) -> Self {
        Self::new(TreeNode::terminal(terminal), 0)
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

fn full_node<R: Rng>(symbols: &SymbolTable, depth: usize, max_depth: usize, rng: &mut R) -> TreeNode {
    if depth >= max_depth {
        return TreeNode::leaf_at(symbols.sample_terminal(rng), depth);
    }
    let op = symbols.sample_operator(rng);
    let children = (0..op.arity())
        .map(|_| full_node(symbols, depth + 1, max_depth, rng))
        .collect();
    TreeNode::function_at(op, children, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::FnFitness;
    use crate::symbols::operator::{BinaryOp, UnaryOp};
    use crate::symbols::table::SymbolSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table() -> SymbolTable {
        SymbolSet::default().compile().unwrap()
    }

    fn x() -> TreeNode {
        TreeNode::terminal(Terminal::var("x"))
    }

    fn c(value: f64) -> TreeNode {
        TreeNode::terminal(Terminal::Constant(value))
    }

    #[test]
    fn test_generate_full_leaves_at_max_depth() {
        let symbols = table();
        let mut rng = StdRng::seed_from_u64(42);
        for max_depth in 0..5 {
            let tree = ExpressionTree::generate_full(&symbols, max_depth, &mut rng);
            for site in tree.sites() {
                if !site.is_function {
                    assert_eq!(site.depth, max_depth);
                }
            }
            assert_eq!(tree.depth(), max_depth);
            assert!(tree.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_generate_grow_within_bound() {
        let symbols = table();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let tree = ExpressionTree::generate_grow(&symbols, 4, &mut rng);
            assert!(tree.depth() <= 4);
            assert!(tree.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_generation_deterministic_under_seed() {
        let symbols = table();
        let a = ExpressionTree::generate_grow(&symbols, 4, &mut StdRng::seed_from_u64(9));
        let b = ExpressionTree::generate_grow(&symbols, 4, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_max_depth_is_single_leaf() {
        let symbols = table();
        let mut rng = StdRng::seed_from_u64(1);
        let tree = ExpressionTree::generate(GenerationMethod::Grow, &symbols, 0, &mut rng);
        assert!(tree.is_leaf());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_evaluate_and_render() {
        // (x * x) + (2 * x)
        let root = TreeNode::function(
            BinaryOp::Add.into(),
            vec![
                TreeNode::function(BinaryOp::Mul.into(), vec![x(), x()]),
                TreeNode::function(BinaryOp::Mul.into(), vec![c(2.0), x()]),
            ],
        );
        let tree = ExpressionTree::new(root, 4);
        assert_eq!(tree.evaluate(&("x", 3.0)), Ok(15.0));
        assert_eq!(tree.to_expression_string(), "((x * x) + (2 * x))");
        assert_eq!(tree.to_string(), tree.to_expression_string());
    }

    #[test]
    fn test_sample_grid_marks_failures() {
        let tree = ExpressionTree::new(
            TreeNode::function(BinaryOp::Div.into(), vec![c(1.0), x()]),
            1,
        );
        let grid = tree.sample_grid("x", -1.0, 1.0, 3);
        assert_eq!(grid, vec![(-1.0, Some(-1.0)), (0.0, None), (1.0, Some(1.0))]);
    }

    #[test]
    fn test_fitness_memoized_and_invalidated() {
        let calls = AtomicUsize::new(0);
        let fitness = FnFitness::new(|tree: &ExpressionTree| {
            calls.fetch_add(1, Ordering::SeqCst);
            tree.size() as f64
        });

        let mut tree = ExpressionTree::new(TreeNode::function(UnaryOp::Sin.into(), vec![x()]), 3);
        assert_eq!(tree.fitness(&fitness), 2.0);
        assert_eq!(tree.fitness(&fitness), 2.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tree.replace_subtree(&[0], TreeNode::function(BinaryOp::Add.into(), vec![x(), c(1.0)]));
        assert_eq!(tree.cached_fitness(), None);
        assert_eq!(tree.fitness(&fitness), 4.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_equality_ignores_fitness() {
        let mut a = ExpressionTree::new(x(), 2);
        let b = ExpressionTree::new(x(), 2);
        a.set_fitness(1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_depth_exceeded_detected() {
        let root = TreeNode::function(UnaryOp::Sin.into(), vec![x()]);
        let tree = ExpressionTree::new(root, 0);
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::DepthExceeded {
                depth: 1,
                max_depth: 0
            })
        );
    }

    #[test]
    fn test_distance() {
        let leaf = ExpressionTree::from(Terminal::var("x"));
        let sum = ExpressionTree::new(TreeNode::function(BinaryOp::Add.into(), vec![x(), x()]), 2);
        assert_eq!(leaf.distance(&leaf), 0.0);
        assert_eq!(leaf.distance(&sum), 3.0);
    }
}
