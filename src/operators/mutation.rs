//! Mutation operators
//!
//! Both operators edit the tree in place and draw replacement symbols from
//! the shared [`SymbolTable`].

use std::sync::Arc;

use rand::Rng;

use crate::error::MutationOutcome;
use crate::genome::node::TreeNode;
use crate::genome::tree::ExpressionTree;
use crate::operators::traits::MutationOperator;
use crate::symbols::operator::Operator;
use crate::symbols::table::SymbolTable;
use crate::symbols::terminal::Terminal;

/// Subtree replacement mutation
///
/// Picks an internal node uniformly and replaces it with a freshly grown
/// subtree that fits the depth left below that node. Single-leaf trees are
/// not mutated.
#[derive(Clone, Debug)]
pub struct SubtreeMutation {
    symbols: Arc<SymbolTable>,
}

impl SubtreeMutation {
    /// Create a subtree mutation drawing from `symbols`
    pub fn new(symbols: Arc<SymbolTable>) -> Self {
        Self { symbols }
    }
}

impl MutationOperator for SubtreeMutation {
    fn mutate<R: Rng>(&self, tree: &mut ExpressionTree, rng: &mut R) -> MutationOutcome {
        let internal: Vec<_> = tree.sites().into_iter().filter(|s| s.is_function).collect();
        if internal.is_empty() {
            return MutationOutcome::NotApplicable;
        }

        let site = &internal[rng.gen_range(0..internal.len())];
        let subtree = ExpressionTree::grow_subtree(&self.symbols, site.depth, tree.max_depth(), rng);
        match tree.replace_subtree(&site.path, subtree) {
            Some(_) => MutationOutcome::Applied,
            None => MutationOutcome::NotApplicable,
        }
    }
}

/// Point mutation
///
/// Picks a node uniformly. An internal node gets a different operator of the
/// same arity; a leaf gets a freshly drawn terminal (a new constant, or a
/// different variable). The tree's shape never changes.
#[derive(Clone, Debug)]
pub struct PointMutation {
    symbols: Arc<SymbolTable>,
}

impl PointMutation {
    /// Create a point mutation drawing from `symbols`
    pub fn new(symbols: Arc<SymbolTable>) -> Self {
        Self { symbols }
    }
}

enum PointEdit {
    Operator(Operator),
    Terminal(Terminal),
}

impl MutationOperator for PointMutation {
    fn mutate<R: Rng>(&self, tree: &mut ExpressionTree, rng: &mut R) -> MutationOutcome {
        let positions = tree.root().positions();
        let path = &positions[rng.gen_range(0..positions.len())];

        let edit = match tree.root().get_subtree(path) {
            Some(TreeNode::Function { op, .. }) => self
                .symbols
                .alternative_operator(*op, rng)
                .map(PointEdit::Operator),
            Some(TreeNode::Terminal { terminal, .. }) => self
                .symbols
                .alternative_terminal(terminal, rng)
                .map(PointEdit::Terminal),
            None => None,
        };
        let Some(edit) = edit else {
            return MutationOutcome::NotApplicable;
        };

        match (tree.node_mut(path), edit) {
            (Some(TreeNode::Function { op, .. }), PointEdit::Operator(new_op)) => *op = new_op,
            (Some(TreeNode::Terminal { terminal, .. }), PointEdit::Terminal(new_terminal)) => {
                *terminal = new_terminal
            }
            _ => return MutationOutcome::NotApplicable,
        }
        MutationOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::operator::{BinaryOp, UnaryOp};
    use crate::symbols::table::SymbolSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn symbols() -> Arc<SymbolTable> {
        Arc::new(SymbolSet::default().compile().unwrap())
    }

    fn x() -> TreeNode {
        TreeNode::terminal(Terminal::var("x"))
    }

    #[test]
    fn test_subtree_mutation_respects_depth() {
        let symbols = symbols();
        let mutation = SubtreeMutation::new(symbols.clone());
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut tree = ExpressionTree::generate_full(&symbols, 4, &mut rng);
            tree.set_fitness(1.0);
            assert!(mutation.mutate(&mut tree, &mut rng).is_applied());
            assert!(tree.depth() <= 4);
            assert!(tree.check_invariants().is_ok());
            assert_eq!(tree.cached_fitness(), None);
        }
    }

    #[test]
    fn test_subtree_mutation_of_leaf_not_applicable() {
        let mutation = SubtreeMutation::new(symbols());
        let mut rng = StdRng::seed_from_u64(1);
        let mut tree = ExpressionTree::new(x(), 3);
        tree.set_fitness(2.0);
        assert_eq!(
            mutation.mutate(&mut tree, &mut rng),
            MutationOutcome::NotApplicable
        );
        assert_eq!(tree, ExpressionTree::new(x(), 3));
        assert_eq!(tree.cached_fitness(), Some(2.0));
    }

    #[test]
    fn test_point_mutation_keeps_binary_arity() {
        let mutation = PointMutation::new(symbols());
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            // A single `+` over two constants: only the root is internal
            let mut tree = ExpressionTree::new(
                TreeNode::function(
                    BinaryOp::Add.into(),
                    vec![
                        TreeNode::terminal(Terminal::Constant(1.0)),
                        TreeNode::terminal(Terminal::Constant(2.0)),
                    ],
                ),
                1,
            );
            mutation.mutate(&mut tree, &mut rng);
            match tree.root() {
                TreeNode::Function { op, children, .. } => {
                    assert_eq!(op.arity(), 2);
                    assert!(matches!(op, Operator::Binary(_)));
                    assert_eq!(children.len(), 2);
                }
                TreeNode::Terminal { .. } => panic!("root became a leaf"),
            }
            assert!(tree.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_point_mutation_unary_alternative() {
        let mutation = PointMutation::new(symbols());
        let mut rng = StdRng::seed_from_u64(5);
        let mut changed = false;
        for _ in 0..50 {
            let mut tree =
                ExpressionTree::new(TreeNode::function(UnaryOp::Sin.into(), vec![x()]), 1);
            mutation.mutate(&mut tree, &mut rng);
            if let TreeNode::Function { op, .. } = tree.root() {
                assert!(*op == Operator::Unary(UnaryOp::Sin) || *op == Operator::Unary(UnaryOp::Cos));
                changed |= *op == Operator::Unary(UnaryOp::Cos);
            }
        }
        assert!(changed);
    }

    #[test]
    fn test_point_mutation_without_alternative() {
        let symbols = Arc::new(
            SymbolSet::new()
                .with_operator(UnaryOp::Sin, 1.0)
                .with_variable("x", 1.0)
                .compile()
                .unwrap(),
        );
        let mutation = PointMutation::new(symbols);
        let mut rng = StdRng::seed_from_u64(9);
        let mut tree = ExpressionTree::new(TreeNode::function(UnaryOp::Sin.into(), vec![x()]), 1);
        tree.set_fitness(0.5);
        for _ in 0..20 {
            assert_eq!(
                mutation.mutate(&mut tree, &mut rng),
                MutationOutcome::NotApplicable
            );
        }
        assert_eq!(tree.cached_fitness(), Some(0.5));
    }

    #[test]
    fn test_point_mutation_leaf() {
        let mutation = PointMutation::new(symbols());
        let mut rng = StdRng::seed_from_u64(12);
        let mut tree = ExpressionTree::new(x(), 0);
        assert!(mutation.mutate(&mut tree, &mut rng).is_applied());
        // Only `x` and constants are available, so `x` must become a constant
        assert!(matches!(
            tree.root(),
            TreeNode::Terminal {
                terminal: Terminal::Constant(_),
                ..
            }
        ));
    }
}
