//! Expression tree nodes
//!
//! A [`TreeNode`] exclusively owns its children. Every node caches its
//! distance from the root; the root sits at depth 0. Structural edits go
//! through [`TreeNode::replace_subtree`], which re-seats the cached depths of
//! the inserted subtree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EvaluationError, InvariantViolation};
use crate::symbols::operator::Operator;
use crate::symbols::terminal::{Bindings, Terminal};

/// A node in an expression tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf holding a variable or constant
    Terminal {
        /// The leaf symbol
        terminal: Terminal,
        /// Distance from the root
        depth: usize,
    },
    /// Internal node applying an operator to its children
    Function {
        /// The operator
        op: Operator,
        /// Operands, in order
        children: Vec<TreeNode>,
        /// Distance from the root
        depth: usize,
    },
}

/// Location and shape of one node, gathered in preorder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeSite {
    /// Child indices leading from the root to the node
    pub path: Vec<usize>,
    /// Distance from the root
    pub depth: usize,
    /// Longest distance from the node down to a leaf
    pub height: usize,
    /// Whether the node is internal
    pub is_function: bool,
}

impl TreeNode {
    /// Create a new terminal node at depth 0
    pub fn terminal(terminal: Terminal) -> Self {
        Self::Terminal { terminal, depth: 0 }
    }

    /// Create a new function node at depth 0, re-seating the children below it
    pub fn function(op: Operator, children: Vec<Self>) -> Self {
        let mut node = Self::Function {
            op,
            children,
            depth: 0,
        };
        node.reset_depth(0);
        node
    }

    pub(crate) fn leaf_at(terminal: Terminal, depth: usize) -> Self {
        Self::Terminal { terminal, depth }
    }

    pub(crate) fn function_at(op: Operator, children: Vec<Self>, depth: usize) -> Self {
        Self::Function {
            op,
            children,
            depth,
        }
    }

    /// Check if this is a terminal node
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }

    /// Check if this is a function node
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function { .. })
    }

    /// Cached distance from the root
    pub fn depth(&self) -> usize {
        match self {
            Self::Terminal { depth, .. } | Self::Function { depth, .. } => *depth,
        }
    }

    /// Longest distance from this node down to a leaf
    pub fn height(&self) -> usize {
        match self {
            Self::Terminal { .. } => 0,
            Self::Function { children, .. } => {
                1 + children.iter().map(|c| c.height()).max().unwrap_or(0)
            }
        }
    }

    /// Get the number of nodes in this subtree
    pub fn size(&self) -> usize {
        match self {
            Self::Terminal { .. } => 1,
            Self::Function { children, .. } => {
                1 + children.iter().map(|c| c.size()).sum::<usize>()
            }
        }
    }

    /// Child nodes; empty for leaves
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Terminal { .. } => &[],
            Self::Function { children, .. } => children,
        }
    }

    /// Get all node positions (preorder)
    pub fn positions(&self) -> Vec<Vec<usize>> {
        self.sites().into_iter().map(|s| s.path).collect()
    }

    /// Get all terminal positions (preorder)
    pub fn terminal_positions(&self) -> Vec<Vec<usize>> {
        self.sites()
            .into_iter()
            .filter(|s| !s.is_function)
            .map(|s| s.path)
            .collect()
    }

    /// Get all function positions (preorder)
    pub fn function_positions(&self) -> Vec<Vec<usize>> {
        self.sites()
            .into_iter()
            .filter(|s| s.is_function)
            .map(|s| s.path)
            .collect()
    }

    /// Describe every node of this subtree in preorder
    pub fn sites(&self) -> Vec<NodeSite> {
        let mut sites = Vec::with_capacity(self.size());
        self.collect_sites(&mut Vec::new(), &mut sites);
        sites
    }

    // Returns the height of `self` so parents can be filled in without a
    // second traversal.
    fn collect_sites(&self, path: &mut Vec<usize>, sites: &mut Vec<NodeSite>) -> usize {
        let index = sites.len();
        sites.push(NodeSite {
            path: path.clone(),
            depth: self.depth(),
            height: 0,
            is_function: self.is_function(),
        });

        let mut height = 0;
        for (i, child) in self.children().iter().enumerate() {
            path.push(i);
            height = height.max(1 + child.collect_sites(path, sites));
            path.pop();
        }
        sites[index].height = height;
        height
    }

    /// Get a subtree at the given path
    pub fn get_subtree(&self, path: &[usize]) -> Option<&Self> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => self.children().get(idx)?.get_subtree(rest),
        }
    }

    pub(crate) fn get_subtree_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => match self {
                Self::Terminal { .. } => None,
                Self::Function { children, .. } => children.get_mut(idx)?.get_subtree_mut(rest),
            },
        }
    }

    /// Replace the subtree at `path`, returning the removed subtree
    ///
    /// The inserted subtree is re-seated at the depth of the position it
    /// fills. Returns `None` (and drops nothing) if the path does not exist.
    pub fn replace_subtree(&mut self, path: &[usize], mut new_subtree: Self) -> Option<Self> {
        let target = self.get_subtree_mut(path)?;
        new_subtree.reset_depth(target.depth());
        Some(std::mem::replace(target, new_subtree))
    }

    /// Recompute cached depths of this subtree, placing `self` at `depth`
    pub fn reset_depth(&mut self, depth: usize) {
        match self {
            Self::Terminal { depth: d, .. } => *d = depth,
            Self::Function {
                children, depth: d, ..
            } => {
                *d = depth;
                for child in children {
                    child.reset_depth(depth + 1);
                }
            }
        }
    }

    /// Evaluate this subtree under the given variable bindings
    pub fn evaluate<B: Bindings + ?Sized>(&self, bindings: &B) -> Result<f64, EvaluationError> {
        match self {
            Self::Terminal { terminal, .. } => match terminal {
                Terminal::Constant(c) => Ok(*c),
                Terminal::Variable(name) => bindings
                    .value(name)
                    .ok_or_else(|| EvaluationError::UnboundVariable(name.clone())),
            },
            Self::Function { op, children, .. } => match children.as_slice() {
                [x] => op.apply(&[x.evaluate(bindings)?]),
                [a, b] => op.apply(&[a.evaluate(bindings)?, b.evaluate(bindings)?]),
                _ => {
                    let args = children
                        .iter()
                        .map(|c| c.evaluate(bindings))
                        .collect::<Result<Vec<_>, _>>()?;
                    op.apply(&args)
                }
            },
        }
    }

    /// Verify arity and cached depths, assuming `self` sits at `depth`
    pub fn check_invariants(&self, depth: usize) -> Result<(), InvariantViolation> {
        self.check_at(&mut Vec::new(), depth)
    }

    fn check_at(&self, path: &mut Vec<usize>, depth: usize) -> Result<(), InvariantViolation> {
        if self.depth() != depth {
            return Err(InvariantViolation::DepthMismatch {
                path: path.clone(),
                cached: self.depth(),
                actual: depth,
            });
        }
        if let Self::Function { op, children, .. } = self {
            if children.len() != op.arity() {
                return Err(InvariantViolation::ArityMismatch {
                    path: path.clone(),
                    symbol: op.to_string(),
                    expected: op.arity(),
                    actual: children.len(),
                });
            }
            for (i, child) in children.iter().enumerate() {
                path.push(i);
                child.check_at(path, depth + 1)?;
                path.pop();
            }
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal { terminal, .. } => write!(f, "{}", terminal),
            Self::Function { op, children, .. } => match (op, children.as_slice()) {
                (Operator::Binary(bin), [a, b]) => write!(f, "({} {} {})", a, bin, b),
                (Operator::Unary(un), [x]) => write!(f, "{}({})", un, x),
                _ => {
                    write!(f, "{}(", op)?;
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", child)?;
                    }
                    f.write_str(")")
                }
            },
        }
    }
}
