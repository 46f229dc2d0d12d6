//! Crossover operators
//!
//! Subtree crossover grafts a subtree of one parent into a copy of the other,
//! never letting the offspring outgrow the receiving parent's depth bound.
//! Leaf crossover swaps a single leaf and is the fallback when neither parent
//! has an internal node.

use rand::Rng;

use crate::error::{FallbackInfo, OperatorError, OperatorResult};
use crate::genome::node::NodeSite;
use crate::genome::tree::ExpressionTree;
use crate::operators::traits::CrossoverOperator;

/// Subtree-swap crossover
///
/// A crossover point is picked in each parent. When a parent offers both
/// internal nodes and leaves, an internal node is picked with probability
/// `internal_bias`. The donor point is restricted to subtrees that fit in the
/// depth budget left below the receiving point.
#[derive(Clone, Debug)]
pub struct SubtreeCrossover {
    /// Probability of crossing at an internal node rather than a leaf
    pub internal_bias: f64,
}

impl SubtreeCrossover {
    /// Create a subtree crossover with the given internal-node bias
    pub fn new(internal_bias: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&internal_bias),
            "Internal bias must be in [0, 1]"
        );
        Self { internal_bias }
    }
}

impl Default for SubtreeCrossover {
    fn default() -> Self {
        Self::new(0.9)
    }
}

impl CrossoverOperator for SubtreeCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &ExpressionTree,
        parent2: &ExpressionTree,
        rng: &mut R,
    ) -> OperatorResult<ExpressionTree> {
        // A single-leaf receiver has nothing to graft into; let the other
        // parent receive instead.
        let (receiver, donor) = if parent1.is_leaf() && !parent2.is_leaf() {
            (parent2, parent1)
        } else {
            (parent1, parent2)
        };

        if receiver.is_leaf() && donor.is_leaf() {
            return match LeafCrossover.crossover(receiver, donor, rng) {
                OperatorResult::Success(child) => OperatorResult::Fallback(
                    child,
                    FallbackInfo {
                        reason: "neither parent has an internal node".to_string(),
                        method: "leaf_crossover",
                    },
                ),
                other => other,
            };
        }

        let receiver_sites = receiver.sites();
        let Some(site) = pick_biased(&receiver_sites, self.internal_bias, rng) else {
            return OperatorResult::Failed(OperatorError::NotApplicable(
                "receiver has no nodes".to_string(),
            ));
        };

        let budget = receiver.max_depth().saturating_sub(site.depth);
        let donor_sites: Vec<NodeSite> = donor
            .sites()
            .into_iter()
            .filter(|s| s.height <= budget)
            .collect();
        let Some(graft) = pick_biased(&donor_sites, self.internal_bias, rng) else {
            return OperatorResult::Failed(OperatorError::NotApplicable(
                "no donor subtree fits the depth budget".to_string(),
            ));
        };

        let Some(subtree) = donor.root().get_subtree(&graft.path) else {
            return OperatorResult::Failed(OperatorError::NotApplicable(
                "donor site vanished".to_string(),
            ));
        };

        let mut child = receiver.clone();
        child.invalidate_fitness();
        child.replace_subtree(&site.path, subtree.clone());
        OperatorResult::Success(child)
    }
}

/// Leaf-only crossover
///
/// Copies the first parent and overwrites one of its leaves with a copy of a
/// random leaf from the second parent. Shape and depth are unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeafCrossover;

impl CrossoverOperator for LeafCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &ExpressionTree,
        parent2: &ExpressionTree,
        rng: &mut R,
    ) -> OperatorResult<ExpressionTree> {
        let targets = parent1.root().terminal_positions();
        let sources = parent2.root().terminal_positions();
        if targets.is_empty() || sources.is_empty() {
            return OperatorResult::Failed(OperatorError::NotApplicable(
                "parent without leaves".to_string(),
            ));
        }

        let target = &targets[rng.gen_range(0..targets.len())];
        let source = &sources[rng.gen_range(0..sources.len())];
        let Some(leaf) = parent2.root().get_subtree(source) else {
            return OperatorResult::Failed(OperatorError::NotApplicable(
                "donor leaf vanished".to_string(),
            ));
        };

        let mut child = parent1.clone();
        child.invalidate_fitness();
        child.replace_subtree(target, leaf.clone());
        OperatorResult::Success(child)
    }
}

/// Pick uniformly among internal sites with probability `bias`, otherwise
/// among leaves, when both kinds are present.
fn pick_biased<'a, R: Rng>(sites: &'a [NodeSite], bias: f64, rng: &mut R) -> Option<&'a NodeSite> {
    let (internal, leaves): (Vec<&NodeSite>, Vec<&NodeSite>) =
        sites.iter().partition(|s| s.is_function);
    let pool = match (internal.is_empty(), leaves.is_empty()) {
        (true, true) => return None,
        (false, true) => internal,
        (true, false) => leaves,
        (false, false) => {
            if rng.gen_bool(bias) {
                internal
            } else {
                leaves
            }
        }
    };
    Some(pool[rng.gen_range(0..pool.len())])
}
