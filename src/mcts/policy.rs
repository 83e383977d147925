//! Greedy policy extraction from a finished tree.
//!
//! Read-only: nothing here simulates or updates statistics. Only visited
//! children are candidates, since the mean of an unvisited node carries no
//! information.

use crate::mcts::node::NodeId;
use crate::mcts::tree::SearchTree;

/// Visited child of `id` with the highest mean return, ties to the first
pub fn best_child<S>(tree: &SearchTree<S>, id: NodeId) -> Option<NodeId> {
    let mut best: Option<(NodeId, f64)> = None;
    for &child_id in tree.children(id) {
        let Some(mean) = tree.node(child_id).mean() else {
            continue;
        };
        match best {
            Some((_, best_mean)) if mean <= best_mean => {}
            _ => best = Some((child_id, mean)),
        }
    }
    best.map(|(child_id, _)| child_id)
}

/// One node on the greedy walk
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyStep<S> {
    pub node: NodeId,
    /// Set on decision nodes
    pub state: Option<S>,
    /// Set on chance nodes
    pub action: Option<String>,
    pub mean: f64,
    pub visits: usize,
}

/// Greedy walk from a node to the last node with a visited child
#[derive(Debug, Clone, PartialEq)]
pub struct BestPolicy<S> {
    pub steps: Vec<GreedyStep<S>>,
    pub leaf: NodeId,
}

impl<S> BestPolicy<S> {
    /// Action labels along the walk, in order
    pub fn best_actions(&self) -> Vec<&str> {
        self.steps.iter().filter_map(|s| s.action.as_deref()).collect()
    }

    /// Decision states along the walk, in order
    pub fn best_states(&self) -> Vec<&S> {
        self.steps.iter().filter_map(|s| s.state.as_ref()).collect()
    }
}

/// Follows the highest-mean visited child from `from` at both decision and
/// chance levels until no visited child remains
pub fn best_policy<S: Clone>(tree: &SearchTree<S>, from: NodeId) -> BestPolicy<S> {
    let mut steps = Vec::new();
    let mut current = from;

    loop {
        let node = tree.node(current);
        steps.push(GreedyStep {
            node: current,
            state: node.state().cloned(),
            action: node.action_label().map(str::to_string),
            mean: node.mean_return,
            visits: node.visit_count,
        });
        if let Some(label) = node.action_label() {
            log::debug!(
                "Best action at depth {}: {} (mean {:.4}, {} visits)",
                tree.time_depth(current),
                label,
                node.mean_return,
                node.visit_count
            );
        }

        match best_child(tree, current) {
            Some(next) => current = next,
            None => break,
        }
    }

    BestPolicy {
        steps,
        leaf: current,
    }
}
