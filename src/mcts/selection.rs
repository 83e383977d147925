//! UCT selection at decision nodes
//!
//! Chance children of a decision node are scored with UCB1:
//!
//! `bias × sqrt(ln(N_parent) / N_child) + mean`
//!
//! An unvisited child scores +infinity and is returned immediately, so every
//! action is tried once before any action is tried twice.

use crate::mcts::node::NodeId;
use crate::mcts::tree::SearchTree;

/// Selects the chance child of decision node `id` to descend into
///
/// # Arguments
/// * `tree` - The search tree
/// * `id` - An expanded decision node
/// * `bias` - Exploration constant
///
/// # Returns
/// The first unvisited child if any, otherwise the child with the highest
/// UCB1 score (ties go to the first one in child order). `None` if the node
/// has no children, i.e. the state is a deadlock.
pub fn select_uct_child<S>(tree: &SearchTree<S>, id: NodeId, bias: f64) -> Option<NodeId> {
    let node = tree.node(id);
    debug_assert!(node.is_decision(), "UCT selection on chance node {}", id);

    let parent_visits = node.visit_count;
    let mut best: Option<(NodeId, f64)> = None;

    for &child_id in &node.children {
        let score = tree.node(child_id).uct_score(parent_visits, bias);
        if score == f64::INFINITY {
            return Some(child_id);
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            // a NaN score never displaces the first candidate
            Some(_) if score.is_nan() => {}
            _ => best = Some((child_id, score)),
        }
    }

    best.map(|(child_id, _)| child_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcts::node::SearchNode;

    fn decision_with_children(stats: &[(usize, f64)], parent_visits: usize) -> SearchTree<u32> {
        let mut tree = SearchTree::new(0u32);
        let root = tree.root_id();
        for (i, &(visits, mean)) in stats.iter().enumerate() {
            let mut child = SearchNode::new_chance(i, format!("a{}", i), root);
            child.visit_count = visits;
            child.mean_return = mean;
            tree.push_child(root, child);
        }
        tree.node_mut(root).visit_count = parent_visits;
        tree.node_mut(root).expanded = true;
        tree
    }

    #[test]
    fn test_select_empty_is_none() {
        let tree = decision_with_children(&[], 1);
        assert_eq!(select_uct_child(&tree, tree.root_id(), 1.0), None);
    }

    #[test]
    fn test_zero_visit_child_short_circuits() {
        // visited child has a huge mean, the unvisited one must still win
        let tree = decision_with_children(&[(3, 1.0e9), (0, -5.0)], 4);
        let root = tree.root_id();
        assert_eq!(select_uct_child(&tree, root, 1.0), Some(tree.children(root)[1]));
        assert_eq!(select_uct_child(&tree, root, 0.0), Some(tree.children(root)[1]));
    }

    #[test]
    fn test_first_unvisited_in_order() {
        let tree = decision_with_children(&[(0, 0.0), (0, 0.0), (0, 0.0)], 1);
        let root = tree.root_id();
        assert_eq!(select_uct_child(&tree, root, 1.0), Some(tree.children(root)[0]));
    }

    #[test]
    fn test_exploration_favours_less_visited() {
        // same mean, fewer visits → larger bonus
        let tree = decision_with_children(&[(8, 5.0), (2, 5.0)], 10);
        let root = tree.root_id();
        assert_eq!(select_uct_child(&tree, root, 1.4), Some(tree.children(root)[1]));
    }

    #[test]
    fn test_zero_bias_is_greedy() {
        let tree = decision_with_children(&[(2, 5.0), (8, 6.0), (5, 1.0)], 15);
        let root = tree.root_id();
        assert_eq!(select_uct_child(&tree, root, 0.0), Some(tree.children(root)[1]));
    }

    #[test]
    fn test_ties_go_to_first() {
        let tree = decision_with_children(&[(4, 2.0), (4, 2.0)], 8);
        let root = tree.root_id();
        assert_eq!(select_uct_child(&tree, root, 1.0), Some(tree.children(root)[0]));
    }

    #[test]
    fn test_negative_scores_are_selectable() {
        let tree = decision_with_children(&[(3, -10.0), (3, -2.0)], 6);
        let root = tree.root_id();
        assert_eq!(select_uct_child(&tree, root, 0.5), Some(tree.children(root)[1]));
    }
}
