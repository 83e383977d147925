//! Node expansion.
//!
//! Materializes the children of a node the first time a rollout reaches it.
//! The explorer must already have the relevant state current: the node's own
//! state for a decision node, the parent's state for a chance node.

use crate::mcts::node::{NodeId, SearchNode};
use crate::mcts::tree::SearchTree;
use crate::model::explorer::ModelExplorer;
use crate::Result;

/// Expands an unexpanded node
///
/// - Decision node: one chance child per available decision, in model order
/// - Chance node: one decision child per outcome of its action, carrying the
///   outcome probability and successor state
///
/// Calling this on an already expanded node leaves the tree untouched.
pub fn expand_node<E: ModelExplorer>(
    tree: &mut SearchTree<E::State>,
    id: NodeId,
    explorer: &E,
) -> Result<()> {
    let node = tree.node(id);
    debug_assert!(!node.expanded, "expand_node called on expanded node {}", id);
    if node.expanded {
        return Ok(());
    }

    // A failing query must leave the node unexpanded and childless.
    let children = match node.action_index() {
        None => {
            let nc = explorer.num_decisions()?;
            (0..nc)
                .map(|i| Ok(SearchNode::new_chance(i, explorer.decision_label(i)?, id)))
                .collect::<Result<Vec<_>>>()?
        }
        Some(action_index) => {
            let nt = explorer.num_outcomes(action_index)?;
            (0..nt)
                .map(|j| {
                    let prob = explorer.outcome_probability(action_index, j)?;
                    let succ = explorer.outcome_target(action_index, j)?;
                    Ok(SearchNode::new_decision(succ, Some(prob), Some(id)))
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    for child in children {
        tree.push_child(id, child);
    }
    tree.node_mut(id).expanded = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::explicit::{ExplicitChoice, ExplicitMdp, ExplicitState};
    use crate::UctError;
    use assert_matches::assert_matches;

    fn two_action_mdp() -> ExplicitMdp {
        ExplicitMdp::new(
            vec![
                ExplicitState::new(vec![
                    ExplicitChoice::new("left", vec![(1.0, 1)]),
                    ExplicitChoice::new("right", vec![(0.3, 1), (0.7, 2)]),
                ]),
                ExplicitState::deadlock(),
                ExplicitState::deadlock(),
            ],
            vec![0],
        )
    }

    #[test]
    fn test_expand_decision_node() {
        let mut mdp = two_action_mdp();
        let mut tree = SearchTree::new(0usize);
        let root = tree.root_id();
        mdp.explore_state(&0).unwrap();

        expand_node(&mut tree, root, &mdp).unwrap();

        assert!(tree.root().expanded);
        let children = tree.children(root).to_vec();
        assert_eq!(children.len(), 2);
        for (i, &c) in children.iter().enumerate() {
            let child = tree.node(c);
            assert!(child.is_chance());
            assert_eq!(child.action_index(), Some(i));
            assert_eq!(child.reach_probability, None);
            assert!(!child.expanded);
        }
        assert_eq!(tree.node(children[1]).action_label(), Some("right"));
    }

    #[test]
    fn test_expand_chance_node() {
        let mut mdp = two_action_mdp();
        let mut tree = SearchTree::new(0usize);
        let root = tree.root_id();
        mdp.explore_state(&0).unwrap();
        expand_node(&mut tree, root, &mdp).unwrap();

        let right = tree.children(root)[1];
        expand_node(&mut tree, right, &mdp).unwrap();

        let outcomes = tree.children(right).to_vec();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(tree.node(outcomes[0]).state(), Some(&1));
        assert_eq!(tree.node(outcomes[0]).reach_probability, Some(0.3));
        assert_eq!(tree.node(outcomes[1]).state(), Some(&2));
        assert_eq!(tree.node(outcomes[1]).reach_probability, Some(0.7));
        assert!(tree.node(outcomes[1]).is_decision());
    }

    #[test]
    fn test_expand_deadlock_has_no_children() {
        let mut mdp = two_action_mdp();
        let mut tree = SearchTree::new(1usize);
        let root = tree.root_id();
        mdp.explore_state(&1).unwrap();

        expand_node(&mut tree, root, &mdp).unwrap();

        assert!(tree.root().expanded);
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn test_expand_propagates_exploration_failure() {
        let mdp = two_action_mdp();
        let mut tree = SearchTree::new(0usize);
        let root = tree.root_id();

        // nothing explored yet
        let res = expand_node(&mut tree, root, &mdp);

        assert_matches!(res, Err(UctError::Exploration(_)));
        assert!(!tree.root().expanded);
    }
}
