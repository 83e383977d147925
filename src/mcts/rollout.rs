//! Rollout engine.
//!
//! A rollout descends from a start node to the horizon, alternating UCT
//! selection at decision nodes and outcome sampling at chance nodes, then
//! unwinds the path folding the reward-to-go into each node's running mean.
//!
//! The descent is an explicit loop rather than native recursion so that the
//! horizon is not bounded by the call stack. Each chance step consumes one
//! unit of depth; a decision step consumes none.

use crate::mcts::expansion::expand_node;
use crate::mcts::node::NodeId;
use crate::mcts::sampling::{sample_outcome, UniformSource};
use crate::mcts::selection::select_uct_child;
use crate::mcts::tree::SearchTree;
use crate::model::explorer::ModelExplorer;
use crate::model::reward::RewardEvaluator;
use crate::{Result, UctError};

/// Result of a single rollout
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutOutcome {
    /// Total return observed from the start node
    pub total_return: f64,
    /// Visited nodes in descent order, each with the return folded into it
    pub path: Vec<(NodeId, f64)>,
    /// Chance steps simulated (less than the depth when a deadlock was hit)
    pub steps: usize,
}

impl RolloutOutcome {
    fn empty() -> Self {
        Self {
            total_return: 0.0,
            path: Vec::new(),
            steps: 0,
        }
    }
}

/// One rollout's worth of borrowed capabilities
pub struct Rollout<'a, E, R, U: ?Sized> {
    explorer: &'a mut E,
    rewards: &'a R,
    source: &'a mut U,
    probability_tolerance: f64,
}

impl<'a, E, R, U> Rollout<'a, E, R, U>
where
    E: ModelExplorer,
    R: RewardEvaluator<E::State>,
    U: UniformSource + ?Sized,
{
    pub fn new(
        explorer: &'a mut E,
        rewards: &'a R,
        source: &'a mut U,
        probability_tolerance: f64,
    ) -> Self {
        Self {
            explorer,
            rewards,
            source,
            probability_tolerance,
        }
    }

    /// Runs one rollout from `start` with `depth` remaining time steps
    ///
    /// # Arguments
    /// * `tree` - The search tree, grown in place
    /// * `start` - Node to start from (decision or chance)
    /// * `depth` - Remaining horizon; 0 returns 0 without touching the tree
    /// * `bias` - UCT exploration constant for this rollout
    ///
    /// # Errors
    /// Exploration, reward and sampling failures are propagated. The visits
    /// recorded by the failed rollout are taken back, so the statistics keep
    /// counting completed rollouts only. Children expanded on the way stay.
    pub fn run(
        &mut self,
        tree: &mut SearchTree<E::State>,
        start: NodeId,
        depth: usize,
        bias: f64,
    ) -> Result<RolloutOutcome> {
        if depth == 0 {
            return Ok(RolloutOutcome::empty());
        }

        let mut descent: Vec<(NodeId, f64)> = Vec::new();
        let remaining = match self.descend(tree, start, depth, bias, &mut descent) {
            Ok(remaining) => remaining,
            Err(err) => {
                for &(id, _) in &descent {
                    tree.node_mut(id).visit_count -= 1;
                }
                return Err(err);
            }
        };

        // unwind: each node receives the sum of immediate rewards at and below it
        let mut total_return = 0.0;
        let mut path = Vec::with_capacity(descent.len());
        for &(id, immediate) in descent.iter().rev() {
            total_return += immediate;
            tree.node_mut(id).update_mean(total_return);
            path.push((id, total_return));
        }
        path.reverse();

        Ok(RolloutOutcome {
            total_return,
            path,
            steps: depth - remaining,
        })
    }

    /// Walks down from `start`, recording every visited node in `descent`
    /// together with its immediate reward. Returns the unused depth.
    fn descend(
        &mut self,
        tree: &mut SearchTree<E::State>,
        start: NodeId,
        depth: usize,
        bias: f64,
        descent: &mut Vec<(NodeId, f64)>,
    ) -> Result<usize> {
        // a chance node queries the state its action was taken from
        if tree.node(start).is_chance() {
            let state = tree
                .decision_state(start)
                .ok_or_else(|| UctError::Exploration(format!("chance node {} has no parent", start)))?;
            self.explorer.explore_state(state)?;
        }

        let mut current = start;
        let mut remaining = depth;

        while remaining > 0 {
            if let Some(state) = tree.node(current).state() {
                self.explorer.explore_state(state)?;
            }
            if !tree.node(current).expanded {
                expand_node(tree, current, &*self.explorer)?;
            }
            tree.node_mut(current).record_visit();
            descent.push((current, 0.0));

            let next = if tree.node(current).is_decision() {
                select_uct_child(tree, current, bias)
            } else {
                let reward = self.immediate_reward(tree, current)?;
                let outcome = sample_outcome(
                    tree,
                    current,
                    &mut *self.source,
                    self.probability_tolerance,
                )?;
                if let Some(entry) = descent.last_mut() {
                    entry.1 = reward;
                }
                remaining -= 1;
                Some(outcome)
            };

            match next {
                Some(child) => current = child,
                None => {
                    log::trace!("Deadlock at node {}, rollout cut short", current);
                    break;
                }
            }
        }

        Ok(remaining)
    }

    /// Reward for taking the action of chance node `id` in its parent's state
    fn immediate_reward(&self, tree: &SearchTree<E::State>, id: NodeId) -> Result<f64> {
        let node = tree.node(id);
        let label = node.action_label().unwrap_or_default();
        let state = tree
            .decision_state(id)
            .ok_or_else(|| UctError::Exploration(format!("chance node {} has no parent", id)))?;
        self.rewards.reward(state, label)
    }
}
