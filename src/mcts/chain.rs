//! Markov chain induced by the searched policy.
//!
//! Fixing the best action at every materialized decision node leaves only the
//! probabilistic outcomes, i.e. a discrete-time Markov chain. The chain is an
//! unrolling of the tree: states reached along different paths are not
//! merged, so it is tree-shaped and no deeper than the search horizon.

use crate::mcts::node::NodeId;
use crate::mcts::policy::best_child;
use crate::mcts::tree::SearchTree;
use crate::model::reward::RewardEvaluator;
use crate::{Result, UctError};
use serde::Serialize;
use std::collections::VecDeque;
use std::io::Write;

/// A chain state and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainState<S> {
    pub state: S,
    /// Decision node this chain state unrolls
    pub tree_node: NodeId,
    /// Fixed policy action, `None` for absorbing states
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InducedChain<S> {
    pub states: Vec<ChainState<S>>,
    /// Sparse rows: `transitions[i]` lists `(target, probability)`
    pub transitions: Vec<Vec<(usize, f64)>>,
    pub initial: usize,
}

impl<S: Clone> InducedChain<S> {
    /// Builds the chain by breadth-first traversal from the root
    ///
    /// A decision node without a visited chance child (deadlock, horizon
    /// leaf or never reached) becomes an absorbing state.
    pub fn from_tree(tree: &SearchTree<S>) -> Result<Self> {
        let root = tree.root_id();
        let root_state = tree
            .root()
            .state()
            .cloned()
            .ok_or_else(|| UctError::Exploration("tree root is not a decision node".to_string()))?;

        let mut chain = InducedChain {
            states: vec![ChainState {
                state: root_state,
                tree_node: root,
                action: None,
            }],
            transitions: vec![Vec::new()],
            initial: 0,
        };

        let mut queue = VecDeque::from([(root, 0usize)]);
        while let Some((node_id, index)) = queue.pop_front() {
            let Some(chance_id) = best_child(tree, node_id) else {
                continue;
            };
            chain.states[index].action = tree.node(chance_id).action_label().map(str::to_string);

            for &outcome_id in tree.children(chance_id) {
                let outcome = tree.node(outcome_id);
                let Some(state) = outcome.state() else {
                    continue;
                };
                let target = chain.states.len();
                chain.states.push(ChainState {
                    state: state.clone(),
                    tree_node: outcome_id,
                    action: None,
                });
                chain.transitions.push(Vec::new());
                chain.transitions[index].push((target, outcome.reach_probability.unwrap_or(0.0)));
                queue.push_back((outcome_id, target));
            }
        }

        log::debug!(
            "Induced chain: {} states, {} transitions",
            chain.num_states(),
            chain.num_transitions()
        );
        Ok(chain)
    }
}

impl<S> InducedChain<S> {
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }

    pub fn successors(&self, index: usize) -> &[(usize, f64)] {
        &self.transitions[index]
    }

    pub fn is_absorbing(&self, index: usize) -> bool {
        self.transitions[index].is_empty()
    }

    /// Longest path from the initial state, in transitions
    pub fn depth(&self) -> usize {
        let mut depth = vec![0usize; self.states.len()];
        let mut deepest = 0;
        for (source, row) in self.transitions.iter().enumerate() {
            for &(target, _) in row {
                depth[target] = depth[source] + 1;
                deepest = deepest.max(depth[target]);
            }
        }
        deepest
    }

    /// Checks that every non-absorbing row sums to 1 within `tolerance`
    pub fn check_stochastic(&self, tolerance: f64) -> Result<()> {
        for (index, row) in self.transitions.iter().enumerate() {
            if row.is_empty() {
                continue;
            }
            let sum: f64 = row.iter().map(|&(_, p)| p).sum();
            if (sum - 1.0).abs() > tolerance {
                return Err(UctError::MalformedDistribution {
                    node: self.states[index].tree_node.index(),
                    sum,
                });
            }
        }
        Ok(())
    }

    /// Expected cumulative reward from the initial state under the fixed policy
    ///
    /// Each non-absorbing state earns the reward of its policy action, then
    /// moves on. Targets always have a larger index than their source, so a
    /// single backward pass is exact.
    pub fn expected_total_reward<R: RewardEvaluator<S>>(&self, rewards: &R) -> Result<f64> {
        let mut value = vec![0.0; self.states.len()];
        for index in (0..self.states.len()).rev() {
            let row = &self.transitions[index];
            let Some(action) = self.states[index].action.as_deref() else {
                continue;
            };
            if row.is_empty() {
                continue;
            }
            let immediate = rewards.reward(&self.states[index].state, action)?;
            value[index] = immediate + row.iter().map(|&(t, p)| p * value[t]).sum::<f64>();
        }
        Ok(value[self.initial])
    }

    /// Writes the chain in explicit transition format: a `states transitions`
    /// header line, then one `source target probability` line per transition
    pub fn export_tra<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);
        wtr.write_record([self.num_states().to_string(), self.num_transitions().to_string()])?;
        for (source, row) in self.transitions.iter().enumerate() {
            for &(target, p) in row {
                wtr.write_record([source.to_string(), target.to_string(), p.to_string()])?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

impl<S: Serialize> InducedChain<S> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
