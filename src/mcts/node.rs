//! UCT search node structures
//!
//! This module implements a two-level tree structure:
//! - Decision Nodes: "we are at state S and must pick an action"
//! - Chance Nodes: "action A has been picked and its outcome is pending"
//!
//! Chance nodes carry no state of their own. The state an action was taken
//! from is always read from the parent decision node.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Index of a node in its [`SearchTree`](crate::mcts::tree::SearchTree) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type of node in the UCT tree
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<S> {
    /// Decision node: a state whose action is still to be chosen
    Decision { state: S },
    /// Chance node: a chosen action whose outcome is still to be resolved
    Chance { action_index: usize, action_label: String },
}

/// A node in the UCT tree
#[derive(Debug, Clone, PartialEq)]
pub struct SearchNode<S> {
    /// Decision or chance, with the matching identity
    pub kind: NodeKind<S>,

    /// Probability of the outcome that produced this node.
    /// Only set on decision children of a chance node.
    pub reach_probability: Option<f64>,

    /// Number of rollouts that passed through this node
    pub visit_count: usize,

    /// Whether the children have been materialized
    pub expanded: bool,

    /// Running mean of the reward-to-go observed through this node
    pub mean_return: f64,

    /// Parent node (None for the root)
    pub parent: Option<NodeId>,

    /// Children in model order; empty until expansion
    pub children: Vec<NodeId>,
}

impl<S> SearchNode<S> {
    /// Creates a new Decision Node
    ///
    /// # Arguments
    /// * `state` - Process state represented by the node
    /// * `reach_probability` - Outcome probability, `None` for the root
    /// * `parent` - Chance node this outcome belongs to, `None` for the root
    pub fn new_decision(state: S, reach_probability: Option<f64>, parent: Option<NodeId>) -> Self {
        Self::with_kind(NodeKind::Decision { state }, reach_probability, parent)
    }

    /// Creates a new Chance Node for decision `action_index` of `parent`
    pub fn new_chance(action_index: usize, action_label: String, parent: NodeId) -> Self {
        Self::with_kind(
            NodeKind::Chance {
                action_index,
                action_label,
            },
            None,
            Some(parent),
        )
    }

    fn with_kind(kind: NodeKind<S>, reach_probability: Option<f64>, parent: Option<NodeId>) -> Self {
        SearchNode {
            kind,
            reach_probability,
            visit_count: 0,
            expanded: false,
            mean_return: 0.0,
            parent,
            children: Vec::new(),
        }
    }

    pub fn is_decision(&self) -> bool {
        matches!(self.kind, NodeKind::Decision { .. })
    }

    pub fn is_chance(&self) -> bool {
        matches!(self.kind, NodeKind::Chance { .. })
    }

    /// State of a decision node
    pub fn state(&self) -> Option<&S> {
        match &self.kind {
            NodeKind::Decision { state } => Some(state),
            NodeKind::Chance { .. } => None,
        }
    }

    /// Decision index of a chance node
    pub fn action_index(&self) -> Option<usize> {
        match &self.kind {
            NodeKind::Chance { action_index, .. } => Some(*action_index),
            NodeKind::Decision { .. } => None,
        }
    }

    /// Action label of a chance node
    pub fn action_label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Chance { action_label, .. } => Some(action_label),
            NodeKind::Decision { .. } => None,
        }
    }

    /// Checks if this node is a leaf (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Mean return, or `None` while the node is unvisited
    pub fn mean(&self) -> Option<f64> {
        (self.visit_count > 0).then_some(self.mean_return)
    }

    /// Counts one more rollout through this node
    pub fn record_visit(&mut self) {
        self.visit_count += 1;
    }

    /// Folds `total_return` into the running mean.
    ///
    /// Must be called after [`record_visit`](Self::record_visit) for the
    /// same rollout: the update divides by the post-increment visit count.
    pub fn update_mean(&mut self, total_return: f64) {
        debug_assert!(self.visit_count > 0, "update_mean before record_visit");
        let n = self.visit_count as f64;
        self.mean_return = ((n - 1.0) * self.mean_return + total_return) / n;
    }

    /// UCB1 score of this node as a child of a node visited `parent_visits` times
    ///
    /// Formula: bias × sqrt(ln(N_parent) / N_child) + mean
    ///
    /// Unvisited nodes score +infinity so that every action is tried once
    /// before any is revisited.
    pub fn uct_score(&self, parent_visits: usize, bias: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let exploration = ((parent_visits as f64).ln() / self.visit_count as f64).sqrt();
        bias * exploration + self.mean_return
    }

    /// Gets statistics about this node for debugging
    pub fn stats(&self) -> HashMap<String, String> {
        let mut stats = HashMap::new();

        stats.insert(
            "type".to_string(),
            match &self.kind {
                NodeKind::Decision { .. } => "Decision".to_string(),
                NodeKind::Chance { .. } => "Chance".to_string(),
            },
        );
        stats.insert("visits".to_string(), self.visit_count.to_string());
        stats.insert("mean_return".to_string(), format!("{:.3}", self.mean_return));
        stats.insert("children".to_string(), self.children.len().to_string());

        if let NodeKind::Chance { action_label, .. } = &self.kind {
            stats.insert("action".to_string(), action_label.clone());
        }
        if let Some(p) = self.reach_probability {
            stats.insert("reach_probability".to_string(), format!("{:.4}", p));
        }

        stats
    }
}
