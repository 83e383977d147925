//! Arena-backed UCT tree.
//!
//! Nodes live in a single vector and refer to each other by [`NodeId`].
//! The tree only grows: nodes are appended on expansion and never removed,
//! and identical states reached along different paths stay distinct nodes.

use crate::mcts::node::{NodeId, NodeKind, SearchNode};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchTree<S> {
    /// All nodes in the tree (arena allocation, root at index 0)
    nodes: Vec<SearchNode<S>>,
}

impl<S> SearchTree<S> {
    /// Create a new tree whose root is a decision node for `root_state`
    pub fn new(root_state: S) -> Self {
        SearchTree {
            nodes: vec![SearchNode::new_decision(root_state, None, None)],
        }
    }

    #[inline]
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn root(&self) -> &SearchNode<S> {
        &self.nodes[0]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SearchNode<S> {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut SearchNode<S> {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Appends `child` under `parent` and returns its id
    pub fn push_child(&mut self, parent: NodeId, mut child: SearchNode<S>) -> NodeId {
        let id = NodeId(self.nodes.len());
        child.parent = Some(parent);
        self.nodes.push(child);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// State the action of chance node `id` was taken from
    pub fn decision_state(&self, id: NodeId) -> Option<&S> {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Decision { state } => Some(state),
            NodeKind::Chance { .. } => node.parent.and_then(|p| self.node(p).state()),
        }
    }

    /// Iterates over `(id, node)` pairs in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode<S>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn decision_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_decision()).count()
    }

    pub fn chance_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_chance()).count()
    }

    /// Number of chance steps between the root and `id`
    pub fn time_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent;
        while let Some(p) = current {
            let node = self.node(p);
            if node.is_chance() {
                depth += 1;
            }
            current = node.parent;
        }
        depth
    }
}
