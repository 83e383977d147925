//! Outcome sampling at chance nodes.
//!
//! A chance node's children carry the probabilities of the outcomes of its
//! action. Sampling walks them in order, accumulating probability, and stops
//! at the first child whose running sum reaches a uniform draw.

use crate::mcts::node::NodeId;
use crate::mcts::tree::SearchTree;
use crate::{Result, UctError};
use rand::prelude::*;
use rand::rngs::StdRng;

/// Source of uniform draws in `[0, 1)`
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl UniformSource for StdRng {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Replays a fixed stream of draws, cycling when exhausted
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSource {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    /// # Errors
    /// `InvalidConfig` if `values` is empty.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(UctError::InvalidConfig(
                "sequence source needs at least one value".to_string(),
            ));
        }
        Ok(Self { values, cursor: 0 })
    }

    /// Number of draws taken so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f64 {
        let u = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        u
    }
}

/// Draws one decision child of chance node `id`
///
/// # Arguments
/// * `tree` - The search tree
/// * `id` - An expanded chance node
/// * `source` - Uniform draws
/// * `tolerance` - Allowed deviation of the outcome probabilities' sum from 1
///
/// # Errors
/// `MalformedDistribution` if the node has no outcomes, an outcome
/// probability is negative or not a number, or the probabilities do not sum
/// to 1 within `tolerance`.
pub fn sample_outcome<S, U: UniformSource + ?Sized>(
    tree: &SearchTree<S>,
    id: NodeId,
    source: &mut U,
    tolerance: f64,
) -> Result<NodeId> {
    let children = tree.children(id);
    let probability = |c: NodeId| tree.node(c).reach_probability.unwrap_or(0.0);

    let sum: f64 = children.iter().map(|&c| probability(c)).sum();
    let has_invalid = children
        .iter()
        .any(|&c| !(probability(c) >= 0.0));
    if children.is_empty() || has_invalid || (sum - 1.0).abs() > tolerance {
        return Err(UctError::MalformedDistribution {
            node: id.index(),
            sum,
        });
    }

    let u = source.next_uniform();
    let mut running = 0.0;
    for &child in children {
        running += probability(child);
        if running >= u {
            return Ok(child);
        }
    }

    let last = children[children.len() - 1];
    log::warn!(
        "Outcome sampling at node {} fell through (draw {}, sum {}); using last outcome",
        id,
        u,
        running
    );
    Ok(last)
}
