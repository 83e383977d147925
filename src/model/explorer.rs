//! Model exploration capability.
//!
//! The search engine never enumerates a model on its own: it makes a state
//! current with [`ModelExplorer::explore_state`] and then asks about the
//! decisions and probabilistic outcomes available there.

use crate::Result;

/// Narrow view of a Markov decision process used by the search.
///
/// All decision and outcome queries apply to the state passed to the most
/// recent call of [`explore_state`](ModelExplorer::explore_state).
pub trait ModelExplorer {
    /// Process state representation
    type State: Clone;

    /// Returns true if the process has exactly one initial state
    fn has_single_initial_state(&self) -> Result<bool>;

    /// Returns the initial state (only meaningful when it is unique)
    fn initial_state(&self) -> Result<Self::State>;

    /// Makes `state` the target of subsequent queries
    fn explore_state(&mut self, state: &Self::State) -> Result<()>;

    /// Number of decisions available in the current state
    fn num_decisions(&self) -> Result<usize>;

    /// Human-readable action label of decision `decision`
    fn decision_label(&self, decision: usize) -> Result<String>;

    /// Number of probabilistic outcomes of decision `decision`
    fn num_outcomes(&self, decision: usize) -> Result<usize>;

    /// Probability of outcome `outcome` of decision `decision`
    fn outcome_probability(&self, decision: usize, outcome: usize) -> Result<f64>;

    /// Successor state reached by outcome `outcome` of decision `decision`
    fn outcome_target(&self, decision: usize, outcome: usize) -> Result<Self::State>;
}
