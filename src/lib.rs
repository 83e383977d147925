//! # UCT MDP Library
//!
//! Bounded-horizon Monte-Carlo Tree Search (UCT) for Markov decision processes.
//!
//! ## Features
//!
//! - **Search Engine**: UCT rollouts over an arena-backed tree of decision and chance nodes
//! - **Model Capabilities**: narrow traits for state exploration and reward evaluation
//! - **Explicit Models**: in-memory / JSON MDPs implementing both capabilities
//! - **Policy Extraction**: greedy best-policy walk and induced Markov chain construction
//!
//! ## Usage
//!
//! ```rust,no_run
//! use uct_mdp::{
//!     analysis::analyze,
//!     mcts::config::UctConfig,
//!     model::explicit::ModelFile,
//! };
//!
//! # fn main() -> uct_mdp::Result<()> {
//! let file = ModelFile::from_json_file("models/retry_channel.json")?;
//! let rewards = file.reward_structure();
//! let report = analyze(file.model, rewards, UctConfig::default())?;
//! println!("estimate = {}", report.estimate);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Model exploration and reward evaluation capabilities
pub mod model;

/// UCT search engine
pub mod mcts;

/// End-to-end search, policy extraction and chain evaluation
pub mod analysis;

/// Logger configuration
pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use mcts::chain::InducedChain;
pub use mcts::config::{BiasPolicy, UctConfig};
pub use mcts::node::{NodeId, NodeKind, SearchNode};
pub use mcts::search::{SearchResult, SearchStats, UctSearch};
pub use mcts::tree::SearchTree;
pub use model::explorer::ModelExplorer;
pub use model::reward::{Constants, RewardEvaluator, RewardStructure};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the UCT MDP library
#[derive(Debug, thiserror::Error)]
pub enum UctError {
    #[error("UCT requires a single initial state")]
    NoSingleInitialState,

    #[error("Exploration error: {0}")]
    Exploration(String),

    #[error("Malformed distribution at node {node}: outcome probabilities sum to {sum}")]
    MalformedDistribution { node: usize, sum: f64 },

    #[error("Reward error: {0}")]
    Reward(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, UctError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
