pub mod chain;
pub mod config;
pub mod expansion;
pub mod node;
pub mod policy;
pub mod rollout;
pub mod sampling;
pub mod search;
pub mod selection;
pub mod tree;

pub use chain::{ChainState, InducedChain};
pub use config::{BiasPolicy, UctConfig};
pub use policy::{best_policy, BestPolicy, GreedyStep};
pub use rollout::RolloutOutcome;
pub use sampling::{SequenceSource, UniformSource};
pub use search::{SearchResult, SearchStats, UctSearch};
