//! Capabilities consumed by the search engine.
//!
//! - `explorer`: state exploration (decisions, outcomes, successors)
//! - `reward`: reward-structure evaluation
//! - `explicit`: an in-memory MDP implementing both

pub mod explicit;
pub mod explorer;
pub mod reward;

pub use explicit::{
    ExplicitChoice, ExplicitMdp, ExplicitOutcome, ExplicitRewardItem, ExplicitState, ModelFile,
    RewardValue,
};
pub use explorer::ModelExplorer;
pub use reward::{Constants, RewardEvaluator, RewardItem, RewardStructure};
