//! Search, extract the policy, build the induced chain and evaluate it.

use crate::mcts::chain::InducedChain;
use crate::mcts::config::UctConfig;
use crate::mcts::policy::best_policy;
use crate::mcts::search::{SearchStats, UctSearch};
use crate::model::explorer::ModelExplorer;
use crate::model::reward::RewardEvaluator;
use crate::Result;
use std::time::{Duration, Instant};

/// Outcome of one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisReport<S> {
    /// Root mean return of the search tree
    pub estimate: f64,
    /// Exact expected reward of the induced chain
    pub chain_value: f64,
    /// Greedy action sequence from the root
    pub best_actions: Vec<String>,
    pub chain: InducedChain<S>,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// Runs a UCT search with `config` and evaluates the policy it found
pub fn analyze<E, R>(explorer: E, rewards: R, config: UctConfig) -> Result<AnalysisReport<E::State>>
where
    E: ModelExplorer,
    R: RewardEvaluator<E::State>,
{
    let start = Instant::now();
    let mut search = UctSearch::new(explorer, rewards, config.clone())?;
    let result = search.search()?;

    let policy = best_policy(&result.tree, result.tree.root_id());
    let best_actions: Vec<String> = policy.best_actions().into_iter().map(str::to_string).collect();

    let chain = InducedChain::from_tree(&result.tree)?;
    chain.check_stochastic(config.probability_tolerance)?;
    let chain_value = chain.expected_total_reward(search.rewards())?;

    let elapsed = start.elapsed();
    log::info!("analysis completed in {:.3} secs", elapsed.as_secs_f64());
    log::info!(
        "estimate {:.6}, induced chain value {:.6} ({} states)",
        result.estimate(),
        chain_value,
        chain.num_states()
    );

    Ok(AnalysisReport {
        estimate: result.estimate(),
        chain_value,
        best_actions,
        chain,
        stats: result.stats,
        elapsed,
    })
}
