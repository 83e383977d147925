//! UCT search driver.
//!
//! Builds a tree from the model's unique initial state and runs a budget of
//! rollouts from the root. The tree is owned by the caller once the search
//! returns; policy extraction works on it read-only.

use crate::mcts::config::UctConfig;
use crate::mcts::node::NodeId;
use crate::mcts::rollout::{Rollout, RolloutOutcome};
use crate::mcts::sampling::UniformSource;
use crate::mcts::tree::SearchTree;
use crate::model::explorer::ModelExplorer;
use crate::model::reward::RewardEvaluator;
use crate::{Result, UctError};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::fmt;
use std::time::{Duration, Instant};

/// Statistics of one search run
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStats {
    pub rollouts: usize,
    pub nodes: usize,
    pub decision_nodes: usize,
    pub chance_nodes: usize,
    /// Longest rollout in simulated time steps
    pub max_depth: usize,
    pub elapsed: Duration,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rollouts, {} nodes ({} decision / {} chance), max depth {}, {:.3}s",
            self.rollouts,
            self.nodes,
            self.decision_nodes,
            self.chance_nodes,
            self.max_depth,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Finished search: the tree plus its statistics
#[derive(Debug, Clone)]
pub struct SearchResult<S> {
    pub tree: SearchTree<S>,
    pub stats: SearchStats,
}

impl<S> SearchResult<S> {
    /// Root mean return, the search's value estimate for the initial state
    pub fn estimate(&self) -> f64 {
        self.tree.root().mean_return
    }
}

/// UCT search over a model with a reward structure
pub struct UctSearch<E, R, U = StdRng> {
    explorer: E,
    rewards: R,
    source: U,
    config: UctConfig,
}

impl<E, R> UctSearch<E, R, StdRng>
where
    E: ModelExplorer,
    R: RewardEvaluator<E::State>,
{
    /// Creates a search seeded from `config.seed`, or from a fresh random seed
    pub fn new(explorer: E, rewards: R, config: UctConfig) -> Result<Self> {
        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                log::debug!("No seed configured, using {}", seed);
                seed
            }
        };
        Self::with_source(explorer, rewards, StdRng::seed_from_u64(seed), config)
    }
}

impl<E, R, U> UctSearch<E, R, U>
where
    E: ModelExplorer,
    R: RewardEvaluator<E::State>,
    U: UniformSource,
{
    /// Creates a search drawing outcomes from `source`
    pub fn with_source(explorer: E, rewards: R, source: U, config: UctConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            explorer,
            rewards,
            source,
            config,
        })
    }

    pub fn config(&self) -> &UctConfig {
        &self.config
    }

    pub fn rewards(&self) -> &R {
        &self.rewards
    }

    pub fn into_parts(self) -> (E, R, U) {
        (self.explorer, self.rewards, self.source)
    }

    /// Runs the configured number of rollouts to the configured horizon
    pub fn search(&mut self) -> Result<SearchResult<E::State>> {
        self.search_with(self.config.depth, self.config.iterations)
    }

    /// Runs `iterations` rollouts to horizon `depth` from a fresh root
    ///
    /// # Errors
    /// `NoSingleInitialState` when the model does not have exactly one
    /// initial state; any failure of a rollout aborts the search.
    pub fn search_with(&mut self, depth: usize, iterations: usize) -> Result<SearchResult<E::State>> {
        let run_config = self.config.clone().with_depth(depth).with_iterations(iterations);
        run_config.validate()?;

        if !self.explorer.has_single_initial_state()? {
            return Err(UctError::NoSingleInitialState);
        }
        let mut tree = SearchTree::new(self.explorer.initial_state()?);
        let root = tree.root_id();

        log::info!(
            "🌳 UCT search started: {}",
            run_config.to_config_string()
        );

        let start = Instant::now();
        let time_limit = run_config.time_limit_ms.map(Duration::from_millis);
        let mut rollouts = 0;
        let mut max_depth: usize = 0;

        for iteration in 0..iterations {
            if let Some(limit) = time_limit {
                if start.elapsed() >= limit {
                    log::info!(
                        "⏱️ Time limit of {}ms reached after {} rollouts",
                        limit.as_millis(),
                        iteration
                    );
                    break;
                }
            }

            let bias = run_config.bias.bias(tree.root().mean_return);
            let outcome = self.rollout(&mut tree, root, depth, bias)?;
            log::trace!(
                "Rollout {}: bias {:.4}, return {:.4}, {} steps",
                iteration,
                bias,
                outcome.total_return,
                outcome.steps
            );

            rollouts += 1;
            max_depth = max_depth.max(outcome.steps);
        }

        let stats = SearchStats {
            rollouts,
            nodes: tree.len(),
            decision_nodes: tree.decision_count(),
            chance_nodes: tree.chance_count(),
            max_depth,
            elapsed: start.elapsed(),
        };
        log::info!(
            "✅ UCT search finished: estimate {:.6} after {} rollouts",
            tree.root().mean_return,
            stats.rollouts
        );
        log::debug!("Search stats: {}", stats);

        Ok(SearchResult { tree, stats })
    }

    /// Runs a single rollout from `node` with the search's explorer, rewards
    /// and random source
    pub fn rollout(
        &mut self,
        tree: &mut SearchTree<E::State>,
        node: NodeId,
        depth: usize,
        bias: f64,
    ) -> Result<RolloutOutcome> {
        Rollout::new(
            &mut self.explorer,
            &self.rewards,
            &mut self.source,
            self.config.probability_tolerance,
        )
        .run(tree, node, depth, bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcts::config::BiasPolicy;
    use crate::mcts::sampling::SequenceSource;
    use crate::model::explicit::{ExplicitChoice, ExplicitMdp, ExplicitState};
    use crate::model::reward::RewardStructure;
    use assert_matches::assert_matches;

    /// Two actions from state 0: "safe" pays 1 and stays, "risky" pays 3 but
    /// lands in a deadlock half of the time
    fn gamble() -> (ExplicitMdp, RewardStructure<usize>) {
        let mdp = ExplicitMdp::new(
            vec![
                ExplicitState::new(vec![
                    ExplicitChoice::new("safe", vec![(1.0, 0)]),
                    ExplicitChoice::new("risky", vec![(0.5, 0), (0.5, 1)]),
                ]),
                ExplicitState::deadlock(),
            ],
            vec![0],
        );
        let rewards = RewardStructure::new()
            .with_constant_reward("safe", 1.0)
            .with_constant_reward("risky", 3.0);
        (mdp, rewards)
    }

    #[test]
    fn test_search_visits_root_once_per_rollout() {
        let (mdp, rewards) = gamble();
        let config = UctConfig::default().with_depth(3).with_iterations(200).with_seed(11);
        let mut search = UctSearch::new(mdp, rewards, config).unwrap();

        let result = search.search().unwrap();

        assert_eq!(result.stats.rollouts, 200);
        assert_eq!(result.tree.root().visit_count, 200);
        let child_visits: usize = result
            .tree
            .children(result.tree.root_id())
            .iter()
            .map(|&c| result.tree.node(c).visit_count)
            .sum();
        assert_eq!(child_visits, 200);
        assert_eq!(result.stats.nodes, result.tree.len());
        assert!(result.stats.max_depth <= 3);
    }

    #[test]
    fn test_search_with_overrides_budget() {
        let (mdp, rewards) = gamble();
        let mut search = UctSearch::new(mdp, rewards, UctConfig::default().with_seed(1)).unwrap();

        let result = search.search_with(2, 17).unwrap();

        assert_eq!(result.stats.rollouts, 17);
        assert!(result.stats.max_depth <= 2);
        assert_matches!(search.search_with(0, 17), Err(UctError::InvalidConfig(_)));
    }

    #[test]
    fn test_multiple_initial_states_rejected() {
        let (_, rewards) = gamble();
        let mdp = ExplicitMdp::new(
            vec![ExplicitState::deadlock(), ExplicitState::deadlock()],
            vec![0, 1],
        );
        let mut search = UctSearch::new(mdp, rewards, UctConfig::default()).unwrap();
        assert_matches!(search.search(), Err(UctError::NoSingleInitialState));
    }

    #[test]
    fn test_same_seed_same_tree() {
        let config = UctConfig::default().with_depth(4).with_iterations(300).with_seed(99);
        let (mdp_a, rewards_a) = gamble();
        let (mdp_b, rewards_b) = gamble();

        let a = UctSearch::new(mdp_a, rewards_a, config.clone())
            .unwrap()
            .search()
            .unwrap();
        let b = UctSearch::new(mdp_b, rewards_b, config).unwrap().search().unwrap();

        assert_eq!(a.tree, b.tree);
    }

    #[test]
    fn test_fixed_bias_with_sequence_source() {
        let (mdp, rewards) = gamble();
        let config = UctConfig::default()
            .with_depth(2)
            .with_iterations(50)
            .with_bias(BiasPolicy::Fixed(2.0));
        let source = SequenceSource::new(vec![0.1, 0.6, 0.35, 0.9]).unwrap();
        let mut search = UctSearch::with_source(mdp, rewards, source, config).unwrap();

        let result = search.search().unwrap();

        // both actions tried before either is revisited
        for &c in result.tree.children(result.tree.root_id()) {
            assert!(result.tree.node(c).visit_count >= 1);
        }
        let (_, _, source) = search.into_parts();
        assert!(source.draws() > 0);
    }

    #[test]
    fn test_zero_time_limit_runs_nothing() {
        let (mdp, rewards) = gamble();
        let config = UctConfig::default().with_seed(5).with_time_limit_ms(0);
        let mut search = UctSearch::new(mdp, rewards, config).unwrap();

        let result = search.search().unwrap();

        assert_eq!(result.stats.rollouts, 0);
        assert_eq!(result.tree.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let (mdp, rewards) = gamble();
        let res = UctSearch::new(mdp, rewards, UctConfig::default().with_iterations(0));
        assert_matches!(res.err(), Some(UctError::InvalidConfig(_)));
    }
}
