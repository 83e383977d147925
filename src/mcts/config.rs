//! UCT search configuration
//!
//! Tunables of a search run. Defaults reproduce the classic setup: horizon 5,
//! 10 000 rollouts and an exploration bias recomputed from the root mean
//! before every rollout.

use crate::{Result, UctError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How the UCT exploration constant is chosen for each rollout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BiasPolicy {
    /// Root mean return before the rollout (self-scaling to observed rewards)
    #[default]
    RootMean,
    /// A fixed constant
    Fixed(f64),
}

impl BiasPolicy {
    /// Bias for the next rollout given the root's current mean return
    pub fn bias(&self, root_mean: f64) -> f64 {
        match self {
            BiasPolicy::RootMean => root_mean,
            BiasPolicy::Fixed(value) => *value,
        }
    }
}

impl fmt::Display for BiasPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BiasPolicy::RootMean => write!(f, "root-mean"),
            BiasPolicy::Fixed(value) => write!(f, "{}", value),
        }
    }
}

/// Parses `root-mean` or a number
impl FromStr for BiasPolicy {
    type Err = UctError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "root-mean" | "root_mean" => Ok(BiasPolicy::RootMean),
            other => other
                .parse::<f64>()
                .map(BiasPolicy::Fixed)
                .map_err(|_| UctError::InvalidConfig(format!("unknown bias policy '{}'", other))),
        }
    }
}

/// UCT search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UctConfig {
    /// Horizon: number of probabilistic steps simulated per rollout
    /// Default: 5
    pub depth: usize,

    /// Rollout budget
    /// Default: 10000
    pub iterations: usize,

    /// Exploration constant policy
    /// Default: RootMean
    pub bias: BiasPolicy,

    /// Seed for the random source; a fresh seed is drawn when absent
    pub seed: Option<u64>,

    /// Allowed deviation of a chance node's outcome probabilities from 1
    /// Default: 1e-5
    pub probability_tolerance: f64,

    /// Wall-clock cap checked between rollouts
    pub time_limit_ms: Option<u64>,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            depth: 5,
            iterations: 10_000,
            bias: BiasPolicy::RootMean,
            seed: None,
            probability_tolerance: 1e-5,
            time_limit_ms: None,
        }
    }
}

impl UctConfig {
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_bias(mut self, bias: BiasPolicy) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit_ms(mut self, limit: u64) -> Self {
        self.time_limit_ms = Some(limit);
        self
    }

    /// Loads a configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: UctConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the search cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(UctError::InvalidConfig("depth must be positive".to_string()));
        }
        if self.iterations == 0 {
            return Err(UctError::InvalidConfig(
                "iterations must be positive".to_string(),
            ));
        }
        if !self.probability_tolerance.is_finite() || self.probability_tolerance <= 0.0 {
            return Err(UctError::InvalidConfig(format!(
                "probability tolerance must be a positive number, got {}",
                self.probability_tolerance
            )));
        }
        if let BiasPolicy::Fixed(value) = self.bias {
            if !value.is_finite() {
                return Err(UctError::InvalidConfig(format!(
                    "fixed bias must be finite, got {}",
                    value
                )));
            }
        }
        Ok(())
    }

    /// Create a configuration string for logging
    pub fn to_config_string(&self) -> String {
        format!(
            "depth[{}]_iter[{}]_bias[{}]_tol[{:e}]",
            self.depth, self.iterations, self.bias, self.probability_tolerance
        )
    }
}
