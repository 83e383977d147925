//! Explicit, in-memory Markov decision processes.
//!
//! States are the indices `0..n`. Each state lists its choices in order; each
//! choice carries an action label and its probabilistic outcomes. A
//! [`ModelFile`] bundles a model with constants and reward items so that a
//! complete problem can be loaded from a single JSON document.

use crate::model::explorer::ModelExplorer;
use crate::model::reward::{lookup_constant, Constants, RewardItem, RewardStructure};
use crate::{Result, UctError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// One probabilistic outcome of a choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitOutcome {
    pub probability: f64,
    pub target: usize,
}

/// An action available in a state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitChoice {
    pub action: String,
    pub outcomes: Vec<ExplicitOutcome>,
}

impl ExplicitChoice {
    pub fn new(action: impl Into<String>, outcomes: Vec<(f64, usize)>) -> Self {
        Self {
            action: action.into(),
            outcomes: outcomes
                .into_iter()
                .map(|(probability, target)| ExplicitOutcome {
                    probability,
                    target,
                })
                .collect(),
        }
    }
}

/// A state and its ordered choices (no choices = deadlock)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplicitState {
    #[serde(default)]
    pub choices: Vec<ExplicitChoice>,
}

impl ExplicitState {
    pub fn new(choices: Vec<ExplicitChoice>) -> Self {
        Self { choices }
    }

    pub fn deadlock() -> Self {
        Self::default()
    }
}

/// Explicit MDP implementing [`ModelExplorer`] with `usize` states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitMdp {
    pub initial_states: Vec<usize>,
    pub states: Vec<ExplicitState>,
    #[serde(skip)]
    current: Option<usize>,
}

impl ExplicitMdp {
    pub fn new(states: Vec<ExplicitState>, initial_states: Vec<usize>) -> Self {
        Self {
            initial_states,
            states,
            current: None,
        }
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Checks that every initial state and outcome target exists
    pub fn validate(&self) -> Result<()> {
        let n = self.states.len();
        if let Some(&bad) = self.initial_states.iter().find(|&&s| s >= n) {
            return Err(UctError::Exploration(format!(
                "initial state {} out of range ({} states)",
                bad, n
            )));
        }
        for (index, state) in self.states.iter().enumerate() {
            for choice in &state.choices {
                if let Some(outcome) = choice.outcomes.iter().find(|o| o.target >= n) {
                    return Err(UctError::Exploration(format!(
                        "state {} action '{}' targets unknown state {}",
                        index, choice.action, outcome.target
                    )));
                }
            }
        }
        Ok(())
    }

    fn current_state(&self) -> Result<&ExplicitState> {
        let index = self
            .current
            .ok_or_else(|| UctError::Exploration("no state has been explored".to_string()))?;
        Ok(&self.states[index])
    }

    fn choice(&self, decision: usize) -> Result<&ExplicitChoice> {
        let state = self.current_state()?;
        state.choices.get(decision).ok_or_else(|| {
            UctError::Exploration(format!(
                "decision {} out of range ({} available)",
                decision,
                state.choices.len()
            ))
        })
    }

    fn outcome(&self, decision: usize, outcome: usize) -> Result<&ExplicitOutcome> {
        let choice = self.choice(decision)?;
        choice.outcomes.get(outcome).ok_or_else(|| {
            UctError::Exploration(format!(
                "outcome {} of action '{}' out of range ({} available)",
                outcome,
                choice.action,
                choice.outcomes.len()
            ))
        })
    }
}

impl ModelExplorer for ExplicitMdp {
    type State = usize;

    fn has_single_initial_state(&self) -> Result<bool> {
        Ok(self.initial_states.len() == 1)
    }

    fn initial_state(&self) -> Result<usize> {
        self.initial_states
            .first()
            .copied()
            .ok_or(UctError::NoSingleInitialState)
    }

    fn explore_state(&mut self, state: &usize) -> Result<()> {
        if *state >= self.states.len() {
            return Err(UctError::Exploration(format!(
                "state {} out of range ({} states)",
                state,
                self.states.len()
            )));
        }
        self.current = Some(*state);
        Ok(())
    }

    fn num_decisions(&self) -> Result<usize> {
        Ok(self.current_state()?.choices.len())
    }

    fn decision_label(&self, decision: usize) -> Result<String> {
        Ok(self.choice(decision)?.action.clone())
    }

    fn num_outcomes(&self, decision: usize) -> Result<usize> {
        Ok(self.choice(decision)?.outcomes.len())
    }

    fn outcome_probability(&self, decision: usize, outcome: usize) -> Result<f64> {
        Ok(self.outcome(decision, outcome)?.probability)
    }

    fn outcome_target(&self, decision: usize, outcome: usize) -> Result<usize> {
        Ok(self.outcome(decision, outcome)?.target)
    }
}

/// Reward of an item: a literal or the name of a constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RewardValue {
    Value(f64),
    Constant(String),
}

impl RewardValue {
    pub fn evaluate(&self, constants: &Constants) -> Result<f64> {
        match self {
            RewardValue::Value(v) => Ok(*v),
            RewardValue::Constant(name) => lookup_constant(constants, name),
        }
    }
}

/// Reward item of a model file. `states: None` means the guard is `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitRewardItem {
    pub action: String,
    #[serde(default)]
    pub states: Option<Vec<usize>>,
    pub reward: RewardValue,
}

/// Model, constants and reward items loaded together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub name: Option<String>,
    pub model: ExplicitMdp,
    #[serde(default)]
    pub constants: Constants,
    #[serde(default)]
    pub rewards: Vec<ExplicitRewardItem>,
}

impl ModelFile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        file.model.validate()?;
        Ok(file)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded model file {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    /// Builds the reward structure described by `rewards` and `constants`
    pub fn reward_structure(&self) -> RewardStructure<usize> {
        let mut structure = RewardStructure::new().with_constants(self.constants.clone());
        if let Some(name) = &self.name {
            structure = structure.with_name(name.clone());
        }
        for item in &self.rewards {
            let guard_states: Option<BTreeSet<usize>> =
                item.states.as_ref().map(|s| s.iter().copied().collect());
            let value = item.reward.clone();
            structure = structure.with_item(RewardItem::new(
                item.action.clone(),
                Box::new(move |state: &usize, _: &Constants| {
                    Ok(guard_states.as_ref().map_or(true, |set| set.contains(state)))
                }),
                Box::new(move |_: &usize, constants: &Constants| value.evaluate(constants)),
            ));
        }
        structure
    }
}
