//! Reward-structure evaluation.
//!
//! A reward structure is a list of items, each made of a guard over states,
//! a synchronisation (action) label and a reward expression. Taking action
//! `a` in state `s` earns the sum of the rewards of every item whose guard
//! holds in `s` and whose label is `a`. Every guard is evaluated, so a guard
//! that fails on an item for another action is still reported.

use crate::{Result, UctError};
use std::collections::HashMap;
use std::fmt;

/// Assignment of values to named model constants
pub type Constants = HashMap<String, f64>;

/// Guard predicate of a reward item
pub type Guard<S> = Box<dyn Fn(&S, &Constants) -> Result<bool>>;

/// Reward expression of a reward item
pub type RewardExpr<S> = Box<dyn Fn(&S, &Constants) -> Result<f64>>;

/// Immediate reward attributable to taking an action from a state.
pub trait RewardEvaluator<S> {
    fn reward(&self, state: &S, action: &str) -> Result<f64>;
}

/// One (guard, action label, reward expression) entry
pub struct RewardItem<S> {
    synch: String,
    guard: Guard<S>,
    reward: RewardExpr<S>,
}

impl<S> RewardItem<S> {
    pub fn new(synch: impl Into<String>, guard: Guard<S>, reward: RewardExpr<S>) -> Self {
        Self {
            synch: synch.into(),
            guard,
            reward,
        }
    }

    /// Action label this item is attached to
    pub fn synch(&self) -> &str {
        &self.synch
    }
}

impl<S> fmt::Debug for RewardItem<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewardItem")
            .field("synch", &self.synch)
            .finish_non_exhaustive()
    }
}

/// Reward structure evaluated against a constants assignment
#[derive(Debug)]
pub struct RewardStructure<S> {
    name: Option<String>,
    items: Vec<RewardItem<S>>,
    constants: Constants,
}

impl<S> Default for RewardStructure<S> {
    fn default() -> Self {
        Self {
            name: None,
            items: Vec::new(),
            constants: Constants::new(),
        }
    }
}

impl<S> RewardStructure<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_constants(mut self, constants: Constants) -> Self {
        self.constants = constants;
        self
    }

    /// Appends an item with arbitrary guard and reward expression
    pub fn with_item(mut self, item: RewardItem<S>) -> Self {
        self.items.push(item);
        self
    }

    /// Appends an item that rewards `action` with `value` in every state
    pub fn with_constant_reward(self, action: impl Into<String>, value: f64) -> Self
    where
        S: 'static,
    {
        self.with_item(RewardItem::new(
            action,
            Box::new(|_: &S, _: &Constants| Ok(true)),
            Box::new(move |_: &S, _: &Constants| Ok(value)),
        ))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn items(&self) -> &[RewardItem<S>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S> RewardEvaluator<S> for RewardStructure<S> {
    fn reward(&self, state: &S, action: &str) -> Result<f64> {
        let mut total = 0.0;
        for item in &self.items {
            if (item.guard)(state, &self.constants)? && item.synch == action {
                total += (item.reward)(state, &self.constants)?;
            }
        }
        Ok(total)
    }
}

/// Looks up a constant, failing with a reward error if it is undefined
pub fn lookup_constant(constants: &Constants, name: &str) -> Result<f64> {
    constants
        .get(name)
        .copied()
        .ok_or_else(|| UctError::Reward(format!("undefined constant '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn even_state_structure() -> RewardStructure<u32> {
        RewardStructure::new()
            .with_name("cost")
            .with_constants(Constants::from([("c".to_string(), 4.0)]))
            .with_item(RewardItem::new(
                "send",
                Box::new(|s: &u32, _: &Constants| Ok(s % 2 == 0)),
                Box::new(|_: &u32, k: &Constants| lookup_constant(k, "c")),
            ))
            .with_constant_reward("send", 1.5)
            .with_constant_reward("wait", 0.25)
    }

    #[test]
    fn test_reward_sums_matching_items() {
        let rewards = even_state_structure();
        assert_eq!(rewards.reward(&2, "send").unwrap(), 5.5);
        assert_eq!(rewards.reward(&3, "send").unwrap(), 1.5);
        assert_eq!(rewards.reward(&3, "wait").unwrap(), 0.25);
    }

    #[test]
    fn test_unmatched_action_is_reward_free() {
        let rewards = even_state_structure();
        assert_eq!(rewards.reward(&2, "idle").unwrap(), 0.0);
        assert_eq!(RewardStructure::<u32>::new().reward(&0, "send").unwrap(), 0.0);
    }

    #[test]
    fn test_undefined_constant_is_reported() {
        let rewards = RewardStructure::<u32>::new().with_item(RewardItem::new(
            "send",
            Box::new(|_: &u32, _: &Constants| Ok(true)),
            Box::new(|_: &u32, k: &Constants| lookup_constant(k, "missing")),
        ));
        assert_matches!(rewards.reward(&0, "send"), Err(UctError::Reward(_)));
    }

    #[test]
    fn test_failing_guard_of_other_action_is_reported() {
        let rewards = RewardStructure::<u32>::new()
            .with_constant_reward("send", 1.0)
            .with_item(RewardItem::new(
                "ack",
                Box::new(|s: &u32, k: &Constants| Ok(f64::from(*s) < lookup_constant(k, "limit")?)),
                Box::new(|_: &u32, _: &Constants| Ok(1.0)),
            ));
        assert_matches!(rewards.reward(&0, "send"), Err(UctError::Reward(_)));
    }

    #[test]
    fn test_metadata() {
        let rewards = even_state_structure();
        assert_eq!(rewards.name(), Some("cost"));
        assert_eq!(rewards.len(), 3);
        assert_eq!(rewards.items()[0].synch(), "send");
        assert_eq!(rewards.constants().get("c"), Some(&4.0));
    }
}
