//! Reward side of a task.
use anyhow::Result;
use ccs_core::{merge, ParamError, ParamTree, RewardOverride};
use log::debug;

/// A task whose reward is shaped by a reward-parameter tree.
pub trait RewardTask {
    /// Quantities read from the simulation to compute the reward.
    type Readings;

    /// Default reward-parameter tree of the task.
    fn default_reward_parameters(&self) -> ParamTree;

    /// Reward parameters in effect after applying the override.
    fn reward_parameters(&self) -> &ParamTree;

    /// Returns the reward for the given readings.
    fn get_reward(&self, readings: &Self::Readings) -> Result<f64>;
}

/// Merges `reward_override` into `defaults`, returning an owned tree.
pub(crate) fn resolve(defaults: ParamTree, reward_override: Option<&RewardOverride>) -> Result<ParamTree> {
    let merged = merge(&defaults, reward_override)?.into_owned();
    debug!("Reward parameters: {:?}", merged);
    Ok(merged)
}

/// Turns a negative margin of `group` into a reversed direction.
///
/// The margin is made non-negative and the bounds are overwritten with
/// `[margin, inf]`. Returns `-1` if the margin was negative, `1` otherwise.
pub(crate) fn apply_direction(tree: &mut ParamTree, group: &str) -> Result<f64, ParamError> {
    let options = tree.get_map_mut(group)?;
    let margin = options.get_number("margin")?;
    let direction = if margin < 0.0 { -1.0 } else { 1.0 };
    let margin = margin.abs();
    options.insert("margin", margin);
    options.insert("bounds", vec![margin, f64::INFINITY]);
    Ok(direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccs_core::param_tree;

    #[test]
    fn test_apply_direction() {
        let mut tree = param_tree! {
            "speed" => param_tree! { "margin" => -4.0, "bounds" => vec![10.0, f64::INFINITY] },
        };
        assert_eq!(apply_direction(&mut tree, "speed"), Ok(-1.0));
        let speed = tree.get_map("speed").unwrap();
        assert_eq!(speed.get_number("margin"), Ok(4.0));
        assert_eq!(speed.get_numbers("bounds"), Ok(vec![4.0, f64::INFINITY]));

        assert_eq!(apply_direction(&mut tree, "speed"), Ok(1.0));
    }

    #[test]
    fn test_apply_direction_requires_margin() {
        let mut tree = param_tree! { "speed" => param_tree! { "sigmoid" => "linear" } };
        assert_eq!(
            apply_direction(&mut tree, "speed"),
            Err(ParamError::KeyNotFound("margin".to_string()))
        );
    }
}
