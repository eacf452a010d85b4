//! Reacher: a two-link planar arm reaching a randomly placed target.
use crate::task::{resolve, RewardTask};
use anyhow::Result;
use ccs_core::{
    param_tree, tolerance, tolerance::DEFAULT_VALUE_AT_MARGIN, ParamTree, RewardOverride,
    ToleranceParams,
};

/// Episode length in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 20.0;

/// Target radius of the easy task.
pub const BIG_TARGET: f64 = 0.05;

/// Target radius of the hard task.
pub const SMALL_TARGET: f64 = 0.015;

/// Tasks of the domain.
pub const TASKS: &[&str] = &["easy", "hard"];

/// Default reward parameters.
pub fn default_reward_parameters() -> ParamTree {
    param_tree! {
        "finger_to_target" => param_tree! {
            "sigmoid" => "gaussian",
            "margin" => 0.5,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
        },
    }
}

/// Quantities of the reacher used by the reward.
#[derive(Debug, Clone, Default)]
pub struct ReacherReadings {
    /// Distance between the fingertip and the target.
    pub finger_to_target_dist: f64,
}

/// Smooth reaching reward.
#[derive(Debug, Clone)]
pub struct ReacherReward {
    target_size: f64,
    reward_parameters: ParamTree,
    finger_to_target: ToleranceParams,
}

impl ReacherReward {
    /// Creates the reward for a target of radius `target_size`.
    pub fn new(target_size: f64, reward_override: Option<&RewardOverride>) -> Result<Self> {
        let reward_parameters = resolve(default_reward_parameters(), reward_override)?;
        Ok(Self {
            target_size,
            finger_to_target: ToleranceParams::from_group(&reward_parameters, "finger_to_target")?,
            reward_parameters,
        })
    }

    /// Radius of the target.
    pub fn target_size(&self) -> f64 {
        self.target_size
    }
}

impl RewardTask for ReacherReward {
    type Readings = ReacherReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        default_reward_parameters()
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        Ok(tolerance(r.finger_to_target_dist, &self.finger_to_target)?)
    }
}
