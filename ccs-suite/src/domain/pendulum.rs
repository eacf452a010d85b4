//! Pendulum: swing up a torque-limited pendulum.
use crate::task::{resolve, RewardTask};
use anyhow::Result;
use ccs_core::{
    param_tree,
    tolerance::{self, tolerance_min, DEFAULT_VALUE_AT_MARGIN},
    ParamTree, RewardOverride, ToleranceParams,
};

/// Episode length in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 20.0;

/// Tasks of the domain.
pub const TASKS: &[&str] = &["swingup"];

/// Default reward parameters.
pub fn default_reward_parameters() -> ParamTree {
    param_tree! {
        "upright" => param_tree! {
            "sigmoid" => "gaussian",
            "margin" => 1.0,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
        },
        "small_velocity" => param_tree! {
            "sigmoid" => "gaussian",
            "margin" => 5.0,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
        },
    }
}

/// Quantities of the pendulum used by the reward.
#[derive(Debug, Clone, Default)]
pub struct PendulumReadings {
    /// Vertical component of the pole's frame, `1` when upright.
    pub pole_vertical: f64,
    /// Angular velocity of the hinge.
    pub angular_velocity: Vec<f64>,
}

/// Smooth swing-up reward.
#[derive(Debug, Clone)]
pub struct SwingUpReward {
    reward_parameters: ParamTree,
    upright: ToleranceParams,
    small_velocity: ToleranceParams,
}

impl SwingUpReward {
    /// Creates the reward.
    pub fn new(reward_override: Option<&RewardOverride>) -> Result<Self> {
        let reward_parameters = resolve(default_reward_parameters(), reward_override)?;
        Ok(Self {
            upright: ToleranceParams::from_group(&reward_parameters, "upright")?,
            small_velocity: ToleranceParams::from_group(&reward_parameters, "small_velocity")?,
            reward_parameters,
        })
    }
}

impl RewardTask for SwingUpReward {
    type Readings = PendulumReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        default_reward_parameters()
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        // 0 when upright, 1 when hanging down.
        let deviation = (1.0 - r.pole_vertical) / 2.0;
        let upright = tolerance::tolerance(deviation, &self.upright)?;
        let small_velocity = (1.0 + tolerance_min(&r.angular_velocity, &self.small_velocity)?) / 2.0;
        Ok(upright * small_velocity)
    }
}
