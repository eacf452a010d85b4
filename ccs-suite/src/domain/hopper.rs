//! Hopper: a one-legged planar body that stands or hops forward.
use crate::task::{apply_direction, resolve, RewardTask};
use anyhow::Result;
use ccs_core::{
    param_tree,
    tolerance::{self, tolerance_mean, DEFAULT_VALUE_AT_MARGIN},
    ParamTree, RewardOverride, ToleranceParams,
};

/// Episode length in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 20.0;

/// Control timestep in seconds.
pub const CONTROL_TIMESTEP: f64 = 0.02;

/// Minimal height of the torso to be considered standing.
pub const STAND_HEIGHT: f64 = 0.6;

/// Hopping speed above which the hop reward is 1.
pub const HOP_SPEED: f64 = 2.0;

/// Tasks of the domain.
pub const TASKS: &[&str] = &["stand", "hop"];

/// Default reward parameters.
///
/// The `height` group is kept for compatibility with existing overrides. The standing
/// term itself uses fixed bounds.
pub fn default_reward_parameters() -> ParamTree {
    param_tree! {
        "height" => param_tree! {
            "bounds" => vec![STAND_HEIGHT, 2.0],
            "sigmoid" => "linear",
            "margin" => 1.0,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
        },
        "speed" => param_tree! {
            "bounds" => vec![HOP_SPEED, f64::INFINITY],
            "sigmoid" => "linear",
            "margin" => 1.0,
            "value_at_margin" => 0.5,
        },
        "control" => param_tree! {
            "sigmoid" => "quadratic",
            "margin" => 1.0,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
        },
    }
}

/// Quantities of the hopper used by the reward.
#[derive(Debug, Clone, Default)]
pub struct HopperReadings {
    /// Height of the torso above the foot.
    pub height: f64,
    /// Horizontal speed of the torso.
    pub speed: f64,
    /// Controls applied to the actuators.
    pub control: Vec<f64>,
}

/// Standing or hopping reward.
#[derive(Debug, Clone)]
pub struct HopperReward {
    hopping: bool,
    reward_parameters: ParamTree,
    standing: ToleranceParams,
    speed: ToleranceParams,
    control: ToleranceParams,
    speed_direction: f64,
}

impl HopperReward {
    /// Creates the reward. `hopping` selects the hop task, otherwise the stand task.
    pub fn new(hopping: bool, reward_override: Option<&RewardOverride>) -> Result<Self> {
        let mut reward_parameters = resolve(default_reward_parameters(), reward_override)?;
        let speed_direction = apply_direction(&mut reward_parameters, "speed")?;
        Ok(Self {
            hopping,
            standing: ToleranceParams::default().bounds(STAND_HEIGHT, 2.0),
            speed: ToleranceParams::from_group(&reward_parameters, "speed")?,
            control: ToleranceParams::from_group(&reward_parameters, "control")?,
            speed_direction,
            reward_parameters,
        })
    }

    /// Returns `true` for the hop task.
    pub fn hopping(&self) -> bool {
        self.hopping
    }

    /// `-1` if the override gave a negative `speed.margin`, `1` otherwise.
    ///
    /// The hop reward does not use it: a negative margin only flips the margin and
    /// resets the bounds.
    pub fn speed_direction(&self) -> f64 {
        self.speed_direction
    }
}

impl RewardTask for HopperReward {
    type Readings = HopperReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        default_reward_parameters()
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        let standing = tolerance::tolerance(r.height, &self.standing)?;
        if self.hopping {
            let hopping = tolerance::tolerance(r.speed, &self.speed)?;
            Ok(standing * hopping)
        } else {
            let small_control = (tolerance_mean(&r.control, &self.control)? + 4.0) / 5.0;
            Ok(standing * small_control)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_stand_ignores_speed() {
        let reward = HopperReward::new(false, None).unwrap();
        let readings = HopperReadings {
            height: 1.0,
            speed: -3.0,
            control: vec![0.0, 0.0, 0.0, 0.0],
        };
        assert_eq!(reward.get_reward(&readings).unwrap(), 1.0);

        // Below the standing height the sharp tolerance gives nothing.
        let readings = HopperReadings {
            height: 0.5,
            ..readings
        };
        assert_eq!(reward.get_reward(&readings).unwrap(), 0.0);
    }

    #[test]
    fn test_hop_default_margin() {
        let reward = HopperReward::new(true, None).unwrap();
        assert!(reward.hopping());
        let speed = reward.reward_parameters().get_map("speed").unwrap();
        assert_eq!(speed.get_numbers("bounds"), Ok(vec![1.0, f64::INFINITY]));

        let readings = HopperReadings {
            height: 1.0,
            speed: 0.5,
            control: vec![],
        };
        // distance 0.5 with value 0.5 at the margin.
        assert_abs_diff_eq!(reward.get_reward(&readings).unwrap(), 0.75, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_margin_keeps_speed_sign() {
        let request = RewardOverride::group("speed", param_tree! { "margin" => -2.0 });
        let reward = HopperReward::new(true, Some(&request)).unwrap();
        assert_eq!(reward.speed_direction(), -1.0);
        let speed = reward.reward_parameters().get_map("speed").unwrap();
        assert_eq!(speed.get_number("margin"), Ok(2.0));
        assert_eq!(speed.get_numbers("bounds"), Ok(vec![2.0, f64::INFINITY]));

        let mut readings = HopperReadings {
            height: 1.0,
            speed: -2.5,
            control: vec![],
        };
        // distance 4.5 is past the zero crossing of the linear sigmoid.
        assert_eq!(reward.get_reward(&readings).unwrap(), 0.0);

        readings.speed = 2.5;
        assert_eq!(reward.get_reward(&readings).unwrap(), 1.0);
    }

    #[test]
    fn test_height_group_is_overridable() {
        let request = RewardOverride::group("height", param_tree! { "margin" => 0.3 });
        let reward = HopperReward::new(false, Some(&request)).unwrap();
        let height = reward.reward_parameters().get_map("height").unwrap();
        assert_eq!(height.get_number("margin"), Ok(0.3));
    }
}
