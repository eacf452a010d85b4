//! Cart-pole: swing up and balance an unactuated pole by moving a cart.
use crate::task::{resolve, RewardTask};
use anyhow::Result;
use ccs_core::{
    param_tree,
    tolerance::{self, tolerance_min, DEFAULT_VALUE_AT_MARGIN},
    AttrFormat, Component, DynamicsKey, NodeSelector, ParamTree, PatchRule, RewardOverride,
    ToleranceParams,
};

/// Episode length in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 10.0;

/// Tasks of the domain.
pub const TASKS: &[&str] = &["balance", "swingup"];

const POLE: NodeSelector = NodeSelector(&[("worldbody", 0), ("body", 0), ("body", 0), ("geom", 0)]);

pub(crate) const PATCH_RULES: &[PatchRule] = &[
    PatchRule {
        key: DynamicsKey::Mass,
        selector: POLE,
        attribute: "mass",
        format: AttrFormat::Scalar,
    },
    PatchRule {
        key: DynamicsKey::Size,
        selector: POLE,
        attribute: "size",
        format: AttrFormat::Scalar,
    },
    PatchRule {
        key: DynamicsKey::Length,
        selector: POLE,
        attribute: "fromto",
        format: AttrFormat::Components(&[
            Component::Literal("0"),
            Component::Literal("0"),
            Component::Literal("0"),
            Component::Literal("0"),
            Component::Literal("0"),
            Component::VALUE,
        ]),
    },
];

pub(crate) const TEMPLATE: &str = include_str!("../../assets/cartpole.xml");

/// Default reward parameters.
pub fn default_reward_parameters() -> ParamTree {
    param_tree! {
        "centered" => param_tree! {
            "sigmoid" => "gaussian",
            "margin" => 2.0,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
        },
        "small_control" => param_tree! {
            "sigmoid" => "quadratic",
            "margin" => 1.0,
            "value_at_margin" => 0.0,
        },
        "small_velocity" => param_tree! {
            "sigmoid" => "gaussian",
            "margin" => 5.0,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
        },
    }
}

/// Quantities of the cart-pole used by the reward.
#[derive(Debug, Clone, Default)]
pub struct CartpoleReadings {
    /// Cosine of the angle of each pole.
    pub pole_angle_cosine: Vec<f64>,
    /// Position of the cart.
    pub cart_position: f64,
    /// Control applied to the cart.
    pub control: f64,
    /// Angular velocity of each pole.
    pub angular_vel: Vec<f64>,
}

/// Smooth balance reward with configurable shaping.
#[derive(Debug, Clone)]
pub struct BalanceReward {
    swing_up: bool,
    reward_parameters: ParamTree,
    centered: ToleranceParams,
    small_control: ToleranceParams,
    small_velocity: ToleranceParams,
}

impl BalanceReward {
    /// Creates the reward. `swing_up` selects the swing-up variant of the task.
    pub fn new(swing_up: bool, reward_override: Option<&RewardOverride>) -> Result<Self> {
        let reward_parameters = resolve(default_reward_parameters(), reward_override)?;
        Ok(Self {
            swing_up,
            centered: ToleranceParams::from_group(&reward_parameters, "centered")?,
            small_control: ToleranceParams::from_group(&reward_parameters, "small_control")?,
            small_velocity: ToleranceParams::from_group(&reward_parameters, "small_velocity")?,
            reward_parameters,
        })
    }

    /// Returns `true` for the swing-up variant.
    pub fn swing_up(&self) -> bool {
        self.swing_up
    }
}

impl RewardTask for BalanceReward {
    type Readings = CartpoleReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        default_reward_parameters()
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        let n_poles = r.pole_angle_cosine.len().max(1) as f64;
        let upright = r
            .pole_angle_cosine
            .iter()
            .map(|c| (c + 1.0) / 2.0)
            .sum::<f64>()
            / n_poles;
        let centered = (1.0 + tolerance::tolerance(r.cart_position, &self.centered)?) / 2.0;
        let small_control = (4.0 + tolerance::tolerance(r.control, &self.small_control)?) / 5.0;
        let small_velocity = (1.0 + tolerance_min(&r.angular_vel, &self.small_velocity)?) / 2.0;
        Ok(upright * small_control * small_velocity * centered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ccs_core::{build_description, DynamicsOverrides};

    #[test]
    fn test_upright_at_rest_is_one() {
        let reward = BalanceReward::new(false, None).unwrap();
        let readings = CartpoleReadings {
            pole_angle_cosine: vec![1.0],
            angular_vel: vec![0.0],
            ..Default::default()
        };
        assert_abs_diff_eq!(reward.get_reward(&readings).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_off_center_cart_is_penalized() {
        let reward = BalanceReward::new(true, None).unwrap();
        let readings = CartpoleReadings {
            pole_angle_cosine: vec![1.0],
            cart_position: 2.0,
            control: 0.0,
            angular_vel: vec![0.0],
        };
        // centered = (1 + 0.1) / 2 at the margin.
        assert_abs_diff_eq!(reward.get_reward(&readings).unwrap(), 0.55, epsilon = 1e-9);
    }

    #[test]
    fn test_pole_is_patched() {
        let overrides = DynamicsOverrides::default().mass(0.2).size(0.05).length(1.5);
        let xml = build_description(TEMPLATE, PATCH_RULES, Some(&overrides)).unwrap();
        assert!(xml.contains(r#"<geom name="pole_1" mass="0.2" size="0.05" fromto="0 0 0 0 0 1.5"/>"#));
        // The cart geom keeps its mass.
        assert!(xml.contains(r#"material="self"  mass="1"/>"#));
    }
}
