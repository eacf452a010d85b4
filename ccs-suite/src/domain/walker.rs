//! Planar walker: a biped that stands, walks or runs.
use crate::task::{apply_direction, resolve, RewardTask};
use anyhow::Result;
use ccs_core::{
    param_tree, tolerance, AttrFormat, Component, DynamicsKey, NodeSelector, ParamTree,
    PatchRule, RewardOverride, ToleranceParams,
};

/// Episode length in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 25.0;

/// Control timestep in seconds.
pub const CONTROL_TIMESTEP: f64 = 0.025;

/// Minimal torso height to be considered standing.
pub const STAND_HEIGHT: f64 = 1.2;

/// Speed of the walk task.
pub const WALK_SPEED: f64 = 1.0;

/// Speed of the run task.
pub const RUN_SPEED: f64 = 8.0;

/// Tasks of the domain.
pub const TASKS: &[&str] = &["stand", "walk", "run"];

pub(crate) const PATCH_RULES: &[PatchRule] = &[PatchRule {
    key: DynamicsKey::Length,
    selector: NodeSelector(&[("worldbody", 0), ("body", 0), ("geom", 0)]),
    attribute: "size",
    format: AttrFormat::Components(&[Component::Literal("0.07"), Component::VALUE]),
}];

pub(crate) const TEMPLATE: &str = include_str!("../../assets/walker.xml");

/// Default reward parameters for a task moving at `move_speed`.
pub fn default_reward_parameters(move_speed: f64) -> ParamTree {
    param_tree! {
        "horizontal_velocity" => param_tree! {
            "sigmoid" => "linear",
            "margin" => move_speed / 2.0,
            "value_at_margin" => 0.5,
        },
    }
}

/// Quantities of the walker used by the reward.
#[derive(Debug, Clone, Default)]
pub struct WalkerReadings {
    /// Height of the torso.
    pub torso_height: f64,
    /// Projection of the torso's z-axis onto the world z-axis.
    pub torso_upright: f64,
    /// Horizontal velocity of the center of mass.
    pub horizontal_velocity: f64,
}

/// Standing and moving reward. A zero `move_speed` rewards standing only.
#[derive(Debug, Clone)]
pub struct PlanarWalkerReward {
    move_speed: f64,
    reward_parameters: ParamTree,
    standing: ToleranceParams,
    horizontal_velocity: ToleranceParams,
    speed_direction: f64,
}

impl PlanarWalkerReward {
    /// Creates the reward.
    pub fn new(move_speed: f64, reward_override: Option<&RewardOverride>) -> Result<Self> {
        let mut reward_parameters = resolve(default_reward_parameters(move_speed), reward_override)?;
        let speed_direction = apply_direction(&mut reward_parameters, "horizontal_velocity")?;
        Ok(Self {
            move_speed,
            standing: ToleranceParams::default()
                .bounds(STAND_HEIGHT, f64::INFINITY)
                .margin(STAND_HEIGHT / 2.0),
            horizontal_velocity: ToleranceParams::from_group(
                &reward_parameters,
                "horizontal_velocity",
            )?,
            speed_direction,
            reward_parameters,
        })
    }

    /// Speed given by the task.
    pub fn move_speed(&self) -> f64 {
        self.move_speed
    }

    /// `1` or `-1`.
    pub fn speed_direction(&self) -> f64 {
        self.speed_direction
    }
}

impl RewardTask for PlanarWalkerReward {
    type Readings = WalkerReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        default_reward_parameters(self.move_speed)
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        let standing = tolerance(r.torso_height, &self.standing)?;
        let upright = (1.0 + r.torso_upright) / 2.0;
        let stand_reward = (3.0 * standing + upright) / 4.0;
        if self.move_speed == 0.0 {
            return Ok(stand_reward);
        }
        let move_reward = tolerance(
            self.speed_direction * r.horizontal_velocity,
            &self.horizontal_velocity,
        )?;
        Ok(stand_reward * (5.0 * move_reward + 1.0) / 6.0)
    }
}
