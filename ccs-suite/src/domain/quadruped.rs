//! Quadruped: a four-legged body that walks, runs or escapes a bowl-shaped terrain.
use crate::task::{apply_direction, resolve, RewardTask};
use anyhow::Result;
use ccs_core::{param_tree, tolerance, ParamError, ParamTree, RewardOverride, Sigmoid, ToleranceParams};

/// Episode length in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 20.0;

/// Control timestep in seconds.
pub const CONTROL_TIMESTEP: f64 = 0.02;

/// Walking speed of the walk task.
pub const WALK_SPEED: f64 = 0.5;

/// Running speed of the run task.
pub const RUN_SPEED: f64 = 5.0;

/// Tasks of the domain.
pub const TASKS: &[&str] = &["walk", "run", "escape"];

/// Reward for keeping the torso within `deviation_angle` degrees of upright.
fn upright_reward(torso_upright: f64, deviation_angle: f64) -> Result<f64, ParamError> {
    let deviation = deviation_angle.to_radians().cos();
    let params = ToleranceParams::default()
        .bounds(deviation, f64::INFINITY)
        .sigmoid(Sigmoid::Linear)
        .margin(1.0 + deviation)
        .value_at_margin(0.0);
    tolerance(torso_upright, &params)
}

/// Default reward parameters of the move tasks.
pub fn move_reward_parameters(desired_speed: f64) -> ParamTree {
    param_tree! {
        "torso_velocity" => param_tree! {
            "sigmoid" => "linear",
            "margin" => desired_speed,
            "value_at_margin" => 0.5,
        },
    }
}

/// Default reward parameters of the escape task.
pub fn escape_reward_parameters() -> ParamTree {
    param_tree! {
        "origin_distance" => param_tree! {
            "sigmoid" => "linear",
            "margin" => 30.0,
            "value_at_margin" => 0.0,
        },
    }
}

/// Quantities of the quadruped used by the move rewards.
#[derive(Debug, Clone, Default)]
pub struct MoveReadings {
    /// Projection of the torso's z-axis onto the world z-axis.
    pub torso_upright: f64,
    /// Velocity of the torso in its local frame.
    pub torso_velocity: [f64; 3],
}

/// Walking or running reward. A negative `torso_velocity.margin` rewards moving
/// backward.
#[derive(Debug, Clone)]
pub struct MoveReward {
    desired_speed: f64,
    reward_parameters: ParamTree,
    torso_velocity: ToleranceParams,
    speed_direction: f64,
}

impl MoveReward {
    /// Creates the reward.
    pub fn new(desired_speed: f64, reward_override: Option<&RewardOverride>) -> Result<Self> {
        let mut reward_parameters = resolve(move_reward_parameters(desired_speed), reward_override)?;
        let speed_direction = apply_direction(&mut reward_parameters, "torso_velocity")?;
        Ok(Self {
            desired_speed,
            torso_velocity: ToleranceParams::from_group(&reward_parameters, "torso_velocity")?,
            speed_direction,
            reward_parameters,
        })
    }

    /// Speed given by the task.
    pub fn desired_speed(&self) -> f64 {
        self.desired_speed
    }

    /// `1` or `-1`.
    pub fn speed_direction(&self) -> f64 {
        self.speed_direction
    }
}

impl RewardTask for MoveReward {
    type Readings = MoveReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        move_reward_parameters(self.desired_speed)
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        let move_reward =
            tolerance(self.speed_direction * r.torso_velocity[0], &self.torso_velocity)?;
        Ok(upright_reward(r.torso_upright, 0.0)? * move_reward)
    }
}

/// Quantities of the quadruped used by the escape reward.
#[derive(Debug, Clone, Default)]
pub struct EscapeReadings {
    /// Projection of the torso's z-axis onto the world z-axis.
    pub torso_upright: f64,
    /// Horizontal distance of the torso from the origin.
    pub origin_distance: f64,
    /// Radius of the terrain, the lower bound of the rewarded distance.
    pub arena_radius: f64,
}

/// Reward for moving away from the origin.
#[derive(Debug, Clone)]
pub struct EscapeReward {
    reward_parameters: ParamTree,
    origin_distance: ToleranceParams,
}

impl EscapeReward {
    /// Creates the reward.
    pub fn new(reward_override: Option<&RewardOverride>) -> Result<Self> {
        let reward_parameters = resolve(escape_reward_parameters(), reward_override)?;
        Ok(Self {
            origin_distance: ToleranceParams::from_group(&reward_parameters, "origin_distance")?,
            reward_parameters,
        })
    }
}

impl RewardTask for EscapeReward {
    type Readings = EscapeReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        escape_reward_parameters()
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        let params = self
            .origin_distance
            .clone()
            .bounds(r.arena_radius, f64::INFINITY);
        let escape_reward = tolerance(r.origin_distance, &params)?;
        Ok(upright_reward(r.torso_upright, 20.0)? * escape_reward)
    }
}
