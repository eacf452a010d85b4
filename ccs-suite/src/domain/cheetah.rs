//! Cheetah: a planar biped running forward (or backward).
use crate::task::{apply_direction, resolve, RewardTask};
use anyhow::Result;
use ccs_core::{
    param_tree, tolerance, tolerance::DEFAULT_VALUE_AT_MARGIN, AttrFormat, Component,
    DynamicsKey, NodeSelector, ParamTree, PatchRule, RewardOverride, ToleranceParams,
};

/// Episode length in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 10.0;

/// Running speed above which the reward is 1.
pub const RUN_SPEED: f64 = 10.0;

/// Tasks of the domain.
pub const TASKS: &[&str] = &["run"];

const ZERO: Component = Component::Literal("0");

pub(crate) const PATCH_RULES: &[PatchRule] = &[
    // torso
    PatchRule {
        key: DynamicsKey::Length,
        selector: NodeSelector(&[("worldbody", 0), ("body", 0), ("geom", 0)]),
        attribute: "fromto",
        format: AttrFormat::Components(&[
            Component::NEG_VALUE,
            ZERO,
            ZERO,
            Component::VALUE,
            ZERO,
            ZERO,
        ]),
    },
    // head
    PatchRule {
        key: DynamicsKey::Length,
        selector: NodeSelector(&[("worldbody", 0), ("body", 0), ("geom", 1)]),
        attribute: "pos",
        format: AttrFormat::Components(&[
            Component::Value {
                scale: 1.0,
                offset: 0.1,
            },
            ZERO,
            Component::Literal("0.1"),
        ]),
    },
    // bthigh
    PatchRule {
        key: DynamicsKey::Length,
        selector: NodeSelector(&[("worldbody", 0), ("body", 0), ("body", 0)]),
        attribute: "pos",
        format: AttrFormat::Components(&[Component::NEG_VALUE, ZERO, ZERO]),
    },
    // fthigh
    PatchRule {
        key: DynamicsKey::Length,
        selector: NodeSelector(&[("worldbody", 0), ("body", 0), ("body", 1)]),
        attribute: "pos",
        format: AttrFormat::Components(&[Component::VALUE, ZERO, ZERO]),
    },
];

pub(crate) const TEMPLATE: &str = include_str!("../../assets/cheetah.xml");

/// Default reward parameters.
pub fn default_reward_parameters() -> ParamTree {
    param_tree! {
        "speed" => param_tree! {
            "bounds" => vec![RUN_SPEED, f64::INFINITY],
            "margin" => RUN_SPEED,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
            "sigmoid" => "linear",
        },
    }
}

/// Quantities of the cheetah used by the reward.
#[derive(Debug, Clone, Default)]
pub struct CheetahReadings {
    /// Horizontal speed of the torso.
    pub speed: f64,
}

/// Running reward. A negative `speed.margin` rewards running backward.
#[derive(Debug, Clone)]
pub struct CheetahReward {
    reward_parameters: ParamTree,
    speed: ToleranceParams,
    speed_direction: f64,
}

impl CheetahReward {
    /// Creates the reward.
    pub fn new(reward_override: Option<&RewardOverride>) -> Result<Self> {
        let mut reward_parameters = resolve(default_reward_parameters(), reward_override)?;
        let speed_direction = apply_direction(&mut reward_parameters, "speed")?;
        Ok(Self {
            speed: ToleranceParams::from_group(&reward_parameters, "speed")?,
            speed_direction,
            reward_parameters,
        })
    }

    /// `1` when running forward is rewarded, `-1` for backward.
    pub fn speed_direction(&self) -> f64 {
        self.speed_direction
    }
}

impl RewardTask for CheetahReward {
    type Readings = CheetahReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        default_reward_parameters()
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        Ok(tolerance(self.speed_direction * r.speed, &self.speed)?)
    }
}
