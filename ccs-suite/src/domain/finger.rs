//! Finger: a planar two-link finger spinning a free body.
use crate::task::{apply_direction, resolve, RewardTask};
use anyhow::Result;
use ccs_core::{
    param_tree, tolerance, tolerance::DEFAULT_VALUE_AT_MARGIN, AttrFormat, Component,
    DynamicsKey, NodeSelector, ParamTree, PatchRule, RewardOverride, ToleranceParams,
};

/// Episode length in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 20.0;

/// Control timestep in seconds.
pub const CONTROL_TIMESTEP: f64 = 0.02;

/// Spinning velocity above which the reward is 1.
pub const SPIN_VELOCITY: f64 = 15.0;

/// Tasks of the domain.
pub const TASKS: &[&str] = &["spin"];

const ZERO: Component = Component::Literal("0");
const SPINNER: NodeSelector = NodeSelector(&[("worldbody", 0), ("body", 1)]);
const CAP_SIZE: AttrFormat = AttrFormat::Components(&[
    Component::Literal("0.04"),
    Component::Value {
        scale: 1.0,
        offset: -0.07,
    },
]);

pub(crate) const PATCH_RULES: &[PatchRule] = &[
    // distal
    PatchRule {
        key: DynamicsKey::Length,
        selector: NodeSelector(&[("worldbody", 0), ("body", 0), ("body", 0), ("geom", 0)]),
        attribute: "fromto",
        format: AttrFormat::Components(&[ZERO, ZERO, ZERO, ZERO, ZERO, Component::NEG_VALUE]),
    },
    // fingertip
    PatchRule {
        key: DynamicsKey::Length,
        selector: NodeSelector(&[("worldbody", 0), ("body", 0), ("body", 0), ("geom", 1)]),
        attribute: "fromto",
        format: AttrFormat::Components(&[
            ZERO,
            ZERO,
            Component::Value {
                scale: -1.0,
                offset: -0.03,
            },
            ZERO,
            ZERO,
            Component::Value {
                scale: -1.0,
                offset: 0.001,
            },
        ]),
    },
    // spinner
    PatchRule {
        key: DynamicsKey::Length,
        selector: SPINNER,
        attribute: "pos",
        format: AttrFormat::Components(&[
            Component::Value {
                scale: 1.0,
                offset: 0.04,
            },
            ZERO,
            Component::Literal("0.4"),
        ]),
    },
    // cap1
    PatchRule {
        key: DynamicsKey::Length,
        selector: NodeSelector(&[("worldbody", 0), ("body", 1), ("geom", 0)]),
        attribute: "size",
        format: CAP_SIZE,
    },
    // cap2
    PatchRule {
        key: DynamicsKey::Length,
        selector: NodeSelector(&[("worldbody", 0), ("body", 1), ("geom", 1)]),
        attribute: "size",
        format: CAP_SIZE,
    },
];

pub(crate) const TEMPLATE: &str = include_str!("../../assets/finger.xml");

/// Default reward parameters.
pub fn default_reward_parameters() -> ParamTree {
    param_tree! {
        "spin" => param_tree! {
            "bounds" => vec![SPIN_VELOCITY, f64::INFINITY],
            "margin" => SPIN_VELOCITY,
            "value_at_margin" => DEFAULT_VALUE_AT_MARGIN,
            "sigmoid" => "linear",
        },
    }
}

/// Quantities of the finger used by the reward.
#[derive(Debug, Clone, Default)]
pub struct FingerReadings {
    /// Angular velocity of the spinner hinge.
    pub hinge_velocity: f64,
}

/// Spinning reward. A negative `spin.margin` rewards spinning the other way.
#[derive(Debug, Clone)]
pub struct SpinReward {
    reward_parameters: ParamTree,
    spin: ToleranceParams,
    spin_direction: f64,
}

impl SpinReward {
    /// Creates the reward.
    pub fn new(reward_override: Option<&RewardOverride>) -> Result<Self> {
        let mut reward_parameters = resolve(default_reward_parameters(), reward_override)?;
        let spin_direction = apply_direction(&mut reward_parameters, "spin")?;
        Ok(Self {
            spin: ToleranceParams::from_group(&reward_parameters, "spin")?,
            spin_direction,
            reward_parameters,
        })
    }

    /// `1` or `-1`.
    pub fn spin_direction(&self) -> f64 {
        self.spin_direction
    }
}

impl RewardTask for SpinReward {
    type Readings = FingerReadings;

    fn default_reward_parameters(&self) -> ParamTree {
        default_reward_parameters()
    }

    fn reward_parameters(&self) -> &ParamTree {
        &self.reward_parameters
    }

    fn get_reward(&self, r: &Self::Readings) -> Result<f64> {
        Ok(tolerance(self.spin_direction * r.hinge_velocity, &self.spin)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccs_core::{build_description, DynamicsOverrides, TemplateError};

    #[test]
    fn test_wildcard_resets_spin_bounds() {
        let request = RewardOverride::all(param_tree! { "margin" => -5.0, "sigmoid" => "linear" });
        let reward = SpinReward::new(Some(&request)).unwrap();
        assert_eq!(reward.spin_direction(), -1.0);
        assert_eq!(
            reward.reward_parameters(),
            &param_tree! {
                "spin" => param_tree! {
                    "margin" => 5.0,
                    "sigmoid" => "linear",
                    "bounds" => vec![5.0, f64::INFINITY],
                },
            }
        );
        assert_eq!(reward.get_reward(&FingerReadings { hinge_velocity: -6.0 }).unwrap(), 1.0);
    }

    #[test]
    fn test_wildcard_without_margin_fails() {
        let request = RewardOverride::all(param_tree! { "sigmoid" => "linear" });
        assert!(SpinReward::new(Some(&request)).is_err());
    }

    #[test]
    fn test_default_length_reproduces_template_values() {
        let overrides = DynamicsOverrides::default().length(0.16);
        let xml = build_description(TEMPLATE, PATCH_RULES, Some(&overrides)).unwrap();
        assert!(xml.contains(r#"fromto="0 0 0 0 0 -0.16""#));
        assert!(xml.contains(r#"fromto="0 0 -0.13 0 0 -0.161""#));
        assert!(xml.contains(r#"<body name="spinner" pos="0.2 0 0.4">"#));
        assert!(xml.contains(r#"<geom name="cap1" type="capsule" size="0.04 0.09""#));
        assert!(xml.contains(r#"<geom name="cap2" type="capsule" size="0.04 0.09""#));
    }

    #[test]
    fn test_missing_spinner_fails() {
        let template = TEMPLATE.replace(r#"<body name="spinner""#, r#"<frame name="spinner""#);
        let template = template.replacen("</body>\n\n    <site", "</frame>\n\n    <site", 1);
        let overrides = DynamicsOverrides::default().length(0.2);
        assert!(matches!(
            build_description(&template, PATCH_RULES, Some(&overrides)),
            Err(TemplateError::MissingTemplateNode { .. })
        ));
    }
}
