//! Domains of the suite.
use crate::SuiteError;
use ccs_core::PatchRule;
use std::{fmt, str::FromStr};

pub mod cartpole;
pub mod cheetah;
pub mod finger;
pub mod hopper;
pub mod pendulum;
pub mod quadruped;
pub mod reacher;
pub mod walker;

/// A body in the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// See [`cartpole`].
    Cartpole,
    /// See [`cheetah`].
    Cheetah,
    /// See [`finger`].
    Finger,
    /// See [`hopper`].
    Hopper,
    /// See [`pendulum`].
    Pendulum,
    /// See [`quadruped`].
    Quadruped,
    /// See [`reacher`].
    Reacher,
    /// See [`walker`].
    Walker,
}

impl Domain {
    /// All domains in alphabetical order.
    pub const ALL: [Domain; 8] = [
        Self::Cartpole,
        Self::Cheetah,
        Self::Finger,
        Self::Hopper,
        Self::Pendulum,
        Self::Quadruped,
        Self::Reacher,
        Self::Walker,
    ];

    /// Name of the domain, also the stem of its template file.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cartpole => "cartpole",
            Self::Cheetah => "cheetah",
            Self::Finger => "finger",
            Self::Hopper => "hopper",
            Self::Pendulum => "pendulum",
            Self::Quadruped => "quadruped",
            Self::Reacher => "reacher",
            Self::Walker => "walker",
        }
    }

    /// Tasks defined for the domain.
    pub fn tasks(&self) -> &'static [&'static str] {
        match self {
            Self::Cartpole => cartpole::TASKS,
            Self::Cheetah => cheetah::TASKS,
            Self::Finger => finger::TASKS,
            Self::Hopper => hopper::TASKS,
            Self::Pendulum => pendulum::TASKS,
            Self::Quadruped => quadruped::TASKS,
            Self::Reacher => reacher::TASKS,
            Self::Walker => walker::TASKS,
        }
    }

    /// Returns `true` if `task` is defined for the domain.
    pub fn has_task(&self, task: &str) -> bool {
        self.tasks().contains(&task)
    }

    /// Default episode length in seconds.
    pub fn default_time_limit(&self) -> f64 {
        match self {
            Self::Cartpole => cartpole::DEFAULT_TIME_LIMIT,
            Self::Cheetah => cheetah::DEFAULT_TIME_LIMIT,
            Self::Finger => finger::DEFAULT_TIME_LIMIT,
            Self::Hopper => hopper::DEFAULT_TIME_LIMIT,
            Self::Pendulum => pendulum::DEFAULT_TIME_LIMIT,
            Self::Quadruped => quadruped::DEFAULT_TIME_LIMIT,
            Self::Reacher => reacher::DEFAULT_TIME_LIMIT,
            Self::Walker => walker::DEFAULT_TIME_LIMIT,
        }
    }

    /// Control timestep in seconds, `None` if the simulation timestep is used.
    pub fn control_timestep(&self) -> Option<f64> {
        match self {
            Self::Finger => Some(finger::CONTROL_TIMESTEP),
            Self::Hopper => Some(hopper::CONTROL_TIMESTEP),
            Self::Quadruped => Some(quadruped::CONTROL_TIMESTEP),
            Self::Walker => Some(walker::CONTROL_TIMESTEP),
            _ => None,
        }
    }

    /// Attribute patches applied for dynamics overrides. Empty if the body cannot be
    /// modified.
    pub fn patch_rules(&self) -> &'static [PatchRule] {
        match self {
            Self::Cartpole => cartpole::PATCH_RULES,
            Self::Cheetah => cheetah::PATCH_RULES,
            Self::Finger => finger::PATCH_RULES,
            Self::Walker => walker::PATCH_RULES,
            _ => &[],
        }
    }

    /// Returns `true` if the body accepts dynamics overrides.
    pub fn is_templated(&self) -> bool {
        !self.patch_rules().is_empty()
    }

    /// Body description compiled into the crate.
    pub fn embedded_template(&self) -> Option<&'static str> {
        match self {
            Self::Cartpole => Some(cartpole::TEMPLATE),
            Self::Cheetah => Some(cheetah::TEMPLATE),
            Self::Finger => Some(finger::TEMPLATE),
            Self::Walker => Some(walker::TEMPLATE),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Domain {
    type Err = SuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|d| d.name() == s)
            .copied()
            .ok_or_else(|| SuiteError::UnknownDomain(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain() {
        for domain in Domain::ALL {
            assert_eq!(domain.name().parse::<Domain>(), Ok(domain));
        }
        assert_eq!(
            "humanoid".parse::<Domain>(),
            Err(SuiteError::UnknownDomain("humanoid".to_string()))
        );
    }

    #[test]
    fn test_templated_domains_embed_a_template() {
        for domain in Domain::ALL {
            assert_eq!(domain.is_templated(), domain.embedded_template().is_some());
        }
        assert!(Domain::Walker.has_task("run"));
        assert!(!Domain::Walker.has_task("escape"));
    }
}
