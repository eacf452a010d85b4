//! Lookup of tasks by domain and task name.
use crate::{
    domain::{cartpole, cheetah, finger, hopper, pendulum, quadruped, reacher, walker},
    task::RewardTask,
    Domain, SuiteError, TaskConfig, TemplateStore,
};
use anyhow::Result;
use ccs_core::{build_description, ParamTree, RewardOverride};
use log::{info, warn};

/// Reward object of a loaded task.
#[derive(Debug, Clone)]
pub enum TaskReward {
    /// Cart-pole balance and swing-up.
    Cartpole(cartpole::BalanceReward),
    /// Cheetah run.
    Cheetah(cheetah::CheetahReward),
    /// Finger spin.
    Finger(finger::SpinReward),
    /// Hopper stand and hop.
    Hopper(hopper::HopperReward),
    /// Pendulum swing-up.
    Pendulum(pendulum::SwingUpReward),
    /// Quadruped walk and run.
    QuadrupedMove(quadruped::MoveReward),
    /// Quadruped escape.
    QuadrupedEscape(quadruped::EscapeReward),
    /// Reacher easy and hard.
    Reacher(reacher::ReacherReward),
    /// Walker stand, walk and run.
    Walker(walker::PlanarWalkerReward),
}

impl TaskReward {
    fn new(domain: Domain, task: &str, reward: Option<&RewardOverride>) -> Result<Self> {
        let reward = match (domain, task) {
            (Domain::Cartpole, "balance") => Self::Cartpole(cartpole::BalanceReward::new(false, reward)?),
            (Domain::Cartpole, "swingup") => Self::Cartpole(cartpole::BalanceReward::new(true, reward)?),
            (Domain::Cheetah, "run") => Self::Cheetah(cheetah::CheetahReward::new(reward)?),
            (Domain::Finger, "spin") => Self::Finger(finger::SpinReward::new(reward)?),
            (Domain::Hopper, "stand") => Self::Hopper(hopper::HopperReward::new(false, reward)?),
            (Domain::Hopper, "hop") => Self::Hopper(hopper::HopperReward::new(true, reward)?),
            (Domain::Pendulum, "swingup") => Self::Pendulum(pendulum::SwingUpReward::new(reward)?),
            (Domain::Quadruped, "walk") => {
                Self::QuadrupedMove(quadruped::MoveReward::new(quadruped::WALK_SPEED, reward)?)
            }
            (Domain::Quadruped, "run") => {
                Self::QuadrupedMove(quadruped::MoveReward::new(quadruped::RUN_SPEED, reward)?)
            }
            (Domain::Quadruped, "escape") => {
                Self::QuadrupedEscape(quadruped::EscapeReward::new(reward)?)
            }
            (Domain::Reacher, "easy") => {
                Self::Reacher(reacher::ReacherReward::new(reacher::BIG_TARGET, reward)?)
            }
            (Domain::Reacher, "hard") => {
                Self::Reacher(reacher::ReacherReward::new(reacher::SMALL_TARGET, reward)?)
            }
            (Domain::Walker, "stand") => Self::Walker(walker::PlanarWalkerReward::new(0.0, reward)?),
            (Domain::Walker, "walk") => {
                Self::Walker(walker::PlanarWalkerReward::new(walker::WALK_SPEED, reward)?)
            }
            (Domain::Walker, "run") => {
                Self::Walker(walker::PlanarWalkerReward::new(walker::RUN_SPEED, reward)?)
            }
            _ => {
                return Err(SuiteError::UnknownTask {
                    domain: domain.name().to_string(),
                    task: task.to_string(),
                }
                .into())
            }
        };
        Ok(reward)
    }

    /// Reward parameters in effect.
    pub fn reward_parameters(&self) -> &ParamTree {
        match self {
            Self::Cartpole(r) => r.reward_parameters(),
            Self::Cheetah(r) => r.reward_parameters(),
            Self::Finger(r) => r.reward_parameters(),
            Self::Hopper(r) => r.reward_parameters(),
            Self::Pendulum(r) => r.reward_parameters(),
            Self::QuadrupedMove(r) => r.reward_parameters(),
            Self::QuadrupedEscape(r) => r.reward_parameters(),
            Self::Reacher(r) => r.reward_parameters(),
            Self::Walker(r) => r.reward_parameters(),
        }
    }

    /// Default reward parameters of the task.
    pub fn default_reward_parameters(&self) -> ParamTree {
        match self {
            Self::Cartpole(r) => r.default_reward_parameters(),
            Self::Cheetah(r) => r.default_reward_parameters(),
            Self::Finger(r) => r.default_reward_parameters(),
            Self::Hopper(r) => r.default_reward_parameters(),
            Self::Pendulum(r) => r.default_reward_parameters(),
            Self::QuadrupedMove(r) => r.default_reward_parameters(),
            Self::QuadrupedEscape(r) => r.default_reward_parameters(),
            Self::Reacher(r) => r.default_reward_parameters(),
            Self::Walker(r) => r.default_reward_parameters(),
        }
    }
}

/// A task instance ready to be handed to a simulator.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Domain of the task.
    pub domain: Domain,

    /// Task name.
    pub task: String,

    /// Episode length in seconds.
    pub time_limit: f64,

    /// Control timestep in seconds, `None` for the simulation timestep.
    pub control_timestep: Option<f64>,

    /// Body description. `None` for a body whose description is not available.
    pub model: Option<String>,

    /// Reward of the task.
    pub reward: TaskReward,
}

/// Names of all `(domain, task)` pairs in the suite.
pub fn all_tasks() -> Vec<(&'static str, &'static str)> {
    Domain::ALL
        .iter()
        .flat_map(|d| d.tasks().iter().map(move |t| (d.name(), *t)))
        .collect()
}

/// Loads task `task` of domain `domain` with the options in `config`.
///
/// # Errors
///
/// [`SuiteError::UnknownDomain`] or [`SuiteError::UnknownTask`] for names not in the
/// suite, an invalid reward override, or a failure while building the body
/// description.
pub fn load(domain: &str, task: &str, config: &TaskConfig) -> Result<Environment> {
    let domain: Domain = domain.parse()?;
    if !domain.has_task(task) {
        return Err(SuiteError::UnknownTask {
            domain: domain.name().to_string(),
            task: task.to_string(),
        }
        .into());
    }
    info!("Load {}/{}", domain, task);

    let reward = TaskReward::new(domain, task, config.reward.as_ref())?;
    let model = build_model(domain, config)?;

    Ok(Environment {
        domain,
        task: task.to_string(),
        time_limit: config
            .time_limit
            .unwrap_or_else(|| domain.default_time_limit()),
        control_timestep: domain.control_timestep(),
        model,
        reward,
    })
}

fn build_model(domain: Domain, config: &TaskConfig) -> Result<Option<String>> {
    let store = match &config.model_dir {
        Some(dir) => TemplateStore::with_dir(dir),
        None => TemplateStore::default(),
    };
    let dynamics = config.dynamics.as_ref().filter(|d| !d.is_empty());

    if !domain.is_templated() {
        if dynamics.is_some() {
            warn!("Dynamics overrides are not supported for {}, ignored", domain);
        }
        return match store.load(domain) {
            Ok(template) => Ok(Some(template.into_owned())),
            Err(e)
                if matches!(
                    e.downcast_ref::<SuiteError>(),
                    Some(SuiteError::TemplateNotFound(_))
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        };
    }

    let template = store.load(domain)?;
    let model = build_description(&template, domain.patch_rules(), dynamics)?;
    Ok(Some(model.into_owned()))
}
