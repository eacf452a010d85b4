#![warn(missing_docs)]
//! Contextual variants of continuous-control tasks.
//!
//! Each task exposes its reward shaping as a tree of reward parameters that can be
//! overridden when the task is loaded, and some bodies accept dynamics overrides that
//! rewrite their description.
//!
//! ```no_run
//! use ccs_core::{param_tree, DynamicsOverrides, RewardOverride};
//! use ccs_suite::{load, TaskConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = TaskConfig::default()
//!     .reward(RewardOverride::all(param_tree! { "sigmoid" => "linear", "margin" => 10.0 }))
//!     .dynamics(DynamicsOverrides::default().length(0.5));
//! let env = load("cheetah", "run", &config)?;
//! println!("{:?}", env.reward.reward_parameters());
//! # Ok(())
//! # }
//! ```
mod config;
pub mod domain;
mod error;
mod registry;
mod store;
mod task;

pub use config::TaskConfig;
pub use domain::Domain;
pub use error::SuiteError;
pub use registry::{all_tasks, load, Environment, TaskReward};
pub use store::TemplateStore;
pub use task::RewardTask;
