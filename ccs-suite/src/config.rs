//! Configuration of a task instance.
use anyhow::Result;
use ccs_core::{DynamicsOverrides, RewardOverride};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Options applied when loading a task with [`load`](crate::load).
///
/// ```yaml
/// time_limit: 20.0
/// reward:
///   ALL:
///     sigmoid: linear
///     margin: 10
/// dynamics:
///   length: 0.5
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
#[serde(default)]
pub struct TaskConfig {
    /// Episode length in seconds. The task's default is used if `None`.
    pub time_limit: Option<f64>,

    /// Override of the reward parameters.
    pub reward: Option<RewardOverride>,

    /// Override of the body dynamics.
    pub dynamics: Option<DynamicsOverrides>,

    /// Directory searched for `<domain>.xml` before the embedded templates.
    pub model_dir: Option<PathBuf>,
}

impl TaskConfig {
    /// Sets the episode length in seconds.
    pub fn time_limit(mut self, v: f64) -> Self {
        self.time_limit = Some(v);
        self
    }

    /// Sets the reward override.
    pub fn reward(mut self, v: RewardOverride) -> Self {
        self.reward = Some(v);
        self
    }

    /// Sets the dynamics override.
    pub fn dynamics(mut self, v: DynamicsOverrides) -> Self {
        self.dynamics = Some(v);
        self
    }

    /// Sets the template directory.
    pub fn model_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Constructs [`TaskConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TaskConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
