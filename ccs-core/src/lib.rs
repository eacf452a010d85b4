#![warn(missing_docs)]
//! Reward-parameter merging and body-description templating for contextual
//! continuous-control tasks.
//!
//! Two pure building blocks live here:
//!
//! * [`merge`] folds a caller-supplied [`RewardOverride`] into the default
//!   reward-parameter tree of a task. A wildcard override replaces every group, a
//!   partial override is merged recursively.
//! * [`build_description`] patches attributes of a body description according to a
//!   declarative table of [`PatchRule`]s and a [`DynamicsOverrides`] request.
//!
//! [`tolerance`] turns one group of a merged tree into a reward in `[0, 1]`.
pub mod error;
mod dynamics;
mod merge;
mod param;
pub mod template;
pub mod tolerance;

pub use dynamics::{DynamicsKey, DynamicsOverrides};
pub use error::{ParamError, TemplateError};
pub use merge::{merge, merge_values, RewardOverride, WILDCARD_KEY};
pub use param::{ParamTree, ParamValue};
pub use template::{build_description, AttrFormat, Component, NodeSelector, PatchRule};
pub use tolerance::{tolerance, Sigmoid, ToleranceParams};
