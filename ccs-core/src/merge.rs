//! Merging of reward-parameter overrides into default trees.
//!
//! An override request is either a wildcard, whose option mapping replaces every
//! group of the default tree wholesale, or a partial mapping keyed by group names,
//! which is merged recursively into the defaults. Raw requests keyed by
//! [`WILDCARD_KEY`] are turned into [`RewardOverride::Wildcard`] on conversion.
//!
//! ```rust
//! use ccs_core::{merge, param_tree, RewardOverride};
//!
//! let defaults = param_tree! {
//!     "speed" => param_tree! { "margin" => 1.0, "sigmoid" => "linear" },
//! };
//! let request = RewardOverride::Partial(param_tree! {
//!     "speed" => param_tree! { "margin" => -2.0 },
//! });
//! let merged = merge(&defaults, Some(&request)).unwrap();
//! let speed = merged.get_map("speed").unwrap();
//! assert_eq!(speed.get_number("margin").unwrap(), -2.0);
//! assert_eq!(speed.get_text("sigmoid").unwrap(), "linear");
//! ```
use crate::{
    error::ParamError,
    param::{ParamTree, ParamValue},
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Key that marks a raw override request as a wildcard.
pub const WILDCARD_KEY: &str = "ALL";

/// A request to override the reward parameters of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParamTree", into = "ParamTree")]
pub enum RewardOverride {
    /// Options assigned verbatim to every group of the default tree.
    Wildcard(ParamTree),

    /// Group name to partial option mapping, merged recursively.
    Partial(ParamTree),
}

impl RewardOverride {
    /// Wildcard override from an option mapping.
    pub fn all(options: ParamTree) -> Self {
        Self::Wildcard(options)
    }

    /// Partial override for a single group.
    pub fn group(name: impl Into<String>, options: ParamTree) -> Self {
        let mut groups = ParamTree::empty();
        groups.insert(name, options);
        Self::Partial(groups)
    }

    /// Adds a group to a partial override. Has no effect on a wildcard.
    pub fn with_group(mut self, name: impl Into<String>, options: ParamTree) -> Self {
        if let Self::Partial(groups) = &mut self {
            groups.insert(name, options);
        }
        self
    }
}

impl TryFrom<ParamTree> for RewardOverride {
    type Error = ParamError;

    fn try_from(mut raw: ParamTree) -> Result<Self, Self::Error> {
        match raw.remove(WILDCARD_KEY) {
            Some(ParamValue::Map(options)) => {
                if !raw.is_empty() {
                    debug!(
                        "Wildcard override present, ignoring keys {:?}",
                        raw.keys().collect::<Vec<_>>()
                    );
                }
                Ok(Self::Wildcard(options))
            }
            Some(_) => Err(ParamError::NotAMapping(WILDCARD_KEY.to_string())),
            None => Ok(Self::Partial(raw)),
        }
    }
}

impl From<RewardOverride> for ParamTree {
    fn from(o: RewardOverride) -> Self {
        match o {
            RewardOverride::Wildcard(options) => {
                let mut raw = ParamTree::empty();
                raw.insert(WILDCARD_KEY, options);
                raw
            }
            RewardOverride::Partial(groups) => groups,
        }
    }
}

/// Merges an override request into a default tree.
///
/// A `None` request borrows the default tree as-is. Otherwise a fresh tree is
/// returned and `defaults` is left untouched.
///
/// # Errors
///
/// [`ParamError::InvalidParameterKey`] if a partial request names groups absent from
/// `defaults`. Nothing is merged in that case.
pub fn merge<'a>(
    defaults: &'a ParamTree,
    request: Option<&RewardOverride>,
) -> Result<Cow<'a, ParamTree>, ParamError> {
    let request = match request {
        None => return Ok(Cow::Borrowed(defaults)),
        Some(request) => request,
    };

    match request {
        RewardOverride::Wildcard(options) => {
            trace!("Applying wildcard override {:?}", options);
            Ok(Cow::Owned(
                defaults
                    .keys()
                    .map(|group| (group.clone(), ParamValue::Map(options.clone())))
                    .collect(),
            ))
        }
        RewardOverride::Partial(groups) => {
            let invalid: Vec<String> = groups
                .keys()
                .filter(|k| !defaults.contains_key(k))
                .cloned()
                .collect();
            if !invalid.is_empty() {
                return Err(ParamError::InvalidParameterKey { keys: invalid });
            }
            trace!("Merging partial override {:?}", groups);
            Ok(Cow::Owned(merge_values(defaults, groups)))
        }
    }
}

/// Recursively merges `overlay` into a copy of `base`.
///
/// Where both sides hold a mapping the merge recurses; otherwise the overlay value
/// replaces the base value. Keys only in `base` are kept, keys only in `overlay` are
/// added.
pub fn merge_values(base: &ParamTree, overlay: &ParamTree) -> ParamTree {
    let mut merged = base.clone();
    for (k, v) in overlay.iter() {
        let value = match (merged.get(k), v) {
            (Some(ParamValue::Map(b)), ParamValue::Map(o)) => ParamValue::Map(merge_values(b, o)),
            _ => v.clone(),
        };
        merged.insert(k.clone(), value);
    }
    merged
}
