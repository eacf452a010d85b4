//! Errors in the library.
use thiserror::Error;

/// Errors raised while merging or reading reward-parameter trees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    /// The override names groups that do not exist in the default tree.
    #[error("Invalid reward parameter key(s): {}", keys.join(", "))]
    InvalidParameterKey {
        /// Offending keys, sorted.
        keys: Vec<String>,
    },

    /// A mapping was expected but another kind of value was given.
    #[error("Expected a mapping for '{0}'")]
    NotAMapping(String),

    /// Key lookup error.
    #[error("Parameter key not found: {0}")]
    KeyNotFound(String),

    /// Value type error.
    #[error("Parameter '{key}' is not a {expected}")]
    TypeMismatch {
        /// Key of the value.
        key: String,
        /// Expected kind of value.
        expected: &'static str,
    },

    /// Unknown sigmoid name.
    #[error("Unknown sigmoid type '{0}'")]
    UnknownSigmoid(String),

    /// A value is outside of its admissible range.
    #[error("Invalid value for '{key}': {message}")]
    InvalidParameterValue {
        /// Name of the parameter.
        key: String,
        /// Description of the problem.
        message: String,
    },
}

/// Errors raised while patching a body description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// An element addressed by a patch rule does not exist in the template.
    #[error("Missing template node: {selector}")]
    MissingTemplateNode {
        /// Path of the missing element.
        selector: String,
    },

    /// A requested value cannot be written into a model file.
    #[error("Dynamics value for '{key}' must be finite")]
    NonFiniteValue {
        /// Requested key.
        key: &'static str,
    },

    /// The template is not well-formed.
    #[error("XML error: {0}")]
    Xml(String),
}
