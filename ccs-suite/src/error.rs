//! Errors in the suite.
use thiserror::Error;

/// Errors raised while resolving and building tasks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SuiteError {
    /// Domain name is not in the suite.
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    /// Task name is not defined for the domain.
    #[error("Unknown task '{task}' for domain '{domain}'")]
    UnknownTask {
        /// Domain name.
        domain: String,
        /// Requested task name.
        task: String,
    },

    /// No template source is available for the domain.
    #[error("No model template found for domain '{0}'")]
    TemplateNotFound(String),
}
