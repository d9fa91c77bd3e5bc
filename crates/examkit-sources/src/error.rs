//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while resolving exam configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested exam is not configured.
    #[error("exam '{name}' not found in config. Available: {available}")]
    UnknownExam { name: String, available: String },

    /// Neither an exam name nor a default exam was given.
    #[error("no exam selected and no default_exam configured")]
    NoExamSelected,

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {value}")]
    InvalidOverride { var: &'static str, value: String },
}
