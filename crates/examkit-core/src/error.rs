//! Engine and source error types.
//!
//! `ExamError` covers everything the session state machine can reject.
//! `SourceError` covers question bank delivery; it is defined here so the
//! loader can downcast and classify failures without string matching.

use std::fmt;

use thiserror::Error;

use crate::model::{Answer, QuestionKind};

/// The session operations, used to label rejected transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    SelectAnswer,
    Advance,
    GoToPrevious,
    Tick,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Start => write!(f, "start"),
            Operation::SelectAnswer => write!(f, "select an answer"),
            Operation::Advance => write!(f, "advance"),
            Operation::GoToPrevious => write!(f, "go to the previous question"),
            Operation::Tick => write!(f, "tick"),
        }
    }
}

/// Errors returned by the session state machine and the answer evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExamError {
    /// The operation is not allowed in the session's current state.
    #[error("cannot {operation}: {reason}")]
    InvalidTransition { operation: Operation, reason: String },

    /// `advance` was called before any answer was selected.
    #[error("no answer selected for question {question_id}")]
    NoSelection { question_id: u32 },

    /// The submitted answer has the wrong shape for the question.
    #[error("{submitted} is not a valid answer to {expected} question {question_id}")]
    TypeMismatch {
        question_id: u32,
        expected: QuestionKind,
        submitted: Answer,
    },

    /// The driver task owning the session has stopped.
    #[error("exam driver has shut down")]
    DriverClosed,
}

impl ExamError {
    pub(crate) fn invalid(operation: Operation, reason: impl Into<String>) -> Self {
        ExamError::InvalidTransition {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the caller can ignore this error and carry on.
    ///
    /// `TypeMismatch` means the adapter routed a malformed intent and
    /// `DriverClosed` means there is no session left to talk to.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExamError::InvalidTransition { .. } | ExamError::NoSelection { .. }
        )
    }
}

/// Errors that can occur while obtaining a question bank.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Nothing exists at the given location.
    #[error("question bank not found: {0}")]
    NotFound(String),

    /// The bank exists but could not be read.
    #[error("failed to read question bank {location}: {message}")]
    Read { location: String, message: String },

    /// The payload is not a question bank.
    #[error("malformed question bank: {0}")]
    Malformed(String),

    /// A question violates the basic shape rules.
    #[error("invalid question {id}: {reason}")]
    InvalidQuestion { id: u32, reason: String },

    /// The server answered with an error status.
    #[error("HTTP {status} while fetching {url}")]
    Http { status: u16, url: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl SourceError {
    /// Returns `true` if fetching again could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Timeout(_) | SourceError::Network(_) => true,
            SourceError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
