//! Error types for effectflow.

use thiserror::Error;

/// A `Result` alias with [`enum@Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine itself.
///
/// Failures of bound operations are *not* engine errors: they travel back into
/// the workflow as [`Resume::Fault`](crate::Resume::Fault) values and end up in
/// a [`TerminalStatus`](crate::TerminalStatus).
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to serialize or deserialize a trigger payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Workflow type was not registered in the registry.
    #[error("unknown workflow type: {0}")]
    UnknownWorkflowType(String),

    /// Workflow type was registered more than once.
    #[error("duplicate workflow type registration: {0}")]
    DuplicateWorkflowType(String),

    /// The workflow's current position cannot accept the supplied resume.
    ///
    /// The instance is left exactly where it was.
    #[error(
        "{workflow_type} cannot accept `{resume}` at position {position} (expected {expected})"
    )]
    UnexpectedResume {
        /// The workflow type identifier.
        workflow_type: &'static str,
        /// Debug rendering of the position record.
        position: String,
        /// What the position was waiting for.
        expected: &'static str,
        /// The kind of resume that was supplied.
        resume: &'static str,
    },

    /// The instance already completed or faulted.
    #[error("{workflow_type} instance already terminated")]
    AlreadyTerminated {
        /// The workflow type identifier.
        workflow_type: &'static str,
    },

    /// A run executed more effects than the configured budget allows.
    #[error("{workflow} exceeded the step limit of {limit}")]
    StepLimitExceeded {
        /// The workflow run, as `type:run_id`.
        workflow: String,
        /// The configured limit.
        limit: u32,
    },

    /// The run was abandoned through its shutdown signal.
    #[error("{workflow} was cancelled")]
    Cancelled {
        /// The workflow run, as `type:run_id`.
        workflow: String,
    },
}
