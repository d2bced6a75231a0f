//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::AnswerError;
use quiz_core::model::AttemptId;
use storage::ApiError;

/// Errors emitted by the attempt session and attempt-facing services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error("attempt {0} has not been submitted yet")]
    NotSubmitted(AttemptId),
    #[error("submission was not confirmed")]
    NotConfirmed,
    #[error("submission task ended without a result")]
    Interrupted,
}

impl SessionError {
    /// Text shown to the user when an operation fails.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Api(ApiError::NotFound) => "This attempt no longer exists.".into(),
            SessionError::Api(ApiError::Conflict(_)) => {
                "The server already closed this attempt.".into()
            }
            SessionError::Api(err) if err.is_retryable() => {
                "Could not reach the server. Your answers are kept; try again.".into()
            }
            SessionError::Api(_) => "The server rejected the request.".into(),
            SessionError::Answer(AnswerError::Sealed) => {
                "Answers can no longer be changed.".into()
            }
            SessionError::Answer(_) => "That question is not part of this attempt.".into(),
            SessionError::NotSubmitted(_) => "Results are available after submission.".into(),
            SessionError::NotConfirmed => "Confirm the submission first.".into(),
            SessionError::Interrupted => "Submission was interrupted; try again.".into(),
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Api(err) => err.is_retryable(),
            SessionError::Interrupted => true,
            _ => false,
        }
    }
}

/// Errors emitted while reading client configuration.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {raw:?}")]
    InvalidSeconds { var: &'static str, raw: String },
    #[error("invalid API base URL {raw:?}")]
    InvalidUrl { raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
