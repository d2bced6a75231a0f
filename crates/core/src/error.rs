use thiserror::Error;

use crate::answers::AnswerError;
use crate::model::{AttemptError, OptionParseError, QuestionError};
use crate::submission::TransitionError;

/// Umbrella for every domain error in this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    OptionLabel(#[from] OptionParseError),
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
