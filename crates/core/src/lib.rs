#![forbid(unsafe_code)]

pub mod answers;
pub mod error;
pub mod model;
pub mod navigator;
pub mod results;
pub mod submission;
pub mod time;
pub mod timer;

pub use answers::{AnswerError, AnswerStore};
pub use error::Error;
pub use navigator::QuestionNavigator;
pub use results::{Correctness, ResultRow, project_results};
pub use submission::{
    SubmissionEvent, SubmissionState, SubmitConfirmation, SubmitTrigger, TransitionError,
};
pub use time::Clock;
pub use timer::{AttemptTimer, LOW_TIME_THRESHOLD_SECS, TickOutcome, TimerSnapshot};
