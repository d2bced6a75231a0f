mod answer;
mod attempt;
mod ids;
mod option;
mod page;
mod question;
mod quiz;
mod stats;

pub use answer::{Answer, GradedAnswer};
pub use attempt::{
    Attempt, AttemptError, AttemptParts, AttemptStatus, AttemptSummary, GradedOutcome, QuizRef,
};
pub use ids::{AttemptId, ParseIdError, QuestionId, QuizId, UserId};
pub use option::{OptionLabel, OptionParseError};
pub use page::{Page, Pagination};
pub use question::{AnswerKey, Question, QuestionError, QuestionOptions};
pub use quiz::QuizSummary;
pub use stats::DashboardStats;
