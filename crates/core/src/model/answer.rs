use serde::{Deserialize, Serialize};

use crate::model::{OptionLabel, QuestionId};

/// A recorded selection for one question of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub selected_option: OptionLabel,
}

impl Answer {
    #[must_use]
    pub fn new(question_id: QuestionId, selected_option: OptionLabel) -> Self {
        Self {
            question_id,
            selected_option,
        }
    }
}

/// Server-side grading of a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id: QuestionId,
    pub selected_option: Option<OptionLabel>,
    pub is_correct: bool,
}
