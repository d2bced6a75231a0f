use serde::{Deserialize, Serialize};

use crate::model::QuizId;

/// Catalog entry for a quiz a user can start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub description: Option<String>,
    pub question_count: u32,
    pub duration_minutes: u32,
    pub pass_percentage: u8,
}
