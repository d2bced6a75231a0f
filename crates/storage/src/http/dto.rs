//! Wire shapes of the remote API.

use chrono::{DateTime, Utc};
use quiz_core::model::{
    Answer, AttemptId, AttemptStatus, Pagination, QuestionId, QuizId,
    QuizSummary, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct QuizRefDto {
    pub id: QuizId,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionDto {
    pub id: QuestionId,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    #[serde(default)]
    pub correct_option: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GradedAnswerDto {
    pub question_id: QuestionId,
    #[serde(default)]
    pub selected_option: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptDto {
    pub id: AttemptId,
    pub user_id: UserId,
    pub quiz: QuizRefDto,
    pub questions: Vec<QuestionDto>,
    pub duration_minutes: u32,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub max_score: Option<u32>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub answers: Vec<GradedAnswerDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptSummaryDto {
    pub id: AttemptId,
    pub quiz: QuizRefDto,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub passed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptListDto {
    pub attempts: Vec<AttemptSummaryDto>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizListDto {
    pub quizzes: Vec<QuizSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitRequest<'a> {
    pub answers: &'a [Answer],
}
