use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{AttemptId, GradedAnswer, Question, QuestionId, QuizId, UserId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt has no questions")]
    NoQuestions,

    #[error("duplicate question {0} in attempt")]
    DuplicateQuestion(QuestionId),

    #[error("attempt duration must be positive")]
    InvalidDuration,

    #[error("in-progress attempt exposes the answer key of question {0}")]
    AnswerKeyExposed(QuestionId),

    #[error("in-progress attempt carries a graded outcome")]
    PrematureOutcome,

    #[error("completed_at is before started_at")]
    InvalidTimeRange,
}

//
// ─── STATUS / OUTCOME ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
}

/// Quiz an attempt was started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRef {
    pub id: QuizId,
    pub title: String,
}

/// Score as computed by the server. The client only renders it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradedOutcome {
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub passed: bool,
}

//
// ─── ATTEMPT ──────────────────────────────────────────────────────────────────
//

/// Raw attempt fields as received from the server, before validation.
#[derive(Debug, Clone)]
pub struct AttemptParts {
    pub id: AttemptId,
    pub user_id: UserId,
    pub quiz: QuizRef,
    pub questions: Vec<Question>,
    pub duration_minutes: u32,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub outcome: Option<GradedOutcome>,
    pub graded_answers: Vec<GradedAnswer>,
}

/// One user's timed instance of a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    id: AttemptId,
    user_id: UserId,
    quiz: QuizRef,
    questions: Vec<Question>,
    duration_minutes: u32,
    status: AttemptStatus,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    outcome: Option<GradedOutcome>,
    graded_answers: Vec<GradedAnswer>,
}

impl Attempt {
    /// Validate server-provided fields into an attempt.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` when the question list is empty or has duplicates,
    /// the duration is zero, the time range is inverted, or an in-progress
    /// attempt carries grading data.
    pub fn from_parts(parts: AttemptParts) -> Result<Self, AttemptError> {
        if parts.questions.is_empty() {
            return Err(AttemptError::NoQuestions);
        }
        if parts.duration_minutes == 0 {
            return Err(AttemptError::InvalidDuration);
        }
        let mut seen = HashSet::with_capacity(parts.questions.len());
        for question in &parts.questions {
            if !seen.insert(question.id()) {
                return Err(AttemptError::DuplicateQuestion(question.id()));
            }
        }
        if parts
            .completed_at
            .is_some_and(|completed_at| completed_at < parts.started_at)
        {
            return Err(AttemptError::InvalidTimeRange);
        }
        if parts.status == AttemptStatus::InProgress {
            if let Some(question) = parts.questions.iter().find(|q| q.answer_key().is_some()) {
                return Err(AttemptError::AnswerKeyExposed(question.id()));
            }
            if parts.outcome.is_some() || !parts.graded_answers.is_empty() {
                return Err(AttemptError::PrematureOutcome);
            }
        }

        Ok(Self {
            id: parts.id,
            user_id: parts.user_id,
            quiz: parts.quiz,
            questions: parts.questions,
            duration_minutes: parts.duration_minutes,
            status: parts.status,
            started_at: parts.started_at,
            completed_at: parts.completed_at,
            outcome: parts.outcome,
            graded_answers: parts.graded_answers,
        })
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizRef {
        &self.quiz
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Timer budget in whole seconds.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    #[must_use]
    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.status == AttemptStatus::Submitted
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&GradedOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn graded_answers(&self) -> &[GradedAnswer] {
        &self.graded_answers
    }

    #[must_use]
    pub fn graded_answer(&self, question_id: QuestionId) -> Option<&GradedAnswer> {
        self.graded_answers
            .iter()
            .find(|answer| answer.question_id == question_id)
    }
}

/// Attempt row shown in the "my attempts" list.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptSummary {
    pub id: AttemptId,
    pub quiz: QuizRef,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub percentage: Option<f64>,
    pub passed: Option<bool>,
}

impl AttemptSummary {
    #[must_use]
    pub fn from_attempt(attempt: &Attempt) -> Self {
        Self {
            id: attempt.id(),
            quiz: attempt.quiz().clone(),
            status: attempt.status(),
            started_at: attempt.started_at(),
            completed_at: attempt.completed_at(),
            percentage: attempt.outcome().map(|outcome| outcome.percentage),
            passed: attempt.outcome().map(|outcome| outcome.passed),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
