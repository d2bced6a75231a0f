use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{OptionLabel, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {0} has an empty prompt")]
    EmptyPrompt(QuestionId),

    #[error("question {question_id} has an empty option {label}")]
    EmptyOption {
        question_id: QuestionId,
        label: OptionLabel,
    },
}

/// The four option texts of a question, addressed by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions([String; 4]);

impl QuestionOptions {
    #[must_use]
    pub fn new(a: impl Into<String>, b: impl Into<String>, c: impl Into<String>, d: impl Into<String>) -> Self {
        Self([a.into(), b.into(), c.into(), d.into()])
    }

    #[must_use]
    pub fn get(&self, label: OptionLabel) -> &str {
        &self.0[label.index()]
    }

    /// Labelled options in A–D order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        OptionLabel::ALL
            .into_iter()
            .map(move |label| (label, self.get(label)))
    }
}

/// Authoritative grading data for a question. Only present after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    pub correct_option: OptionLabel,
    pub explanation: Option<String>,
}

/// Attempt-scoped snapshot of a question.
///
/// The snapshot is fixed when the attempt starts; later edits to the source
/// quiz never reach an attempt that is already running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: QuestionOptions,
    answer_key: Option<AnswerKey>,
}

impl Question {
    /// Build a question snapshot without grading data.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or any option is blank.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: QuestionOptions,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt(id));
        }
        for (label, text) in options.iter() {
            if text.trim().is_empty() {
                return Err(QuestionError::EmptyOption {
                    question_id: id,
                    label,
                });
            }
        }
        Ok(Self {
            id,
            prompt,
            options,
            answer_key: None,
        })
    }

    #[must_use]
    pub fn with_answer_key(mut self, key: AnswerKey) -> Self {
        self.answer_key = Some(key);
        self
    }

    /// Copy of this snapshot with the answer key removed.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            answer_key: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &QuestionOptions {
        &self.options
    }

    #[must_use]
    pub fn answer_key(&self) -> Option<&AnswerKey> {
        self.answer_key.as_ref()
    }
}
