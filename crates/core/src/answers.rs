use std::collections::HashMap;

use thiserror::Error;

use crate::model::{Answer, OptionLabel, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question {0} is not part of this attempt")]
    UnknownQuestion(QuestionId),

    #[error("answers are locked for submission")]
    Sealed,
}

/// Current selections of one attempt, at most one per question.
///
/// Once sealed (the submission claim succeeded) the store rejects edits and
/// `all_answers()` keeps returning the snapshot that was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerStore {
    order: Vec<QuestionId>,
    selections: HashMap<QuestionId, OptionLabel>,
    sealed: bool,
}

impl AnswerStore {
    #[must_use]
    pub fn new(question_ids: impl IntoIterator<Item = QuestionId>) -> Self {
        Self {
            order: question_ids.into_iter().collect(),
            selections: HashMap::new(),
            sealed: false,
        }
    }

    /// Record `option` for `question_id`, replacing any earlier selection.
    ///
    /// Returns the replaced selection, if any.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Sealed` after `seal()`, or
    /// `AnswerError::UnknownQuestion` for ids outside the attempt.
    pub fn set_answer(
        &mut self,
        question_id: QuestionId,
        option: OptionLabel,
    ) -> Result<Option<OptionLabel>, AnswerError> {
        if self.sealed {
            return Err(AnswerError::Sealed);
        }
        if !self.order.contains(&question_id) {
            return Err(AnswerError::UnknownQuestion(question_id));
        }
        Ok(self.selections.insert(question_id, option))
    }

    #[must_use]
    pub fn get_answer(&self, question_id: QuestionId) -> Option<OptionLabel> {
        self.selections.get(&question_id).copied()
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.selections.contains_key(&question_id)
    }

    /// Recorded answers in question order. Unanswered questions are absent.
    #[must_use]
    pub fn all_answers(&self) -> Vec<Answer> {
        self.order
            .iter()
            .filter_map(|id| {
                self.selections
                    .get(id)
                    .map(|option| Answer::new(*id, *option))
            })
            .collect()
    }

    /// Questions without a selection, in question order.
    #[must_use]
    pub fn unanswered(&self) -> Vec<QuestionId> {
        self.order
            .iter()
            .filter(|id| !self.selections.contains_key(id))
            .copied()
            .collect()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(len: u64) -> AnswerStore {
        AnswerStore::new((1..=len).map(QuestionId::new))
    }

    #[test]
    fn second_selection_replaces_first() {
        let mut answers = store(2);
        let q = QuestionId::new(1);
        assert_eq!(answers.set_answer(q, OptionLabel::A).unwrap(), None);
        assert_eq!(
            answers.set_answer(q, OptionLabel::C).unwrap(),
            Some(OptionLabel::A)
        );
        assert_eq!(answers.answered_count(), 1);
        assert_eq!(answers.all_answers(), vec![Answer::new(q, OptionLabel::C)]);
    }

    #[test]
    fn all_answers_follow_question_order() {
        let mut answers = store(3);
        answers.set_answer(QuestionId::new(3), OptionLabel::D).unwrap();
        answers.set_answer(QuestionId::new(1), OptionLabel::B).unwrap();
        let ids: Vec<_> = answers.all_answers().iter().map(|a| a.question_id).collect();
        assert_eq!(ids, vec![QuestionId::new(1), QuestionId::new(3)]);
        assert_eq!(answers.unanswered(), vec![QuestionId::new(2)]);
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut answers = store(1);
        let err = answers
            .set_answer(QuestionId::new(99), OptionLabel::A)
            .unwrap_err();
        assert_eq!(err, AnswerError::UnknownQuestion(QuestionId::new(99)));
        assert_eq!(answers.get_answer(QuestionId::new(99)), None);
    }

    #[test]
    fn sealed_store_rejects_edits_and_keeps_snapshot() {
        let mut answers = store(2);
        answers.set_answer(QuestionId::new(1), OptionLabel::A).unwrap();
        answers.seal();
        let err = answers
            .set_answer(QuestionId::new(1), OptionLabel::B)
            .unwrap_err();
        assert_eq!(err, AnswerError::Sealed);
        assert_eq!(answers.get_answer(QuestionId::new(1)), Some(OptionLabel::A));
    }
}
