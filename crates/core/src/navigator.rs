use crate::model::Question;

/// Cursor over the fixed, ordered question list of an attempt.
///
/// The index is always inside `[0, len - 1]`; moving past either end is a
/// no-op. The navigator never touches recorded answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionNavigator {
    questions: Vec<Question>,
    index: usize,
}

impl QuestionNavigator {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            index: 0,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// True when `next()` cannot advance.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Move forward one question. Returns whether the index changed.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Move back one question. Returns whether the index changed.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Jump to `index`, clamped to the last question.
    pub fn go_to(&mut self, index: usize) {
        self.index = index.min(self.questions.len().saturating_sub(1));
    }
}
