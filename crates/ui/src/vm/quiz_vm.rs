use quiz_core::model::{QuizId, QuizSummary};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizCardVm {
    pub id: QuizId,
    pub title: String,
    pub description: Option<String>,
    pub questions_label: String,
    pub duration_label: String,
    pub pass_label: String,
}

impl From<&QuizSummary> for QuizCardVm {
    fn from(quiz: &QuizSummary) -> Self {
        let questions_label = match quiz.question_count {
            1 => "1 question".to_string(),
            n => format!("{n} questions"),
        };
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            description: quiz
                .description
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            questions_label,
            duration_label: format!("{} min", quiz.duration_minutes),
            pass_label: format!("Pass at {}%", quiz.pass_percentage),
        }
    }
}

#[must_use]
pub fn map_quiz_cards<'a>(quizzes: impl IntoIterator<Item = &'a QuizSummary>) -> Vec<QuizCardVm> {
    quizzes.into_iter().map(QuizCardVm::from).collect()
}
