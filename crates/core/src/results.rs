use crate::model::{Attempt, GradedAnswer, OptionLabel, Question};

/// How a single question was graded, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Correctness {
    Correct,
    Incorrect,
    /// No option was selected. Neither correct nor incorrect.
    Unanswered,
}

/// One displayable line of an attempt's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub position: usize,
    pub question: Question,
    pub selected: Option<OptionLabel>,
    pub correct_option: Option<OptionLabel>,
    pub correctness: Correctness,
    pub explanation: Option<String>,
}

/// Join a submitted attempt's questions with the server's grading.
///
/// Order follows the attempt's question list. Correctness comes from the
/// server's `is_correct` flag; the client never grades.
#[must_use]
pub fn project_results(attempt: &Attempt) -> Vec<ResultRow> {
    project(attempt.questions(), attempt.graded_answers())
}

/// Same as [`project_results`] for an explicit question list.
#[must_use]
pub fn project(questions: &[Question], graded: &[GradedAnswer]) -> Vec<ResultRow> {
    questions
        .iter()
        .enumerate()
        .map(|(position, question)| {
            let grading = graded.iter().find(|g| g.question_id == question.id());
            let selected = grading.and_then(|g| g.selected_option);
            let correctness = match (selected, grading) {
                (Some(_), Some(g)) if g.is_correct => Correctness::Correct,
                (Some(_), Some(_)) => Correctness::Incorrect,
                _ => Correctness::Unanswered,
            };
            let key = question.answer_key();
            ResultRow {
                position,
                question: question.clone(),
                selected,
                correct_option: key.map(|k| k.correct_option),
                correctness,
                explanation: key.and_then(|k| k.explanation.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnswerKey, AttemptId, AttemptParts, AttemptStatus, GradedOutcome, QuestionId,
        QuestionOptions, QuizId, QuizRef, UserId,
    };
    use crate::time::fixed_now;

    fn keyed_question(id: u64, correct: OptionLabel) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            QuestionOptions::new("a", "b", "c", "d"),
        )
        .unwrap()
        .with_answer_key(AnswerKey {
            correct_option: correct,
            explanation: Some(format!("explanation {id}")),
        })
    }

    fn graded_attempt() -> Attempt {
        Attempt::from_parts(AttemptParts {
            id: AttemptId::new(5),
            user_id: UserId::new(1),
            quiz: QuizRef {
                id: QuizId::new(2),
                title: "Rust".into(),
            },
            questions: vec![
                keyed_question(1, OptionLabel::A),
                keyed_question(2, OptionLabel::B),
                keyed_question(3, OptionLabel::C),
            ],
            duration_minutes: 5,
            status: AttemptStatus::Submitted,
            started_at: fixed_now(),
            completed_at: Some(fixed_now()),
            outcome: Some(GradedOutcome {
                score: 1,
                max_score: 3,
                percentage: 33.3,
                passed: false,
            }),
            graded_answers: vec![
                GradedAnswer {
                    question_id: QuestionId::new(1),
                    selected_option: Some(OptionLabel::A),
                    is_correct: true,
                },
                GradedAnswer {
                    question_id: QuestionId::new(2),
                    selected_option: Some(OptionLabel::D),
                    is_correct: false,
                },
            ],
        })
        .unwrap()
    }

    #[test]
    fn correct_incorrect_unanswered_in_order() {
        let rows = project_results(&graded_attempt());
        let correctness: Vec<_> = rows.iter().map(|row| row.correctness).collect();
        assert_eq!(
            correctness,
            vec![
                Correctness::Correct,
                Correctness::Incorrect,
                Correctness::Unanswered
            ]
        );
        let ids: Vec<_> = rows.iter().map(|row| row.question.id()).collect();
        assert_eq!(
            ids,
            vec![QuestionId::new(1), QuestionId::new(2), QuestionId::new(3)]
        );
    }

    #[test]
    fn rows_carry_selection_key_and_explanation() {
        let rows = project_results(&graded_attempt());
        assert_eq!(rows[1].selected, Some(OptionLabel::D));
        assert_eq!(rows[1].correct_option, Some(OptionLabel::B));
        assert_eq!(rows[1].explanation.as_deref(), Some("explanation 2"));
        assert_eq!(rows[2].selected, None);
        assert_eq!(rows[2].position, 2);
    }

    #[test]
    fn graded_entry_without_selection_is_unanswered() {
        let questions = vec![keyed_question(1, OptionLabel::A)];
        let graded = vec![GradedAnswer {
            question_id: QuestionId::new(1),
            selected_option: None,
            is_correct: false,
        }];
        let rows = project(&questions, &graded);
        assert_eq!(rows[0].correctness, Correctness::Unanswered);
    }
}
