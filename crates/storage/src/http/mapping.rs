use quiz_core::Error as DomainError;
use quiz_core::model::{
    AnswerKey, Attempt, AttemptParts, AttemptStatus, AttemptSummary, GradedAnswer,
    GradedOutcome, OptionLabel, Page, Question, QuestionOptions, QuizRef,
};
use tracing::warn;

use super::dto::{AttemptDto, AttemptListDto, AttemptSummaryDto, GradedAnswerDto, QuestionDto};
use crate::repository::ApiError;

fn decode<E: Into<DomainError>>(e: E) -> ApiError {
    ApiError::Decode(e.into().to_string())
}

fn parse_label(raw: Option<&str>) -> Result<Option<OptionLabel>, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<OptionLabel>().map_err(decode))
        .transpose()
}

fn map_question(dto: QuestionDto, keep_key: bool) -> Result<Question, ApiError> {
    let question = Question::new(
        dto.id,
        dto.question_text,
        QuestionOptions::new(dto.option_a, dto.option_b, dto.option_c, dto.option_d),
    )
    .map_err(decode)?;
    if !keep_key {
        return Ok(question);
    }
    Ok(match parse_label(dto.correct_option.as_deref())? {
        Some(correct_option) => question.with_answer_key(AnswerKey {
            correct_option,
            explanation: dto.explanation,
        }),
        None => question,
    })
}

fn map_graded(dto: GradedAnswerDto) -> Result<GradedAnswer, ApiError> {
    Ok(GradedAnswer {
        question_id: dto.question_id,
        selected_option: parse_label(dto.selected_option.as_deref())?,
        is_correct: dto.is_correct,
    })
}

/// Convert a wire attempt into a validated domain attempt.
///
/// Grading data on an in-progress attempt is dropped with a warning so the
/// client never holds an answer key before submission.
pub(crate) fn map_attempt(dto: AttemptDto) -> Result<Attempt, ApiError> {
    let submitted = dto.status == AttemptStatus::Submitted;
    if !submitted {
        let leaked = dto
            .questions
            .iter()
            .filter(|q| q.correct_option.is_some() || q.explanation.is_some())
            .count();
        if leaked > 0 {
            warn!(
                attempt_id = %dto.id,
                questions = leaked,
                "in-progress attempt carried answer keys; stripped"
            );
        }
    }

    let questions = dto
        .questions
        .into_iter()
        .map(|q| map_question(q, submitted))
        .collect::<Result<Vec<_>, _>>()?;

    let (outcome, graded_answers) = if submitted {
        let outcome = match (dto.score, dto.max_score, dto.percentage, dto.passed) {
            (Some(score), Some(max_score), Some(percentage), Some(passed)) => Some(GradedOutcome {
                score,
                max_score,
                percentage,
                passed,
            }),
            _ => None,
        };
        let graded = dto
            .answers
            .into_iter()
            .map(map_graded)
            .collect::<Result<Vec<_>, _>>()?;
        (outcome, graded)
    } else {
        (None, Vec::new())
    };

    Attempt::from_parts(AttemptParts {
        id: dto.id,
        user_id: dto.user_id,
        quiz: QuizRef {
            id: dto.quiz.id,
            title: dto.quiz.title,
        },
        questions,
        duration_minutes: dto.duration_minutes,
        status: dto.status,
        started_at: dto.started_at,
        completed_at: if submitted { dto.completed_at } else { None },
        outcome,
        graded_answers,
    })
    .map_err(decode)
}

fn map_summary(dto: AttemptSummaryDto) -> AttemptSummary {
    AttemptSummary {
        id: dto.id,
        quiz: QuizRef {
            id: dto.quiz.id,
            title: dto.quiz.title,
        },
        status: dto.status,
        started_at: dto.started_at,
        completed_at: dto.completed_at,
        percentage: dto.percentage,
        passed: dto.passed,
    }
}

pub(crate) fn map_attempt_list(dto: AttemptListDto) -> Page<AttemptSummary> {
    let items = dto.attempts.into_iter().map(map_summary).collect();
    Page::new(items, dto.pagination.current_page, dto.pagination.last_page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question_json(id: u64, correct: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "question_text": format!("Question {id}"),
            "option_a": "a", "option_b": "b", "option_c": "c", "option_d": "d",
            "correct_option": correct,
            "explanation": correct.map(|_| "because"),
        })
    }

    fn attempt_json(status: &str, questions: Vec<serde_json::Value>) -> serde_json::Value {
        json!({
            "id": 10,
            "user_id": 1,
            "quiz": {"id": 2, "title": "Rust"},
            "questions": questions,
            "duration_minutes": 5,
            "status": status,
            "started_at": "2024-01-01T10:00:00Z",
        })
    }

    #[test]
    fn strips_answer_keys_from_in_progress_attempts() {
        let dto: AttemptDto =
            serde_json::from_value(attempt_json("in_progress", vec![question_json(1, Some("B"))]))
                .unwrap();
        let attempt = map_attempt(dto).unwrap();
        assert!(attempt.questions()[0].answer_key().is_none());
    }

    #[test]
    fn keeps_answer_keys_after_submission() {
        let mut value = attempt_json(
            "submitted",
            vec![question_json(1, Some("b")), question_json(2, Some("C"))],
        );
        value["completed_at"] = json!("2024-01-01T10:04:00Z");
        value["score"] = json!(1);
        value["max_score"] = json!(2);
        value["percentage"] = json!(50.0);
        value["passed"] = json!(true);
        value["answers"] = json!([
            {"question_id": 1, "selected_option": "B", "is_correct": true},
            {"question_id": 2, "selected_option": null, "is_correct": false},
        ]);
        let attempt = map_attempt(serde_json::from_value(value).unwrap()).unwrap();
        let key = attempt.questions()[0].answer_key().unwrap();
        assert_eq!(key.correct_option, OptionLabel::B);
        assert_eq!(key.explanation.as_deref(), Some("because"));
        assert_eq!(attempt.graded_answers()[1].selected_option, None);
        assert_eq!(attempt.outcome().unwrap().score, 1);
    }

    #[test]
    fn bad_option_label_is_a_decode_error() {
        let mut value = attempt_json("submitted", vec![question_json(1, Some("E"))]);
        value["completed_at"] = json!("2024-01-01T10:04:00Z");
        let err = map_attempt(serde_json::from_value(value).unwrap()).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let dto: AttemptDto = serde_json::from_value(attempt_json("in_progress", vec![])).unwrap();
        assert!(matches!(map_attempt(dto), Err(ApiError::Decode(_))));
    }
}
