use quiz_core::model::OptionLabel;
use quiz_core::{Correctness, ResultRow};
use services::AttemptResults;

use crate::vm::time_fmt::{format_datetime, format_percentage};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionResultVm {
    pub label: OptionLabel,
    pub text: String,
    pub selected: bool,
    pub correct: bool,
}

impl OptionResultVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.correct {
            "result-option result-option--correct"
        } else if self.selected {
            "result-option result-option--selected"
        } else {
            "result-option"
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    pub position: usize,
    pub number: usize,
    pub prompt: String,
    pub options: Vec<OptionResultVm>,
    pub correctness: Correctness,
    pub verdict_label: &'static str,
    pub explanation: Option<String>,
}

impl ResultRowVm {
    /// CSS modifier for the row, one per verdict.
    #[must_use]
    pub fn verdict_class(&self) -> &'static str {
        match self.correctness {
            Correctness::Correct => "result-row--correct",
            Correctness::Incorrect => "result-row--incorrect",
            Correctness::Unanswered => "result-row--unanswered",
        }
    }
}

impl From<&ResultRow> for ResultRowVm {
    fn from(row: &ResultRow) -> Self {
        let options = row
            .question
            .options()
            .iter()
            .map(|(label, text)| OptionResultVm {
                label,
                text: text.to_string(),
                selected: row.selected == Some(label),
                correct: row.correct_option == Some(label),
            })
            .collect();
        let verdict_label = match row.correctness {
            Correctness::Correct => "Correct",
            Correctness::Incorrect => "Incorrect",
            Correctness::Unanswered => "Not answered",
        };
        Self {
            position: row.position,
            number: row.position + 1,
            prompt: row.question.prompt().to_string(),
            options,
            correctness: row.correctness,
            verdict_label,
            explanation: row.explanation.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub quiz_title: String,
    pub completed_at_str: Option<String>,
    pub score_label: String,
    pub percentage_label: String,
    pub passed: bool,
    pub rows: Vec<ResultRowVm>,
}

#[must_use]
pub fn map_results(results: &AttemptResults) -> ResultsVm {
    let attempt = &results.attempt;
    let (score_label, percentage_label, passed) = attempt.outcome().map_or_else(
        || ("-".to_string(), "-".to_string(), false),
        |outcome| {
            (
                format!("{} / {}", outcome.score, outcome.max_score),
                format_percentage(outcome.percentage),
                outcome.passed,
            )
        },
    );
    ResultsVm {
        quiz_title: attempt.quiz().title.clone(),
        completed_at_str: attempt.completed_at().map(format_datetime),
        score_label,
        percentage_label,
        passed,
        rows: results.rows.iter().map(ResultRowVm::from).collect(),
    }
}
