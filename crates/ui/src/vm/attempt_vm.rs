use quiz_core::model::{AttemptId, AttemptStatus, AttemptSummary, DashboardStats};

use crate::vm::time_fmt::{format_datetime, format_percentage};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptCardVm {
    pub id: AttemptId,
    pub quiz_title: String,
    pub started_at_str: String,
    pub status_label: &'static str,
    pub score_label: Option<String>,
    pub passed: Option<bool>,
}

impl AttemptCardVm {
    #[must_use]
    pub fn has_results(&self) -> bool {
        self.score_label.is_some()
    }
}

impl From<&AttemptSummary> for AttemptCardVm {
    fn from(item: &AttemptSummary) -> Self {
        let status_label = match (item.status, item.passed) {
            (AttemptStatus::InProgress, _) => "In progress",
            (AttemptStatus::Submitted, Some(true)) => "Passed",
            (AttemptStatus::Submitted, Some(false)) => "Not passed",
            (AttemptStatus::Submitted, None) => "Submitted",
        };
        Self {
            id: item.id,
            quiz_title: item.quiz.title.clone(),
            started_at_str: format_datetime(item.started_at),
            status_label,
            score_label: item.percentage.map(format_percentage),
            passed: item.passed,
        }
    }
}

#[must_use]
pub fn map_attempt_cards<'a>(
    items: impl IntoIterator<Item = &'a AttemptSummary>,
) -> Vec<AttemptCardVm> {
    items.into_iter().map(AttemptCardVm::from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardVm {
    pub total: u32,
    pub completed: u32,
    pub passed: u32,
    pub average_label: String,
}

impl From<DashboardStats> for DashboardVm {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total: stats.total_attempts,
            completed: stats.completed_attempts,
            passed: stats.passed_attempts,
            average_label: stats
                .average_percentage
                .map_or_else(|| "-".to_string(), format_percentage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuizId, QuizRef};
    use quiz_core::time::fixed_now;

    fn summary(status: AttemptStatus, percentage: Option<f64>, passed: Option<bool>) -> AttemptSummary {
        AttemptSummary {
            id: AttemptId::new(4),
            quiz: QuizRef {
                id: QuizId::new(1),
                title: "Rust basics".into(),
            },
            status,
            started_at: fixed_now(),
            completed_at: None,
            percentage,
            passed,
        }
    }

    #[test]
    fn running_attempt_has_no_results_link() {
        let card = AttemptCardVm::from(&summary(AttemptStatus::InProgress, None, None));
        assert_eq!(card.status_label, "In progress");
        assert!(!card.has_results());
    }

    #[test]
    fn graded_attempt_shows_score() {
        let card = AttemptCardVm::from(&summary(AttemptStatus::Submitted, Some(80.0), Some(true)));
        assert_eq!(card.status_label, "Passed");
        assert_eq!(card.score_label.as_deref(), Some("80%"));
    }

    #[test]
    fn empty_dashboard_has_placeholder_average() {
        let vm = DashboardVm::from(DashboardStats::default());
        assert_eq!(vm.average_label, "-");
        assert_eq!(vm.total, 0);
    }
}
