use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::Clock;
use quiz_core::model::{
    Answer, Attempt, AttemptId, AttemptParts, AttemptStatus, AttemptSummary, DashboardStats,
    GradedAnswer, GradedOutcome, Page, Question, QuizId, QuizRef, QuizSummary, UserId,
};
use tracing::warn;

use crate::demo::{self, SeedQuiz};
use crate::repository::{ApiError, QuizApi, QuizQuery};

const DEFAULT_PAGE_SIZE: usize = 10;
const DEMO_USER: UserId = UserId::new(1);

struct Submission {
    completed_at: DateTime<Utc>,
    graded: Vec<GradedAnswer>,
    outcome: GradedOutcome,
}

struct StoredAttempt {
    id: AttemptId,
    quiz: QuizRef,
    questions: Vec<Question>,
    duration_minutes: u32,
    started_at: DateTime<Utc>,
    submission: Option<Submission>,
}

impl StoredAttempt {
    fn to_attempt(&self, user_id: UserId) -> Result<Attempt, ApiError> {
        let parts = match &self.submission {
            None => AttemptParts {
                id: self.id,
                user_id,
                quiz: self.quiz.clone(),
                questions: self.questions.iter().map(Question::redacted).collect(),
                duration_minutes: self.duration_minutes,
                status: AttemptStatus::InProgress,
                started_at: self.started_at,
                completed_at: None,
                outcome: None,
                graded_answers: Vec::new(),
            },
            Some(submission) => AttemptParts {
                id: self.id,
                user_id,
                quiz: self.quiz.clone(),
                questions: self.questions.clone(),
                duration_minutes: self.duration_minutes,
                status: AttemptStatus::Submitted,
                started_at: self.started_at,
                completed_at: Some(submission.completed_at),
                outcome: Some(submission.outcome),
                graded_answers: submission.graded.clone(),
            },
        };
        Attempt::from_parts(parts).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

struct ServerState {
    user_id: UserId,
    quizzes: Vec<SeedQuiz>,
    attempts: BTreeMap<AttemptId, StoredAttempt>,
    next_attempt_id: u64,
    page_size: usize,
    offline: bool,
    failing_submits: usize,
    submit_calls: Vec<(AttemptId, Vec<Answer>)>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            user_id: DEMO_USER,
            quizzes: Vec::new(),
            attempts: BTreeMap::new(),
            next_attempt_id: 1,
            page_size: DEFAULT_PAGE_SIZE,
            offline: false,
            failing_submits: 0,
            submit_calls: Vec::new(),
        }
    }
}

/// Fake remote server used in demo mode and tests.
///
/// Grades submissions itself, so it is the only place in the workspace that
/// reads answer keys of unsubmitted attempts.
#[derive(Clone, Default)]
pub struct InMemoryApi {
    state: Arc<Mutex<ServerState>>,
    clock: Clock,
}

impl InMemoryApi {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState::default())),
            clock,
        }
    }

    /// Backend pre-loaded with the sample catalog.
    #[must_use]
    pub fn with_demo_catalog() -> Self {
        let api = Self::new(Clock::system());
        match demo::catalog() {
            Ok(quizzes) => {
                for quiz in quizzes {
                    // Fresh state cannot be poisoned.
                    let _ = api.add_quiz(quiz.summary, quiz.questions);
                }
            }
            Err(err) => warn!(error = %err, "demo catalog rejected"),
        }
        api
    }

    fn lock(&self) -> Result<MutexGuard<'_, ServerState>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::Connection(e.to_string()))
    }

    fn online(&self) -> Result<MutexGuard<'_, ServerState>, ApiError> {
        let guard = self.lock()?;
        if guard.offline {
            return Err(ApiError::Connection("server unreachable".into()));
        }
        Ok(guard)
    }

    /// Register a quiz with its keyed questions.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Connection` if the state lock is poisoned.
    pub fn add_quiz(&self, summary: QuizSummary, questions: Vec<Question>) -> Result<(), ApiError> {
        let mut guard = self.lock()?;
        guard.quizzes.retain(|quiz| quiz.summary.id != summary.id);
        guard.quizzes.push(SeedQuiz { summary, questions });
        Ok(())
    }

    /// Replace the questions of a quiz, as an admin edit would.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown quizzes.
    pub fn replace_questions(&self, quiz_id: QuizId, questions: Vec<Question>) -> Result<(), ApiError> {
        let mut guard = self.lock()?;
        let quiz = guard
            .quizzes
            .iter_mut()
            .find(|quiz| quiz.summary.id == quiz_id)
            .ok_or(ApiError::NotFound)?;
        quiz.summary.question_count = u32::try_from(questions.len()).unwrap_or(u32::MAX);
        quiz.questions = questions;
        Ok(())
    }

    /// Number of submit requests received, failed ones included.
    #[must_use]
    pub fn submit_calls(&self) -> usize {
        self.lock().map_or(0, |guard| guard.submit_calls.len())
    }

    /// Answer payloads of every submit request, in arrival order.
    #[must_use]
    pub fn submitted_payloads(&self) -> Vec<(AttemptId, Vec<Answer>)> {
        self.lock()
            .map(|guard| guard.submit_calls.clone())
            .unwrap_or_default()
    }

    /// Make the next `count` submit requests fail with a connection error.
    pub fn fail_next_submits(&self, count: usize) {
        if let Ok(mut guard) = self.lock() {
            guard.failing_submits = count;
        }
    }

    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut guard) = self.lock() {
            guard.offline = offline;
        }
    }

    pub fn set_page_size(&self, page_size: usize) {
        if let Ok(mut guard) = self.lock() {
            guard.page_size = page_size.max(1);
        }
    }
}

fn grade(questions: &[Question], answers: &[Answer], pass_percentage: u8) -> (Vec<GradedAnswer>, GradedOutcome) {
    let graded: Vec<GradedAnswer> = questions
        .iter()
        .map(|question| {
            let selected = answers
                .iter()
                .rev()
                .find(|answer| answer.question_id == question.id())
                .map(|answer| answer.selected_option);
            let is_correct = match (selected, question.answer_key()) {
                (Some(selected), Some(key)) => selected == key.correct_option,
                _ => false,
            };
            GradedAnswer {
                question_id: question.id(),
                selected_option: selected,
                is_correct,
            }
        })
        .collect();
    let score = u32::try_from(graded.iter().filter(|g| g.is_correct).count()).unwrap_or(u32::MAX);
    let max_score = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    let percentage = if max_score == 0 {
        0.0
    } else {
        f64::from(score) * 100.0 / f64::from(max_score)
    };
    let outcome = GradedOutcome {
        score,
        max_score,
        percentage,
        passed: percentage >= f64::from(pass_percentage),
    };
    (graded, outcome)
}

fn paginate<T: Clone>(items: &[T], page: u32, page_size: usize) -> Page<T> {
    let last_page = u32::try_from(items.len().div_ceil(page_size).max(1)).unwrap_or(u32::MAX);
    let page = page.clamp(1, last_page);
    let start = (page as usize - 1) * page_size;
    let slice = items.iter().skip(start).take(page_size).cloned().collect();
    Page::new(slice, page, last_page)
}

#[async_trait]
impl QuizApi for InMemoryApi {
    async fn start_attempt(&self, quiz_id: QuizId) -> Result<Attempt, ApiError> {
        let now = self.clock.now();
        let mut guard = self.online()?;
        let quiz = guard
            .quizzes
            .iter()
            .find(|quiz| quiz.summary.id == quiz_id)
            .ok_or(ApiError::NotFound)?;
        let quiz_ref = QuizRef {
            id: quiz.summary.id,
            title: quiz.summary.title.clone(),
        };
        let questions = quiz.questions.clone();
        let duration_minutes = quiz.summary.duration_minutes;

        let id = AttemptId::new(guard.next_attempt_id);
        guard.next_attempt_id += 1;
        let stored = StoredAttempt {
            id,
            quiz: quiz_ref,
            questions,
            duration_minutes,
            started_at: now,
            submission: None,
        };
        let attempt = stored.to_attempt(guard.user_id)?;
        guard.attempts.insert(id, stored);
        Ok(attempt)
    }

    async fn submit_attempt(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<Attempt, ApiError> {
        let now = self.clock.now();
        let mut guard = self.online()?;
        guard.submit_calls.push((attempt_id, answers.to_vec()));
        if guard.failing_submits > 0 {
            guard.failing_submits -= 1;
            return Err(ApiError::Connection("connection reset".into()));
        }

        let user_id = guard.user_id;
        let pass_percentage = {
            let attempt = guard.attempts.get(&attempt_id).ok_or(ApiError::NotFound)?;
            guard
                .quizzes
                .iter()
                .find(|quiz| quiz.summary.id == attempt.quiz.id)
                .map_or(0, |quiz| quiz.summary.pass_percentage)
        };
        let attempt = guard
            .attempts
            .get_mut(&attempt_id)
            .ok_or(ApiError::NotFound)?;
        if attempt.submission.is_some() {
            return Err(ApiError::Conflict("attempt already submitted".into()));
        }
        let (graded, outcome) = grade(&attempt.questions, answers, pass_percentage);
        attempt.submission = Some(Submission {
            completed_at: now.max(attempt.started_at),
            graded,
            outcome,
        });
        attempt.to_attempt(user_id)
    }

    async fn attempt_results(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError> {
        let guard = self.online()?;
        guard
            .attempts
            .get(&attempt_id)
            .ok_or(ApiError::NotFound)?
            .to_attempt(guard.user_id)
    }

    async fn attempts_mine(&self, page: u32) -> Result<Page<AttemptSummary>, ApiError> {
        let guard = self.online()?;
        let summaries = guard
            .attempts
            .values()
            .rev()
            .map(|stored| stored.to_attempt(guard.user_id).map(|a| AttemptSummary::from_attempt(&a)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paginate(&summaries, page, guard.page_size))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let guard = self.online()?;
        let outcomes: Vec<&GradedOutcome> = guard
            .attempts
            .values()
            .filter_map(|a| a.submission.as_ref().map(|s| &s.outcome))
            .collect();
        let completed = u32::try_from(outcomes.len()).unwrap_or(u32::MAX);
        let average_percentage = (!outcomes.is_empty()).then(|| {
            outcomes.iter().map(|o| o.percentage).sum::<f64>() / f64::from(completed)
        });
        Ok(DashboardStats {
            total_attempts: u32::try_from(guard.attempts.len()).unwrap_or(u32::MAX),
            completed_attempts: completed,
            passed_attempts: u32::try_from(outcomes.iter().filter(|o| o.passed).count())
                .unwrap_or(u32::MAX),
            average_percentage,
        })
    }

    async fn list_quizzes(&self, query: &QuizQuery) -> Result<Page<QuizSummary>, ApiError> {
        let guard = self.online()?;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let matching: Vec<QuizSummary> = guard
            .quizzes
            .iter()
            .map(|quiz| &quiz.summary)
            .filter(|summary| match &needle {
                None => true,
                Some(needle) => {
                    summary.title.to_lowercase().contains(needle)
                        || summary
                            .description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(needle))
                }
            })
            .cloned()
            .collect();
        Ok(paginate(&matching, query.page, guard.page_size))
    }
}
