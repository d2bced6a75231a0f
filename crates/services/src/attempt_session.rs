use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quiz_core::model::{Answer, Attempt, AttemptId, OptionLabel, Question, QuestionId};
use quiz_core::{
    AttemptTimer, QuestionNavigator, SubmissionState, SubmitConfirmation, SubmitTrigger,
    TimerSnapshot,
};
use storage::{QuizApi, RemoteDataCache};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info};

use crate::coordinator::SubmissionCoordinator;
use crate::error::SessionError;
use crate::scheduler::Scheduler;
use crate::timer_runner::TimerRunner;

/// How a submit request ended for the caller that made it.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// This call sent the answers and the server graded them.
    Graded(Attempt),
    /// Another trigger already owns the submission; nothing was sent.
    AlreadyClaimed,
}

/// Answered-count summary for the progress bar and question jump list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
    pub answered: usize,
    pub unanswered_positions: Vec<usize>,
}

/// One running attempt: navigation, answers, countdown and submission.
///
/// Dropping or detaching the session stops the countdown. A submit already
/// sent keeps running to completion on the scheduler.
pub struct AttemptSession {
    attempt: Attempt,
    navigator: Mutex<QuestionNavigator>,
    coordinator: Arc<SubmissionCoordinator>,
    timer: Arc<TimerRunner>,
    scheduler: Arc<dyn Scheduler>,
    detached: AtomicBool,
}

impl std::fmt::Debug for AttemptSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttemptSession")
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

fn dispatch(
    scheduler: &Arc<dyn Scheduler>,
    coordinator: Arc<SubmissionCoordinator>,
    timer: Option<Arc<TimerRunner>>,
    payload: Vec<Answer>,
) -> oneshot::Receiver<Result<Attempt, SessionError>> {
    let (tx, rx) = oneshot::channel();
    scheduler.spawn(Box::pin(async move {
        let result = coordinator.send(payload).await;
        if let Some(timer) = timer.filter(|_| result.is_ok()) {
            timer.cancel();
        }
        // The caller may have gone away; the submit still completed.
        let _ = tx.send(result);
    }));
    rx
}

impl AttemptSession {
    /// Begin a session for a freshly started attempt and start its countdown.
    #[must_use]
    pub fn start(
        attempt: Attempt,
        api: Arc<dyn QuizApi>,
        cache: RemoteDataCache,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let coordinator = Arc::new(SubmissionCoordinator::new(&attempt, api, cache));

        let on_expired = {
            let coordinator = Arc::clone(&coordinator);
            let scheduler = Arc::clone(&scheduler);
            Box::new(move || {
                if let Some(payload) = coordinator.expire() {
                    info!(attempt_id = %coordinator.attempt_id(), "time is up; submitting");
                    // Expired timers need no cancel on success.
                    drop(dispatch(&scheduler, coordinator, None, payload));
                }
            })
        };
        let timer = Arc::new(TimerRunner::start(
            scheduler.as_ref(),
            AttemptTimer::new(attempt.duration_secs()),
            on_expired,
        ));

        info!(
            attempt_id = %attempt.id(),
            questions = attempt.questions().len(),
            duration_secs = attempt.duration_secs(),
            "attempt session started"
        );
        Self {
            navigator: Mutex::new(QuestionNavigator::new(attempt.questions().to_vec())),
            attempt,
            coordinator,
            timer,
            scheduler,
            detached: AtomicBool::new(false),
        }
    }

    fn navigator(&self) -> MutexGuard<'_, QuestionNavigator> {
        self.navigator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt.id()
    }

    //
    // ─── NAVIGATION ──────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn current_question(&self) -> Option<Question> {
        self.navigator().current().cloned()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.navigator().index()
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.navigator().is_first()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.navigator().is_last()
    }

    pub fn next(&self) -> bool {
        self.navigator().next()
    }

    pub fn previous(&self) -> bool {
        self.navigator().previous()
    }

    pub fn go_to(&self, index: usize) {
        self.navigator().go_to(index);
    }

    //
    // ─── ANSWERS ─────────────────────────────────────────────────────────────
    //

    /// Record a selection for a question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Answer` once the submission has been claimed.
    pub fn select(&self, question_id: QuestionId, option: OptionLabel) -> Result<(), SessionError> {
        let previous = self.coordinator.set_answer(question_id, option)?;
        debug!(question_id = %question_id, ?option, ?previous, "answer recorded");
        Ok(())
    }

    #[must_use]
    pub fn answer(&self, question_id: QuestionId) -> Option<OptionLabel> {
        self.coordinator.answer(question_id)
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        let unanswered = self.coordinator.unanswered();
        let navigator = self.navigator();
        let unanswered_positions = navigator
            .questions()
            .iter()
            .enumerate()
            .filter(|(_, q)| unanswered.contains(&q.id()))
            .map(|(i, _)| i)
            .collect();
        Progress {
            index: navigator.index(),
            total: navigator.len(),
            answered: navigator.len() - unanswered.len(),
            unanswered_positions,
        }
    }

    //
    // ─── SUBMISSION ──────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.coordinator.state()
    }

    #[must_use]
    pub fn states(&self) -> watch::Receiver<SubmissionState> {
        self.coordinator.subscribe()
    }

    #[must_use]
    pub fn timer(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer.subscribe()
    }

    #[must_use]
    pub fn timer_snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    #[must_use]
    pub fn should_guard_navigation(&self) -> bool {
        !self.is_detached() && self.coordinator.should_guard_navigation()
    }

    /// Open the confirmation prompt with answered/total counts.
    pub fn request_submit(&self) -> Option<SubmitConfirmation> {
        self.coordinator.request_submit()
    }

    pub fn cancel_submit(&self) {
        self.coordinator.cancel_submit();
    }

    /// Confirm the prompt and submit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotConfirmed` without an open prompt, or the
    /// submit failure after the coordinator moved to `Failed`.
    pub async fn confirm_submit(&self) -> Result<SubmitOutcome, SessionError> {
        match self.coordinator.confirm()? {
            Some(payload) => self.send(payload).await,
            None => Ok(SubmitOutcome::AlreadyClaimed),
        }
    }

    /// Resubmit the same answers after a failure.
    ///
    /// # Errors
    ///
    /// Returns the submit failure if the retry fails as well.
    pub async fn retry_submit(&self) -> Result<SubmitOutcome, SessionError> {
        match self.coordinator.retry(SubmitTrigger::User) {
            Some(payload) => self.send(payload).await,
            None => Ok(SubmitOutcome::AlreadyClaimed),
        }
    }

    async fn send(&self, payload: Vec<Answer>) -> Result<SubmitOutcome, SessionError> {
        let rx = dispatch(
            &self.scheduler,
            Arc::clone(&self.coordinator),
            Some(Arc::clone(&self.timer)),
            payload,
        );
        let graded = rx.await.map_err(|_| SessionError::Interrupted)??;
        Ok(SubmitOutcome::Graded(graded))
    }

    /// Graded attempt once the submission succeeded.
    #[must_use]
    pub fn graded(&self) -> Option<Attempt> {
        self.coordinator.graded()
    }

    /// Stop the countdown when the view goes away.
    ///
    /// An in-flight submit is not cancelled.
    pub fn detach(&self) {
        if self.detached.swap(true, Ordering::AcqRel) {
            return;
        }
        self.timer.cancel();
        debug!(attempt_id = %self.attempt.id(), state = self.state().name(), "attempt session detached");
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }
}

impl Drop for AttemptSession {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}
