//! Exactly-once submission of an attempt.
//!
//! Every path into `Submitting` goes through `claim`, which flips a single
//! atomic flag. Whoever loses the flip (a timer tick racing a click, a second
//! click, a tick after the attempt was submitted) gets `None` and does nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quiz_core::model::{Answer, Attempt, AttemptId, OptionLabel, QuestionId};
use quiz_core::{AnswerStore, SubmissionEvent, SubmissionState, SubmitConfirmation, SubmitTrigger};
use storage::{Mutation, QuizApi, RemoteDataCache};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SessionError;

struct CoordinatorState {
    state: SubmissionState,
    answers: AnswerStore,
    awaiting_confirmation: bool,
    payload: Option<Vec<Answer>>,
    graded: Option<Attempt>,
}

pub struct SubmissionCoordinator {
    attempt_id: AttemptId,
    claimed: AtomicBool,
    inner: Mutex<CoordinatorState>,
    states: watch::Sender<SubmissionState>,
    api: Arc<dyn QuizApi>,
    cache: RemoteDataCache,
}

impl SubmissionCoordinator {
    #[must_use]
    pub fn new(attempt: &Attempt, api: Arc<dyn QuizApi>, cache: RemoteDataCache) -> Self {
        let (states, _) = watch::channel(SubmissionState::Active);
        Self {
            attempt_id: attempt.id(),
            claimed: AtomicBool::new(false),
            inner: Mutex::new(CoordinatorState {
                state: SubmissionState::Active,
                answers: AnswerStore::new(attempt.questions().iter().map(|q| q.id())),
                awaiting_confirmation: false,
                payload: None,
                graded: None,
            }),
            states,
            api,
            cache,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.states.subscribe()
    }

    /// Record a selection while the attempt is still editable.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Answer` once submission has been claimed or for
    /// questions outside the attempt.
    pub fn set_answer(
        &self,
        question_id: QuestionId,
        option: OptionLabel,
    ) -> Result<Option<OptionLabel>, SessionError> {
        Ok(self.lock().answers.set_answer(question_id, option)?)
    }

    #[must_use]
    pub fn answer(&self, question_id: QuestionId) -> Option<OptionLabel> {
        self.lock().answers.get_answer(question_id)
    }

    #[must_use]
    pub fn answers(&self) -> Vec<Answer> {
        self.lock().answers.all_answers()
    }

    #[must_use]
    pub fn unanswered(&self) -> Vec<QuestionId> {
        self.lock().answers.unanswered()
    }

    #[must_use]
    pub fn confirmation(&self) -> SubmitConfirmation {
        let inner = self.lock();
        SubmitConfirmation {
            answered: inner.answers.answered_count(),
            total: inner.answers.total(),
        }
    }

    /// Whether leaving the page should prompt about unsaved work.
    #[must_use]
    pub fn should_guard_navigation(&self) -> bool {
        let inner = self.lock();
        inner.state.guards_navigation(inner.answers.answered_count())
    }

    /// First step of a user submit: open the confirmation prompt.
    ///
    /// Returns `None` when the attempt cannot be submitted from its state.
    pub fn request_submit(&self) -> Option<SubmitConfirmation> {
        {
            let mut inner = self.lock();
            if !inner.state.can_submit() || self.claimed.load(Ordering::Acquire) {
                return None;
            }
            inner.awaiting_confirmation = true;
        }
        Some(self.confirmation())
    }

    pub fn cancel_submit(&self) {
        self.lock().awaiting_confirmation = false;
    }

    #[must_use]
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.lock().awaiting_confirmation
    }

    /// The user confirmed the prompt opened by `request_submit`.
    ///
    /// Returns `Ok(None)` when another trigger claimed the submission while
    /// the prompt was open.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotConfirmed` if no prompt is open.
    pub fn confirm(&self) -> Result<Option<Vec<Answer>>, SessionError> {
        {
            let mut inner = self.lock();
            if !inner.awaiting_confirmation {
                if self.claimed.load(Ordering::Acquire) || !inner.state.can_submit() {
                    return Ok(None);
                }
                return Err(SessionError::NotConfirmed);
            }
            inner.awaiting_confirmation = false;
        }
        Ok(self.claim(SubmitTrigger::User))
    }

    /// The countdown reached zero.
    pub fn expire(&self) -> Option<Vec<Answer>> {
        self.lock().awaiting_confirmation = false;
        self.claim(SubmitTrigger::Timer)
    }

    /// Re-enter `Submitting` after a failed submit.
    pub fn retry(&self, trigger: SubmitTrigger) -> Option<Vec<Answer>> {
        if !matches!(self.lock().state, SubmissionState::Failed { .. }) {
            return None;
        }
        self.claim(trigger)
    }

    /// Atomically claim the submission and return the payload to send.
    ///
    /// The payload is fixed by the first successful claim; retries after a
    /// failure resend exactly the same answers.
    pub fn claim(&self, trigger: SubmitTrigger) -> Option<Vec<Answer>> {
        // The flag only changes under the state lock, so a release in
        // `settle` and the `Failed` it publishes are seen together.
        let mut guard = self.lock();
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(attempt_id = %self.attempt_id, ?trigger, "submit claim lost");
            return None;
        }

        let inner = &mut *guard;
        let event = match trigger {
            SubmitTrigger::User => SubmissionEvent::UserConfirmed,
            SubmitTrigger::Timer => SubmissionEvent::TimerExpired,
        };
        let next = match inner.state.apply(event) {
            Ok(next) => next,
            Err(err) => {
                // Submitted attempts keep the flag set forever.
                if !inner.state.is_submitted() {
                    self.claimed.store(false, Ordering::Release);
                }
                debug!(attempt_id = %self.attempt_id, error = %err, "submit claim refused");
                return None;
            }
        };
        inner.answers.seal();
        let payload = inner
            .payload
            .get_or_insert_with(|| inner.answers.all_answers())
            .clone();
        inner.state = next.clone();
        drop(guard);

        info!(
            attempt_id = %self.attempt_id,
            ?trigger,
            answers = payload.len(),
            "submit claimed"
        );
        self.states.send_replace(next);
        Some(payload)
    }

    /// Send a claimed payload and settle the state machine.
    ///
    /// Errors never leave the coordinator in `Submitting`: a rejection moves
    /// it to `Failed` and releases the claim for a retry.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` with the transport or server failure.
    pub async fn send(&self, payload: Vec<Answer>) -> Result<Attempt, SessionError> {
        match self.api.submit_attempt(self.attempt_id, &payload).await {
            Ok(graded) => {
                // Watchers of `Submitted` re-read these views straight away.
                let stale = self.cache.invalidate_mutation(&Mutation::SubmitAttempt {
                    attempt_id: self.attempt_id,
                });
                self.settle(SubmissionEvent::ServerAcknowledged, Some(graded.clone()));
                info!(attempt_id = %self.attempt_id, invalidated = stale, "attempt submitted");
                Ok(graded)
            }
            Err(err) => {
                let err = SessionError::from(err);
                warn!(attempt_id = %self.attempt_id, error = %err, "attempt submit failed");
                self.settle(
                    SubmissionEvent::ServerRejected {
                        message: err.user_message(),
                    },
                    None,
                );
                Err(err)
            }
        }
    }

    fn settle(&self, event: SubmissionEvent, graded: Option<Attempt>) {
        let next = {
            let mut inner = self.lock();
            match inner.state.apply(event) {
                Ok(next) => {
                    if matches!(next, SubmissionState::Failed { .. }) {
                        self.claimed.store(false, Ordering::Release);
                    }
                    inner.state = next.clone();
                    if graded.is_some() {
                        inner.graded = graded;
                    }
                    next
                }
                Err(err) => {
                    warn!(attempt_id = %self.attempt_id, error = %err, "unexpected submit result");
                    return;
                }
            }
        };
        self.states.send_replace(next);
    }

    /// The graded attempt returned by a successful submit.
    #[must_use]
    pub fn graded(&self) -> Option<Attempt> {
        self.lock().graded.clone()
    }
}
