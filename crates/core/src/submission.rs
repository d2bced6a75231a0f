//! Submission lifecycle of an attempt as an explicit state machine.
//!
//! ```text
//! Active ──timer expired / user confirmed──▶ Submitting ──ack──▶ Submitted
//!                                               │   ▲
//!                                         error ▼   │ retry (user or timer)
//!                                              Failed
//! ```
//!
//! The machine only validates transitions. Exactly-once submission is
//! enforced by the claim flag held by the coordinator in the services crate.

use thiserror::Error;

/// What moved the attempt into `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitTrigger {
    User,
    Timer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Active,
    Submitting { trigger: SubmitTrigger },
    Submitted,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    TimerExpired,
    UserConfirmed,
    ServerAcknowledged,
    ServerRejected { message: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("cannot apply {event} while {from}")]
    Invalid {
        from: &'static str,
        event: &'static str,
    },
}

impl SubmissionEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TimerExpired => "timer-expired",
            Self::UserConfirmed => "user-confirmed",
            Self::ServerAcknowledged => "server-acknowledged",
            Self::ServerRejected { .. } => "server-rejected",
        }
    }
}

impl SubmissionState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Submitting { .. } => "submitting",
            Self::Submitted => "submitted",
            Self::Failed { .. } => "failed",
        }
    }

    /// Compute the next state.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Invalid` for any event the current state does
    /// not accept; the caller keeps the current state.
    pub fn apply(&self, event: SubmissionEvent) -> Result<Self, TransitionError> {
        match (self, event) {
            (Self::Active | Self::Failed { .. }, SubmissionEvent::TimerExpired) => {
                Ok(Self::Submitting {
                    trigger: SubmitTrigger::Timer,
                })
            }
            (Self::Active | Self::Failed { .. }, SubmissionEvent::UserConfirmed) => {
                Ok(Self::Submitting {
                    trigger: SubmitTrigger::User,
                })
            }
            (Self::Submitting { .. }, SubmissionEvent::ServerAcknowledged) => Ok(Self::Submitted),
            (Self::Submitting { .. }, SubmissionEvent::ServerRejected { message }) => {
                Ok(Self::Failed { message })
            }
            (state, event) => Err(TransitionError::Invalid {
                from: state.name(),
                event: event.name(),
            }),
        }
    }

    /// States from which a submission may be claimed.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(self, Self::Active | Self::Failed { .. })
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// Whether leaving the page should ask for confirmation.
    #[must_use]
    pub fn guards_navigation(&self, answered: usize) -> bool {
        matches!(self, Self::Active) && answered > 0
    }

    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Data for the "submit now?" confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitConfirmation {
    pub answered: usize,
    pub total: usize,
}

impl SubmitConfirmation {
    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_moves_active_to_submitting() {
        let next = SubmissionState::Active
            .apply(SubmissionEvent::TimerExpired)
            .unwrap();
        assert_eq!(
            next,
            SubmissionState::Submitting {
                trigger: SubmitTrigger::Timer
            }
        );
    }

    #[test]
    fn acknowledged_submission_is_terminal() {
        let submitting = SubmissionState::Active
            .apply(SubmissionEvent::UserConfirmed)
            .unwrap();
        let done = submitting
            .apply(SubmissionEvent::ServerAcknowledged)
            .unwrap();
        assert!(done.is_submitted());
        for event in [
            SubmissionEvent::TimerExpired,
            SubmissionEvent::UserConfirmed,
            SubmissionEvent::ServerAcknowledged,
        ] {
            assert!(done.apply(event).is_err());
        }
    }

    #[test]
    fn failure_is_retryable() {
        let failed = SubmissionState::Submitting {
            trigger: SubmitTrigger::User,
        }
        .apply(SubmissionEvent::ServerRejected {
            message: "offline".into(),
        })
        .unwrap();
        assert_eq!(failed.failure_message(), Some("offline"));
        assert!(failed.can_submit());
        let retried = failed.apply(SubmissionEvent::UserConfirmed).unwrap();
        assert!(matches!(retried, SubmissionState::Submitting { .. }));
    }

    #[test]
    fn submitting_rejects_second_trigger() {
        let submitting = SubmissionState::Submitting {
            trigger: SubmitTrigger::User,
        };
        let err = submitting.apply(SubmissionEvent::TimerExpired).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Invalid {
                from: "submitting",
                event: "timer-expired"
            }
        );
    }

    #[test]
    fn navigation_guard_only_while_active_with_answers() {
        assert!(!SubmissionState::Active.guards_navigation(0));
        assert!(SubmissionState::Active.guards_navigation(1));
        let submitting = SubmissionState::Submitting {
            trigger: SubmitTrigger::Timer,
        };
        assert!(!submitting.guards_navigation(3));
    }

    #[test]
    fn confirmation_counts_unanswered() {
        let prompt = SubmitConfirmation {
            answered: 3,
            total: 5,
        };
        assert_eq!(prompt.unanswered(), 2);
    }
}
