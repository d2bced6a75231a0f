use std::sync::Arc;

use quiz_core::model::{Attempt, AttemptId, AttemptSummary, QuizId};
use quiz_core::{ResultRow, project_results};
use storage::{CacheEvent, CacheKey, Mutation, PageSequence, QuizApi, RemoteDataCache};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::attempt_session::AttemptSession;
use crate::error::SessionError;
use crate::scheduler::Scheduler;

/// A graded attempt joined with its per-question result rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResults {
    pub attempt: Attempt,
    pub rows: Vec<ResultRow>,
}

/// Starts attempts and serves results and attempt history.
#[derive(Clone)]
pub struct AttemptService {
    api: Arc<dyn QuizApi>,
    cache: RemoteDataCache,
    scheduler: Arc<dyn Scheduler>,
}

impl AttemptService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, cache: RemoteDataCache, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            api,
            cache,
            scheduler,
        }
    }

    /// Cache notifications, so open history views can refetch after a submit.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }

    /// Start a new attempt on the server and begin its session.
    ///
    /// Nothing is created locally if the server call fails.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` on start failures.
    pub async fn start_attempt(&self, quiz_id: QuizId) -> Result<AttemptSession, SessionError> {
        let attempt = self.api.start_attempt(quiz_id).await?;
        self.cache
            .invalidate_mutation(&Mutation::StartAttempt { quiz_id });
        info!(quiz_id = %quiz_id, attempt_id = %attempt.id(), "attempt started");
        Ok(AttemptSession::start(
            attempt,
            Arc::clone(&self.api),
            self.cache.clone(),
            Arc::clone(&self.scheduler),
        ))
    }

    /// Graded attempt with result rows, served from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` for attempts still in progress.
    pub async fn results(&self, attempt_id: AttemptId) -> Result<AttemptResults, SessionError> {
        let attempt: Attempt = self
            .cache
            .fetch(CacheKey::attempt(attempt_id), || {
                self.api.attempt_results(attempt_id)
            })
            .await?;
        if !attempt.is_submitted() {
            return Err(SessionError::NotSubmitted(attempt_id));
        }
        let rows = project_results(&attempt);
        Ok(AttemptResults { attempt, rows })
    }

    /// Drop a cached results entry once nothing displays it anymore.
    pub fn forget_results(&self, attempt_id: AttemptId) -> bool {
        let removed = self.cache.remove(&CacheKey::attempt(attempt_id));
        if removed {
            debug!(attempt_id = %attempt_id, "results released");
        }
        removed
    }

    /// The user's attempts, first page or everything already loaded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` on fetch failures.
    pub async fn history(&self) -> Result<PageSequence<AttemptSummary>, SessionError> {
        Ok(self
            .cache
            .fetch_first_page(CacheKey::attempts_mine(), |page| {
                self.api.attempts_mine(page)
            })
            .await?)
    }

    /// Append the next page of the user's attempts.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` on fetch failures.
    pub async fn load_more_history(&self) -> Result<PageSequence<AttemptSummary>, SessionError> {
        Ok(self
            .cache
            .fetch_next_page(CacheKey::attempts_mine(), |page| {
                self.api.attempts_mine(page)
            })
            .await?)
    }
}
