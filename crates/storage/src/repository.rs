use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{
    Answer, Attempt, AttemptId, AttemptSummary, DashboardStats, Page, QuizId, QuizSummary,
};
use thiserror::Error;

use crate::cache::CacheError;
use crate::memory::InMemoryApi;

/// Errors surfaced by remote API adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ApiError {
    /// Whether repeating the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Connection(_) | ApiError::Http(_) => true,
            ApiError::Status(code) => *code >= 500,
            ApiError::NotFound
            | ApiError::Conflict(_)
            | ApiError::Decode(_)
            | ApiError::Cache(_) => false,
        }
    }
}

/// Catalog filter. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizQuery {
    pub page: u32,
    pub search: Option<String>,
}

impl QuizQuery {
    #[must_use]
    pub fn first_page(search: Option<String>) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { page: 1, search }
    }

    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            search: self.search.clone(),
        }
    }
}

/// Contract of the remote learning-platform API as seen by this client.
///
/// Grading, persistence and authorization live behind this boundary.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Start a new attempt. The returned questions carry no answer key.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    async fn start_attempt(&self, quiz_id: QuizId) -> Result<Attempt, ApiError>;

    /// Submit the recorded answers of an attempt and receive it graded.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` if the server already closed the attempt.
    async fn submit_attempt(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<Attempt, ApiError>;

    /// Fetch a submitted attempt with correctness and explanations.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown attempts.
    async fn attempt_results(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError>;

    /// One page of the current user's attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    async fn attempts_mine(&self, page: u32) -> Result<Page<AttemptSummary>, ApiError>;

    /// Aggregate numbers for the current user's dashboard.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    /// One page of the quiz catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    async fn list_quizzes(&self, query: &QuizQuery) -> Result<Page<QuizSummary>, ApiError>;
}

/// The API adapter behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Backend {
    pub api: Arc<dyn QuizApi>,
}

impl Backend {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>) -> Self {
        Self { api }
    }

    /// Fake server seeded with the demo catalog.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(Arc::new(InMemoryApi::with_demo_catalog()))
    }
}
