use std::sync::Arc;

use quiz_core::model::DashboardStats;
use storage::{ApiError, CacheEvent, CacheKey, QuizApi, RemoteDataCache};
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn QuizApi>,
    cache: RemoteDataCache,
}

impl DashboardService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, cache: RemoteDataCache) -> Self {
        Self { api, cache }
    }

    /// Current user's aggregate, refetched after any attempt mutation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on fetch failures.
    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.cache
            .fetch(CacheKey::dashboard(), || self.api.dashboard_stats())
            .await
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }
}
