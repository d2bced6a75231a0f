use std::sync::Arc;

use quiz_core::model::QuizSummary;
use storage::{ApiError, CacheKey, PageSequence, QuizApi, QuizQuery, RemoteDataCache};

/// Quiz catalog with per-search page sequences.
#[derive(Clone)]
pub struct CatalogService {
    api: Arc<dyn QuizApi>,
    cache: RemoteDataCache,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, cache: RemoteDataCache) -> Self {
        Self { api, cache }
    }

    /// Catalog pages `1..=page` for `search`.
    ///
    /// Each distinct search keeps its own sequence, so changing the filter
    /// never disturbs the pages loaded for another one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on fetch failures.
    pub async fn list_quizzes(
        &self,
        page: u32,
        search: Option<String>,
    ) -> Result<PageSequence<QuizSummary>, ApiError> {
        let query = QuizQuery::first_page(search);
        let key = CacheKey::quizzes(query.search.as_deref());
        let fetch = |page: u32| {
            let query = query.with_page(page);
            let api = Arc::clone(&self.api);
            async move { api.list_quizzes(&query).await }
        };

        let mut seq = self.cache.fetch_first_page(key.clone(), fetch).await?;
        while seq.loaded_pages() < page && seq.has_more() {
            seq = self.cache.fetch_next_page(key.clone(), fetch).await?;
        }
        Ok(seq)
    }
}
