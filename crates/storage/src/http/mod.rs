mod dto;
mod mapping;

use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{
    Answer, Attempt, AttemptId, AttemptSummary, DashboardStats, Page, QuizId, QuizSummary,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::repository::{ApiError, QuizApi, QuizQuery};
use dto::{AttemptDto, AttemptListDto, QuizListDto, SubmitRequest};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug)]
pub struct HttpApiConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl HttpApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `QuizApi` over the platform's JSON REST endpoints.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    config: HttpApiConfig,
}

impl HttpApi {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the TLS backend cannot be initialised.
    pub fn new(config: HttpApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ApiError::Connection(e.to_string())
            } else {
                ApiError::Http(e)
            }
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "api response");
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %response.url(), "api request failed");
            return Err(match status {
                StatusCode::NOT_FOUND => ApiError::NotFound,
                StatusCode::CONFLICT => {
                    ApiError::Conflict(response.text().await.unwrap_or_default())
                }
                other => ApiError::Status(other.as_u16()),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl QuizApi for HttpApi {
    async fn start_attempt(&self, quiz_id: QuizId) -> Result<Attempt, ApiError> {
        let request = self.client.post(self.url(&format!("quizzes/{quiz_id}/attempts")));
        let dto: AttemptDto = self.send(request).await?;
        mapping::map_attempt(dto)
    }

    async fn submit_attempt(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<Attempt, ApiError> {
        let request = self
            .client
            .put(self.url(&format!("attempts/{attempt_id}/submit")))
            .json(&SubmitRequest { answers });
        let dto: AttemptDto = self.send(request).await?;
        mapping::map_attempt(dto)
    }

    async fn attempt_results(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("attempts/{attempt_id}/results")));
        let dto: AttemptDto = self.send(request).await?;
        mapping::map_attempt(dto)
    }

    async fn attempts_mine(&self, page: u32) -> Result<Page<AttemptSummary>, ApiError> {
        let request = self
            .client
            .get(self.url("attempts/mine"))
            .query(&[("page", page)]);
        let dto: AttemptListDto = self.send(request).await?;
        Ok(mapping::map_attempt_list(dto))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let request = self.client.get(self.url("dashboard/stats"));
        self.send(request).await
    }

    async fn list_quizzes(&self, query: &QuizQuery) -> Result<Page<QuizSummary>, ApiError> {
        let mut request = self
            .client
            .get(self.url("quizzes"))
            .query(&[("page", query.page)]);
        if let Some(search) = &query.search {
            request = request.query(&[("search", search)]);
        }
        let dto: QuizListDto = self.send(request).await?;
        Ok(Page::new(
            dto.quizzes,
            dto.pagination.current_page,
            dto.pagination.last_page,
        ))
    }
}
