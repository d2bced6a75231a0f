use std::sync::Arc;
use std::time::Duration;

use storage::{Backend, HttpApi, RemoteDataCache};
use tracing::info;

use crate::Clock;
use crate::attempt_service::AttemptService;
use crate::catalog_service::CatalogService;
use crate::config::ApiConfig;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Demo,
}

/// Assembles app-facing services over one backend and one shared cache.
#[derive(Clone)]
pub struct AppServices {
    mode: BackendMode,
    cache: RemoteDataCache,
    attempts: Arc<AttemptService>,
    catalog: Arc<CatalogService>,
    dashboard: Arc<DashboardService>,
}

fn stale_time(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(1))
}

impl AppServices {
    #[must_use]
    pub fn new(
        mode: BackendMode,
        backend: &Backend,
        scheduler: Arc<dyn Scheduler>,
        clock: Clock,
        cache_stale_time: Duration,
    ) -> Self {
        let cache = RemoteDataCache::new(clock, stale_time(cache_stale_time));
        let attempts = Arc::new(AttemptService::new(
            Arc::clone(&backend.api),
            cache.clone(),
            scheduler,
        ));
        let catalog = Arc::new(CatalogService::new(Arc::clone(&backend.api), cache.clone()));
        let dashboard = Arc::new(DashboardService::new(Arc::clone(&backend.api), cache.clone()));
        Self {
            mode,
            cache,
            attempts,
            catalog,
            dashboard,
        }
    }

    /// Build services talking to the configured HTTP API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client cannot be created.
    pub fn remote(config: &ApiConfig, scheduler: Arc<dyn Scheduler>) -> Result<Self, AppServicesError> {
        let api = HttpApi::new(config.http_config())?;
        info!(base_url = %config.base_url, "using remote quiz API");
        Ok(Self::new(
            BackendMode::Remote,
            &Backend::new(Arc::new(api)),
            scheduler,
            Clock::system(),
            config.cache_stale_time,
        ))
    }

    /// Build services over the in-memory demo backend.
    #[must_use]
    pub fn demo(config: &ApiConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        info!("using in-memory demo backend");
        Self::new(
            BackendMode::Demo,
            &Backend::demo(),
            scheduler,
            Clock::system(),
            config.cache_stale_time,
        )
    }

    #[must_use]
    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    #[must_use]
    pub fn cache(&self) -> RemoteDataCache {
        self.cache.clone()
    }

    #[must_use]
    pub fn attempts(&self) -> Arc<AttemptService> {
        Arc::clone(&self.attempts)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
