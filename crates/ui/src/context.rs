use std::sync::Arc;

use services::{AttemptService, BackendMode, CatalogService, DashboardService};

pub trait UiApp: Send + Sync {
    fn backend_mode(&self) -> BackendMode;

    fn attempts(&self) -> Arc<AttemptService>;
    fn catalog(&self) -> Arc<CatalogService>;
    fn dashboard(&self) -> Arc<DashboardService>;
}

#[derive(Clone)]
pub struct AppContext {
    backend_mode: BackendMode,

    attempts: Arc<AttemptService>,
    catalog: Arc<CatalogService>,
    dashboard: Arc<DashboardService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            backend_mode: app.backend_mode(),
            attempts: app.attempts(),
            catalog: app.catalog(),
            dashboard: app.dashboard(),
        }
    }

    #[must_use]
    pub fn backend_mode(&self) -> BackendMode {
        self.backend_mode
    }

    /// True when the app runs against the bundled sample catalog.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.backend_mode == BackendMode::Demo
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

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
