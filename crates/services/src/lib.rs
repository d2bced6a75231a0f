#![forbid(unsafe_code)]

pub mod app_services;
pub mod attempt_service;
pub mod attempt_session;
pub mod catalog_service;
pub mod config;
pub mod coordinator;
pub mod dashboard_service;
pub mod error;
pub mod scheduler;
pub mod timer_runner;

pub use quiz_core::Clock;
pub use storage::{ApiError, CacheEvent, PageSequence, ResourceKind};

pub use app_services::{AppServices, BackendMode};
pub use attempt_service::{AttemptResults, AttemptService};
pub use attempt_session::{AttemptSession, Progress, SubmitOutcome};
pub use catalog_service::CatalogService;
pub use config::ApiConfig;
pub use coordinator::SubmissionCoordinator;
pub use dashboard_service::DashboardService;
pub use error::{AppServicesError, ConfigError, SessionError};
pub use scheduler::{ManualScheduler, Scheduler, TaskControl, TaskHandle, TokioScheduler};
pub use timer_runner::TimerRunner;
