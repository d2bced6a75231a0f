use dioxus::prelude::*;
use services::{ApiError, CacheEvent, ResourceKind, SessionError};
use tokio::sync::broadcast::{self, error::RecvError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The server could not be reached or failed transiently.
    Offline,
    NotFound,
    /// Results were requested for an attempt that is still running.
    NotSubmitted,
    Rejected,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ViewError::Offline => "Could not reach the server. Check your connection and retry.",
            ViewError::NotFound => "This item no longer exists.",
            ViewError::NotSubmitted => "Results are available after the attempt is submitted.",
            ViewError::Rejected => "The server rejected the request.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ViewError::Offline | ViewError::Unknown)
    }
}

impl From<&ApiError> for ViewError {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::NotFound => ViewError::NotFound,
            err if err.is_retryable() => ViewError::Offline,
            ApiError::Conflict(_) | ApiError::Status(_) => ViewError::Rejected,
            _ => ViewError::Unknown,
        }
    }
}

impl From<ApiError> for ViewError {
    fn from(err: ApiError) -> Self {
        ViewError::from(&err)
    }
}

impl From<SessionError> for ViewError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Api(api) => ViewError::from(&api),
            SessionError::NotSubmitted(_) => ViewError::NotSubmitted,
            SessionError::Interrupted => ViewError::Offline,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Restart `resource` whenever the cache marks an entry of `kind` stale.
pub fn use_restart_on_invalidate<T: 'static>(
    resource: Resource<T>,
    kind: ResourceKind,
    subscribe: impl Fn() -> broadcast::Receiver<CacheEvent> + 'static,
) {
    use_future(move || {
        let mut events = subscribe();
        let mut resource = resource;
        async move {
            loop {
                match events.recv().await {
                    Ok(CacheEvent::Invalidated(key)) if key.kind() == kind => resource.restart(),
                    Ok(_) => {}
                    // Missed events may include ours.
                    Err(RecvError::Lagged(_)) => resource.restart(),
                    Err(RecvError::Closed) => break,
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_api_failures_read_as_offline() {
        assert_eq!(
            ViewError::from(ApiError::Connection("reset".into())),
            ViewError::Offline
        );
        assert_eq!(ViewError::from(ApiError::Status(503)), ViewError::Offline);
        assert_eq!(ViewError::from(ApiError::Status(422)), ViewError::Rejected);
    }

    #[test]
    fn running_attempt_results_map_to_not_submitted() {
        let err = SessionError::NotSubmitted(quiz_core::model::AttemptId::new(3));
        let view = ViewError::from(err);
        assert_eq!(view, ViewError::NotSubmitted);
        assert!(!view.is_retryable());
    }
}
