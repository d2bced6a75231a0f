use dioxus::prelude::*;
use dioxus_router::Link;
use services::ResourceKind;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, use_restart_on_invalidate, view_state_from_resource};
use crate::vm::DashboardVm;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let dashboard = ctx.dashboard();
    let events = dashboard.clone();

    let resource = use_resource(move || {
        let dashboard = dashboard.clone();
        async move {
            let stats = dashboard.stats().await.map_err(ViewError::from)?;
            Ok::<_, ViewError>(DashboardVm::from(stats))
        }
    });
    use_restart_on_invalidate(resource, ResourceKind::Dashboard, move || events.subscribe());

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "Dashboard" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(stats) => rsx! {
                    dl { class: "stats",
                        dt { "Attempts" }
                        dd { "{stats.total}" }

                        dt { "Completed" }
                        dd { "{stats.completed}" }

                        dt { "Passed" }
                        dd { "{stats.passed}" }

                        dt { "Average score" }
                        dd { "{stats.average_label}" }
                    }
                    if stats.total == 0 {
                        p { class: "empty-hint", "No attempts yet." }
                    }
                    Link { class: "btn btn-primary", to: Route::Catalog {}, "Browse quizzes" }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
            }
        }
    }
}
