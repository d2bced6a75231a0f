use dioxus::prelude::*;
use dioxus_router::Link;
use services::ResourceKind;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, use_restart_on_invalidate, view_state_from_resource};
use crate::vm::{AttemptCardVm, map_attempt_cards};

#[derive(Clone, Debug, PartialEq)]
struct HistoryData {
    cards: Vec<AttemptCardVm>,
    has_more: bool,
}

#[component]
pub fn HistoryView() -> Element {
    let ctx = use_context::<AppContext>();
    let attempts = ctx.attempts();
    let events = attempts.clone();
    let mut pages = use_signal(|| 1_u32);

    let resource = use_resource(move || {
        let attempts = attempts.clone();
        let wanted = pages();
        async move {
            let mut seq = attempts.history().await.map_err(ViewError::from)?;
            while seq.loaded_pages() < wanted && seq.has_more() {
                seq = attempts.load_more_history().await.map_err(ViewError::from)?;
            }
            Ok::<_, ViewError>(HistoryData {
                cards: map_attempt_cards(seq.items()),
                has_more: seq.has_more(),
            })
        }
    });
    use_restart_on_invalidate(resource, ResourceKind::AttemptsMine, move || events.subscribe());

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "My attempts" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.cards.is_empty() {
                        p { "No attempts yet." }
                    } else {
                        ul { class: "attempt-list",
                            for card in data.cards {
                                AttemptCard { key: "{card.id}", card }
                            }
                        }
                    }
                    if data.has_more {
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| pages += 1,
                            "Load more"
                        }
                    }
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

#[component]
fn AttemptCard(card: AttemptCardVm) -> Element {
    let passed_class = match card.passed {
        Some(true) => "attempt-status attempt-status--passed",
        Some(false) => "attempt-status attempt-status--failed",
        None => "attempt-status",
    };

    rsx! {
        li { class: "attempt-card",
            span { class: "attempt-title", "{card.quiz_title}" }
            span { class: "attempt-date", "{card.started_at_str}" }
            span { class: passed_class, "{card.status_label}" }
            if let Some(score) = card.score_label.as_ref() {
                span { class: "attempt-score", "{score}" }
            }
            if card.has_results() {
                Link {
                    class: "attempt-link",
                    to: Route::Results { attempt_id: card.id.value() },
                    "View results"
                }
            }
        }
    }
}
