use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QuizCardVm, map_quiz_cards};

#[derive(Clone, Debug, PartialEq)]
struct CatalogData {
    cards: Vec<QuizCardVm>,
    has_more: bool,
}

#[component]
pub fn CatalogView() -> Element {
    let ctx = use_context::<AppContext>();
    let catalog = ctx.catalog();
    let mut search = use_signal(String::new);
    let mut pages = use_signal(|| 1_u32);

    let resource = use_resource(move || {
        let catalog = catalog.clone();
        let wanted = pages();
        let query = search.read().trim().to_string();
        async move {
            let query = (!query.is_empty()).then_some(query);
            let seq = catalog
                .list_quizzes(wanted, query)
                .await
                .map_err(ViewError::from)?;
            Ok::<_, ViewError>(CatalogData {
                cards: map_quiz_cards(seq.items()),
                has_more: seq.has_more(),
            })
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "Quizzes" }

            input {
                class: "catalog-search",
                r#type: "search",
                placeholder: "Search quizzes",
                value: "{search}",
                oninput: move |evt| {
                    search.set(evt.value());
                    pages.set(1);
                },
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.cards.is_empty() {
                        p { "No quizzes match." }
                    } else {
                        ul { class: "quiz-list",
                            for card in data.cards {
                                QuizCard { key: "{card.id}", card }
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
fn QuizCard(card: QuizCardVm) -> Element {
    let navigator = use_navigator();
    let quiz_id = card.id.value();

    rsx! {
        li { class: "quiz-card",
            h3 { class: "quiz-card__title", "{card.title}" }
            if let Some(description) = card.description.as_ref() {
                p { class: "quiz-card__description", "{description}" }
            }
            p { class: "quiz-card__meta",
                span { "{card.questions_label}" }
                span { "{card.duration_label}" }
                span { "{card.pass_label}" }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| {
                    let _ = navigator.push(Route::TakeQuiz { quiz_id });
                },
                "Start"
            }
        }
    }
}
