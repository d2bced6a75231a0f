use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::AttemptId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ResultRowVm, ResultsVm, map_results};

#[component]
pub fn ResultsView(attempt_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let attempts = ctx.attempts();
    let attempt_id = AttemptId::new(attempt_id);

    let resource = {
        let attempts = attempts.clone();
        use_resource(move || {
            let attempts = attempts.clone();
            async move {
                let results = attempts
                    .results(attempt_id)
                    .await
                    .map_err(ViewError::from)?;
                Ok::<_, ViewError>(map_results(&results))
            }
        })
    };

    // Graded answers are only kept while the page shows them.
    use_drop(move || {
        attempts.forget_results(attempt_id);
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "Results" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(results) => rsx! {
                    ResultsDetails { results }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                    if err.is_retryable() {
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| {
                                let mut resource = resource;
                                resource.restart();
                            },
                            "Retry"
                        }
                    }
                },
            }

            Link { class: "btn btn-secondary", to: Route::History {}, "Back to my attempts" }
        }
    }
}

#[component]
fn ResultsDetails(results: ResultsVm) -> Element {
    let verdict = if results.passed { "Passed" } else { "Not passed" };
    let verdict_class = if results.passed {
        "results-verdict results-verdict--passed"
    } else {
        "results-verdict results-verdict--failed"
    };

    rsx! {
        h3 { "{results.quiz_title}" }
        dl { class: "summary",
            dt { "Score" }
            dd { "{results.score_label}" }

            dt { "Percentage" }
            dd { "{results.percentage_label}" }

            if let Some(completed) = results.completed_at_str.as_ref() {
                dt { "Completed" }
                dd { "{completed}" }
            }
        }
        p { class: verdict_class, "{verdict}" }
        ol { class: "result-rows",
            for row in results.rows {
                ResultRowItem { key: "{row.position}", row }
            }
        }
    }
}

#[component]
fn ResultRowItem(row: ResultRowVm) -> Element {
    let class = format!("result-row {}", row.verdict_class());

    rsx! {
        li { class: "{class}",
            p { class: "result-row__prompt", "{row.number}. {row.prompt}" }
            ul { class: "result-row__options",
                for option in row.options {
                    li {
                        key: "{option.label}",
                        class: option.class(),
                        span { class: "result-option__label", "{option.label}" }
                        span { "{option.text}" }
                        if option.selected {
                            span { class: "result-option__mark", "Your answer" }
                        }
                    }
                }
            }
            p { class: "result-row__verdict", "{row.verdict_label}" }
            if let Some(explanation) = row.explanation.as_ref() {
                p { class: "result-row__explanation", "{explanation}" }
            }
        }
    }
}
