use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::{Link, Navigator, use_navigator};
use quiz_core::model::{AttemptId, OptionLabel, QuestionId, QuizId};
use quiz_core::{SubmissionState, SubmitConfirmation, SubmitTrigger, TimerSnapshot};
use services::AttemptSession;
use tokio::sync::watch;
use tracing::warn;

use super::scripts::navigation_guard_script;
use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{Toaster, ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    ProgressVm, QuestionVm, SubmitBannerVm, TakeQuizVm, confirmation_message,
};

const TIME_UP_MESSAGE: &str = "Time is up. Your answers were submitted automatically.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QuizIntent {
    Select(QuestionId, OptionLabel),
    Next,
    Previous,
    GoTo(usize),
    RequestSubmit,
    CancelSubmit,
    ConfirmSubmit,
    RetrySubmit,
    RequestLeave,
    CancelLeave,
    ConfirmLeave,
}

/// Holds the running session outside of signal storage so unmount can
/// still reach it.
#[derive(Clone, Default)]
struct SessionSlot(Rc<RefCell<Option<Arc<AttemptSession>>>>);

impl SessionSlot {
    fn get(&self) -> Option<Arc<AttemptSession>> {
        self.0.borrow().clone()
    }

    fn set(&self, session: Arc<AttemptSession>) {
        if let Some(previous) = self.0.borrow_mut().replace(session) {
            previous.detach();
        }
    }

    fn detach(&self) {
        if let Some(session) = self.0.borrow().as_ref() {
            session.detach();
        }
    }
}

async fn follow_timer(mut timer: watch::Receiver<TimerSnapshot>, mut revision: Signal<u64>) {
    while timer.changed().await.is_ok() {
        revision += 1;
    }
}

async fn follow_submission(
    mut states: watch::Receiver<SubmissionState>,
    mut revision: Signal<u64>,
    toaster: Option<Toaster>,
    navigator: Navigator,
    attempt_id: AttemptId,
) {
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        revision += 1;
        match state {
            SubmissionState::Submitting {
                trigger: SubmitTrigger::Timer,
            } => {
                if let Some(toaster) = toaster {
                    toaster.show(TIME_UP_MESSAGE);
                }
            }
            SubmissionState::Submitted => {
                let _ = navigator.replace(Route::Results {
                    attempt_id: attempt_id.value(),
                });
                break;
            }
            _ => {}
        }
    }
}

#[component]
pub fn TakeQuizView(quiz_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let toaster = use_hook(try_consume_context::<Toaster>);
    let attempts = ctx.attempts();

    let slot = use_hook(SessionSlot::default);
    let revision = use_signal(|| 0_u64);
    let confirmation = use_signal(|| None::<SubmitConfirmation>);
    let leave_prompt = use_signal(|| false);

    let resource = {
        let slot = slot.clone();
        use_resource(move || {
            let attempts = attempts.clone();
            let slot = slot.clone();
            async move {
                let session = attempts
                    .start_attempt(QuizId::new(quiz_id))
                    .await
                    .map_err(ViewError::from)?;
                let session = Arc::new(session);
                let attempt_id = session.attempt_id();
                spawn(follow_timer(session.timer(), revision));
                spawn(follow_submission(
                    session.states(),
                    revision,
                    toaster,
                    navigator,
                    attempt_id,
                ));
                slot.set(session);
                Ok::<_, ViewError>(attempt_id)
            }
        })
    };

    {
        let slot = slot.clone();
        use_drop(move || slot.detach());
    }

    {
        let slot = slot.clone();
        use_effect(move || {
            let _revision = revision();
            let active = slot
                .get()
                .is_some_and(|session| session.should_guard_navigation());
            let _ = eval(&navigation_guard_script(active));
        });
    }

    let dispatch = {
        let slot = slot.clone();
        use_callback(move |intent: QuizIntent| {
            let mut revision = revision;
            let mut confirmation = confirmation;
            let mut leave_prompt = leave_prompt;

            if let QuizIntent::CancelLeave = intent {
                leave_prompt.set(false);
                return;
            }
            if let QuizIntent::ConfirmLeave = intent {
                leave_prompt.set(false);
                let _ = navigator.push(Route::Catalog {});
                return;
            }
            let Some(session) = slot.get() else {
                if let QuizIntent::RequestLeave = intent {
                    let _ = navigator.push(Route::Catalog {});
                }
                return;
            };

            match intent {
                QuizIntent::Select(question_id, option) => {
                    if let Err(err) = session.select(question_id, option) {
                        warn!(error = %err, "selection ignored");
                    }
                }
                QuizIntent::Next => {
                    session.next();
                }
                QuizIntent::Previous => {
                    session.previous();
                }
                QuizIntent::GoTo(index) => session.go_to(index),
                QuizIntent::RequestSubmit => confirmation.set(session.request_submit()),
                QuizIntent::CancelSubmit => {
                    session.cancel_submit();
                    confirmation.set(None);
                }
                QuizIntent::ConfirmSubmit => {
                    confirmation.set(None);
                    spawn(async move {
                        if let Err(err) = session.confirm_submit().await {
                            warn!(error = %err, "submit failed");
                        }
                        revision += 1;
                    });
                }
                QuizIntent::RetrySubmit => {
                    spawn(async move {
                        if let Err(err) = session.retry_submit().await {
                            warn!(error = %err, "submit retry failed");
                        }
                        revision += 1;
                    });
                }
                QuizIntent::RequestLeave => {
                    if session.should_guard_navigation() {
                        leave_prompt.set(true);
                    } else {
                        let _ = navigator.push(Route::Catalog {});
                    }
                }
                QuizIntent::CancelLeave | QuizIntent::ConfirmLeave => {}
            }
            revision += 1;
        })
    };

    #[cfg(test)]
    {
        if let Some(handles) = try_consume_context::<QuizTestHandles>() {
            handles.register(dispatch);
        }
    }

    let _revision = revision();
    let state = view_state_from_resource(resource);
    let vm = slot.get().map(|session| TakeQuizVm::from_session(&session));

    rsx! {
        div { class: "page quiz-page", id: "quiz-root",
            header { class: "quiz-header",
                h2 { class: "quiz-header__title",
                    if let Some(vm) = vm.as_ref() {
                        "{vm.quiz_title}"
                    } else {
                        "Quiz"
                    }
                }
                if let Some(vm) = vm.as_ref() {
                    span {
                        class: vm.timer.class(),
                        id: "quiz-timer",
                        "{vm.timer.label}"
                    }
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| dispatch.call(QuizIntent::RequestLeave),
                    "Leave"
                }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Starting attempt..." }
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
                    Link { class: "btn btn-secondary", to: Route::Catalog {}, "Back to quizzes" }
                },
                ViewState::Ready(_) => rsx! {
                    if let Some(vm) = vm.clone() {
                        QuizBody { vm, on_intent: dispatch }
                    }
                },
            }

            if let Some(pending) = confirmation() {
                ConfirmSubmitDialog {
                    message: confirmation_message(pending),
                    on_intent: dispatch,
                }
            }
            if leave_prompt() {
                LeaveDialog { on_intent: dispatch }
            }
        }
    }
}

#[component]
fn QuizBody(vm: TakeQuizVm, on_intent: Callback<QuizIntent>) -> Element {
    let can_answer = vm.can_answer;

    rsx! {
        if let Some(question) = vm.question {
            QuestionCard { question: question.clone(), can_answer, on_intent }
            nav { class: "quiz-nav",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: question.is_first,
                    onclick: move |_| on_intent.call(QuizIntent::Previous),
                    "Previous"
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: question.is_last,
                    onclick: move |_| on_intent.call(QuizIntent::Next),
                    "Next"
                }
                button {
                    class: "btn btn-primary",
                    id: "quiz-submit",
                    r#type: "button",
                    disabled: !can_answer,
                    onclick: move |_| on_intent.call(QuizIntent::RequestSubmit),
                    "Submit"
                }
            }
        }
        ProgressStrip { progress: vm.progress, on_intent }
        match vm.banner {
            Some(SubmitBannerVm::Submitting { forced: true }) => rsx! {
                p { class: "quiz-banner", "Time is up. Submitting your answers..." }
            },
            Some(SubmitBannerVm::Submitting { forced: false }) => rsx! {
                p { class: "quiz-banner", "Submitting your answers..." }
            },
            Some(SubmitBannerVm::Failed { message }) => rsx! {
                div { class: "quiz-banner quiz-banner--error",
                    p { "{message}" }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::RetrySubmit),
                        "Retry submit"
                    }
                }
            },
            None => rsx! {},
        }
    }
}

#[component]
fn QuestionCard(question: QuestionVm, can_answer: bool, on_intent: Callback<QuizIntent>) -> Element {
    let question_id = question.id;

    rsx! {
        section { class: "question-card",
            p { class: "question-card__position", "{question.position_label}" }
            h3 { class: "question-card__prompt", "{question.prompt}" }
            ul { class: "question-card__options",
                for option in question.options {
                    li { key: "{option.label}",
                        button {
                            class: option.class(),
                            r#type: "button",
                            disabled: !can_answer,
                            aria_pressed: "{option.selected}",
                            onclick: move |_| on_intent.call(QuizIntent::Select(question_id, option.label)),
                            span { class: "option__label", "{option.label}" }
                            span { class: "option__text", "{option.text}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ProgressStrip(progress: ProgressVm, on_intent: Callback<QuizIntent>) -> Element {
    rsx! {
        footer { class: "quiz-progress",
            span { class: "quiz-progress__label", "{progress.answered_label}" }
            ol { class: "quiz-progress__jumps",
                for jump in progress.jumps {
                    li { key: "{jump.index}",
                        button {
                            class: jump.class(),
                            r#type: "button",
                            onclick: move |_| on_intent.call(QuizIntent::GoTo(jump.index)),
                            "{jump.label}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ConfirmSubmitDialog(message: String, on_intent: Callback<QuizIntent>) -> Element {
    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| on_intent.call(QuizIntent::CancelSubmit),
            div {
                class: "modal",
                role: "dialog",
                aria_modal: "true",
                onclick: move |evt| evt.stop_propagation(),
                h3 { class: "modal__title", "Submit your answers?" }
                p { class: "modal__body", "{message}" }
                div { class: "modal__actions",
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::CancelSubmit),
                        "Keep answering"
                    }
                    button {
                        class: "btn btn-primary",
                        id: "quiz-confirm-submit",
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::ConfirmSubmit),
                        "Submit"
                    }
                }
            }
        }
    }
}

#[component]
fn LeaveDialog(on_intent: Callback<QuizIntent>) -> Element {
    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| on_intent.call(QuizIntent::CancelLeave),
            div {
                class: "modal",
                role: "dialog",
                aria_modal: "true",
                onclick: move |evt| evt.stop_propagation(),
                h3 { class: "modal__title", "Leave this quiz?" }
                p { class: "modal__body",
                    "Your answers have not been submitted. The attempt cannot be resumed."
                }
                div { class: "modal__actions",
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::CancelLeave),
                        "Stay"
                    }
                    button {
                        class: "btn btn-danger",
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::ConfirmLeave),
                        "Leave"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<QuizIntent>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }
}
