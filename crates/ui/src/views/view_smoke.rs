use quiz_core::model::{AttemptId, OptionLabel, QuestionId, QuizId};
use services::AppServices;

use super::take_quiz::QuizIntent;
use super::test_harness::{ViewKind, setup_view_harness};

const RUST_BASICS: QuizId = QuizId::new(1);

/// Answers the first `picks.len()` questions of the Rust quiz and submits.
async fn submit_rust_basics(services: &AppServices, picks: &[OptionLabel]) -> AttemptId {
    let session = services.attempts().start_attempt(RUST_BASICS).await.unwrap();
    for (offset, pick) in (1_u64..).zip(picks) {
        session.select(QuestionId::new(100 + offset), *pick).unwrap();
    }
    session.request_submit().unwrap();
    session.confirm_submit().await.unwrap();
    session.attempt_id()
}

const ALL_CORRECT: [OptionLabel; 5] = [
    OptionLabel::A,
    OptionLabel::B,
    OptionLabel::C,
    OptionLabel::D,
    OptionLabel::B,
];

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_dashboard_counts() {
    let (mut harness, _api) = setup_view_harness(ViewKind::Home);
    submit_rust_basics(&harness.services, &ALL_CORRECT).await;

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Dashboard"), "missing title in {html}");
    assert!(html.contains("Average score"), "missing average in {html}");
    assert!(html.contains("100%"), "missing score in {html}");
    assert!(!html.contains("No attempts yet."), "unexpected empty hint in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_error_state() {
    let (mut harness, api) = setup_view_harness(ViewKind::Home);
    api.set_offline(true);

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Could not reach the server"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_refreshes_after_submit() {
    let (mut harness, _api) = setup_view_harness(ViewKind::Home);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("No attempts yet."), "missing empty hint in {html}");

    submit_rust_basics(&harness.services, &ALL_CORRECT).await;
    for _ in 0..4 {
        harness.drive_async().await;
    }

    let html = harness.render();
    assert!(html.contains("100%"), "stats not refreshed in {html}");
    assert!(!html.contains("No attempts yet."), "stale empty hint in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn catalog_view_smoke_lists_quizzes() {
    let (mut harness, _api) = setup_view_harness(ViewKind::Catalog);

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Rust basics"), "missing quiz in {html}");
    assert!(html.contains("SQL fundamentals"), "missing quiz in {html}");
    assert!(html.contains("5 questions"), "missing question count in {html}");
    assert!(html.contains("Pass at 60%"), "missing pass mark in {html}");
    assert!(!html.contains("Load more"), "single page should not offer more in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn catalog_view_smoke_offers_load_more() {
    let (mut harness, api) = setup_view_harness(ViewKind::Catalog);
    api.set_page_size(2);

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Load more"), "missing load more in {html}");
    assert!(!html.contains("Networking"), "second page rendered early in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_renders_attempt_cards() {
    let (mut harness, _api) = setup_view_harness(ViewKind::History);
    submit_rust_basics(&harness.services, &ALL_CORRECT).await;
    let _running = harness
        .services
        .attempts()
        .start_attempt(RUST_BASICS)
        .await
        .unwrap();

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("In progress"), "missing running attempt in {html}");
    assert!(html.contains("Passed"), "missing graded attempt in {html}");
    assert!(html.contains("View results"), "missing results link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_refreshes_after_submit() {
    let (mut harness, _api) = setup_view_harness(ViewKind::History);
    let session = harness
        .services
        .attempts()
        .start_attempt(RUST_BASICS)
        .await
        .unwrap();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("In progress"), "missing running attempt in {html}");

    for (offset, pick) in (1_u64..).zip(ALL_CORRECT) {
        session.select(QuestionId::new(100 + offset), pick).unwrap();
    }
    session.request_submit().unwrap();
    session.confirm_submit().await.unwrap();
    for _ in 0..4 {
        harness.drive_async().await;
    }

    let html = harness.render();
    assert!(html.contains("View results"), "history not refreshed in {html}");
    assert!(!html.contains("In progress"), "stale running attempt in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_renders_rows() {
    let (mut harness, _api) = setup_view_harness(ViewKind::Results(1));
    let attempt_id = submit_rust_basics(
        &harness.services,
        &[OptionLabel::A, OptionLabel::A],
    )
    .await;
    assert_eq!(attempt_id.value(), 1);

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Rust basics"), "missing title in {html}");
    assert!(html.contains("Correct"), "missing correct row in {html}");
    assert!(html.contains("Incorrect"), "missing incorrect row in {html}");
    assert!(html.contains("Not answered"), "missing unanswered row in {html}");
    assert!(
        html.contains("Bindings are immutable unless declared with"),
        "missing explanation in {html}"
    );
    assert!(html.contains("Not passed"), "missing verdict in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_refuses_running_attempt() {
    let (mut harness, _api) = setup_view_harness(ViewKind::Results(1));
    let _running = harness
        .services
        .attempts()
        .start_attempt(RUST_BASICS)
        .await
        .unwrap();

    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("Results are available after the attempt is submitted."),
        "missing refusal in {html}"
    );
    assert!(!html.contains("Retry"), "refusal should not offer retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_view_smoke_renders_first_question() {
    let (mut harness, _api) = setup_view_harness(ViewKind::TakeQuiz(RUST_BASICS.value()));

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Question 1 of 5"), "missing position in {html}");
    assert!(
        html.contains("Which keyword declares a mutable binding?"),
        "missing prompt in {html}"
    );
    assert!(html.contains("5:00"), "missing countdown in {html}");
    assert!(html.contains("0 of 5 answered"), "missing progress in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_view_smoke_confirms_with_answered_count() {
    let (mut harness, _api) = setup_view_harness(ViewKind::TakeQuiz(RUST_BASICS.value()));
    harness.settle().await;

    let dispatch = harness.quiz_handles.as_ref().unwrap().dispatch();
    harness.dom.in_runtime(|| {
        dispatch.call(QuizIntent::Select(QuestionId::new(101), OptionLabel::A));
        dispatch.call(QuizIntent::Next);
        dispatch.call(QuizIntent::RequestSubmit);
    });
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Question 2 of 5"), "missing advance in {html}");
    assert!(html.contains("1 of 5 answered"), "missing progress in {html}");
    assert!(
        html.contains("You answered 1 of 5 questions."),
        "missing confirmation in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_view_smoke_flags_low_time() {
    let (mut harness, _api) = setup_view_harness(ViewKind::TakeQuiz(RUST_BASICS.value()));
    harness.settle().await;

    harness.scheduler.advance(181);
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("1:59"), "missing countdown in {html}");
    assert!(html.contains("quiz-timer--low"), "missing low-time flag in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_view_smoke_offers_retry_when_start_fails() {
    let (mut harness, api) = setup_view_harness(ViewKind::TakeQuiz(RUST_BASICS.value()));
    api.set_offline(true);

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Could not reach the server"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
    assert_eq!(harness.scheduler.active_tasks(), 0);
}
