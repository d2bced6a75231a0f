use mockito::{Matcher, Server};
use quiz_core::model::{Answer, AttemptId, OptionLabel, QuestionId, QuizId};
use serde_json::json;
use storage::repository::{ApiError, QuizApi, QuizQuery};
use storage::{HttpApi, HttpApiConfig};

fn api(server: &Server) -> HttpApi {
    HttpApi::new(HttpApiConfig::new(server.url()).with_token("secret")).expect("client")
}

fn question(id: u64, correct: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "question_text": format!("Question {id}"),
        "option_a": "a",
        "option_b": "b",
        "option_c": "c",
        "option_d": "d",
        "correct_option": correct,
    })
}

fn in_progress_attempt(with_keys: bool) -> serde_json::Value {
    let key = with_keys.then_some("A");
    json!({
        "id": 41,
        "user_id": 7,
        "quiz": {"id": 3, "title": "Networking"},
        "questions": [question(1, key), question(2, key)],
        "duration_minutes": 2,
        "status": "in_progress",
        "started_at": "2024-05-01T09:00:00Z",
    })
}

#[tokio::test]
async fn start_attempt_posts_with_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/quizzes/3/attempts")
        .match_header("authorization", "Bearer secret")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(in_progress_attempt(false).to_string())
        .create_async()
        .await;

    let attempt = api(&server).start_attempt(QuizId::new(3)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(attempt.id(), AttemptId::new(41));
    assert_eq!(attempt.duration_secs(), 120);
    assert_eq!(attempt.questions().len(), 2);
}

#[tokio::test]
async fn leaked_answer_keys_are_dropped() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/quizzes/3/attempts")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(in_progress_attempt(true).to_string())
        .create_async()
        .await;

    let attempt = api(&server).start_attempt(QuizId::new(3)).await.unwrap();

    assert!(attempt.questions().iter().all(|q| q.answer_key().is_none()));
}

#[tokio::test]
async fn submit_sends_answer_pairs() {
    let mut server = Server::new_async().await;
    let graded = json!({
        "id": 41,
        "user_id": 7,
        "quiz": {"id": 3, "title": "Networking"},
        "questions": [question(1, Some("A")), question(2, Some("C"))],
        "duration_minutes": 2,
        "status": "submitted",
        "started_at": "2024-05-01T09:00:00Z",
        "completed_at": "2024-05-01T09:01:30Z",
        "score": 1,
        "max_score": 2,
        "percentage": 50.0,
        "passed": false,
        "answers": [
            {"question_id": 1, "selected_option": "A", "is_correct": true},
            {"question_id": 2, "selected_option": null, "is_correct": false}
        ]
    });
    let mock = server
        .mock("PUT", "/attempts/41/submit")
        .match_body(Matcher::Json(json!({
            "answers": [{"question_id": 1, "selected_option": "A"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(graded.to_string())
        .create_async()
        .await;

    let answers = [Answer::new(QuestionId::new(1), OptionLabel::A)];
    let attempt = api(&server)
        .submit_attempt(AttemptId::new(41), &answers)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(attempt.is_submitted());
    assert_eq!(attempt.outcome().unwrap().percentage, 50.0);
    assert!(attempt.questions()[1].answer_key().is_some());
}

#[tokio::test]
async fn status_codes_map_to_api_errors() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/attempts/5/results")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("PUT", "/attempts/6/submit")
        .with_status(409)
        .with_body("already submitted")
        .create_async()
        .await;
    server
        .mock("GET", "/dashboard/stats")
        .with_status(503)
        .create_async()
        .await;
    let api = api(&server);

    let not_found = api.attempt_results(AttemptId::new(5)).await.unwrap_err();
    assert!(matches!(not_found, ApiError::NotFound));

    let conflict = api.submit_attempt(AttemptId::new(6), &[]).await.unwrap_err();
    assert!(matches!(conflict, ApiError::Conflict(ref body) if body == "already submitted"));

    let unavailable = api.dashboard_stats().await.unwrap_err();
    assert!(matches!(unavailable, ApiError::Status(503)));
    assert!(unavailable.is_retryable());
}

#[tokio::test]
async fn attempt_list_is_paginated() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/attempts/mine")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "attempts": [{
                    "id": 9,
                    "quiz": {"id": 3, "title": "Networking"},
                    "status": "submitted",
                    "started_at": "2024-05-01T09:00:00Z",
                    "completed_at": "2024-05-01T09:01:00Z",
                    "percentage": 100.0,
                    "passed": true
                }],
                "pagination": {"current_page": 2, "last_page": 3}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let page = api(&server).attempts_mine(2).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].passed, Some(true));
    assert_eq!(page.pagination.next_page(), Some(3));
}

#[tokio::test]
async fn catalog_search_is_sent_as_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/quizzes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("search".into(), "rust".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "quizzes": [{
                    "id": 1,
                    "title": "Rust basics",
                    "description": null,
                    "question_count": 5,
                    "duration_minutes": 5,
                    "pass_percentage": 60
                }],
                "pagination": {"current_page": 1, "last_page": 1}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let page = api(&server)
        .list_quizzes(&QuizQuery::first_page(Some("rust".into())))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.items[0].title, "Rust basics");
    assert!(!page.pagination.has_next());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/dashboard/stats")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{\"total_attempts\": \"many\"}")
        .create_async()
        .await;

    let err = api(&server).dashboard_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
