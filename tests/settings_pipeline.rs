//! Settings pipeline tests against a local GitHub stand-in.
//!
//! Each test serves canned responses from an axum router bound to an
//! ephemeral port and points the client at it.
//!
//! Scenarios:
//! 1. Unknown user alongside a valid contributor list
//! 2. Repository with a single contributor
//! 3. Successful load with the owner blacklisted by default
//! 4. Transport, body and status failures mapped to their kinds
//! 5. Both lookups in flight at the same time

use axum::http::StatusCode;
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use reviewer_roulette::error::ErrorKind;
use reviewer_roulette::models::{SettingsPhase, SettingsState};
use reviewer_roulette::services::{
    GitHubClient, GitHubClientConfig, MemoryStore, SettingsPipeline, SettingsStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

fn user_json(id: i64, login: &str) -> Value {
    json!({
        "id": id,
        "login": login,
        "avatar_url": format!("https://avatars.example/u/{}", id),
        "type": "User",
        "contributions": 10,
    })
}

fn respond(status: StatusCode, body: Value) -> MethodRouter {
    get(move || {
        let body = body.clone();
        async move { (status, Json(body)) }
    })
}

fn respond_raw(status: StatusCode, body: &'static str) -> MethodRouter {
    get(move || async move { (status, body) })
}

/// Serve `app` on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn pipeline(base_url: &str) -> SettingsPipeline {
    let client = GitHubClient::new(GitHubClientConfig {
        base_url: base_url.to_string(),
        ..Default::default()
    })
    .unwrap();
    SettingsPipeline::new(client)
}

async fn load(base_url: &str, login: &str, repository: &str) -> SettingsState {
    let mut store = SettingsStore::new(MemoryStore::new());
    let _ = pipeline(base_url)
        .fetch_settings(&mut store, login, repository)
        .await;
    store.state().clone()
}

#[tokio::test]
async fn test_unknown_user_fails_without_adopting_contributors() {
    let contributors: Vec<Value> = (1..=5).map(|id| user_json(id, &format!("u{}", id))).collect();
    let base_url = serve(
        Router::new()
            .route(
                "/users/alice",
                respond(StatusCode::NOT_FOUND, json!({ "message": "Not Found" })),
            )
            .route(
                "/repos/alice/repo/contributors",
                respond(StatusCode::OK, Value::Array(contributors)),
            ),
    )
    .await;

    let state = load(&base_url, "alice", "repo").await;

    assert_eq!(state.phase(), SettingsPhase::Failure);
    let user_error = state.user_error.unwrap();
    assert_eq!(user_error.kind, ErrorKind::NotFoundError);
    assert_eq!(user_error.message, "User \"alice\" not found.");
    assert!(state.repository_error.is_none());
    assert!(state.user.is_none());
    assert!(state.contributors.is_empty());
}

#[tokio::test]
async fn test_single_contributor_has_no_reviewers() {
    let base_url = serve(
        Router::new()
            .route("/users/bob", respond(StatusCode::OK, user_json(7, "bob")))
            .route(
                "/repos/bob/solo/contributors",
                respond(StatusCode::OK, json!([user_json(7, "bob")])),
            ),
    )
    .await;

    let state = load(&base_url, "bob", "solo").await;

    assert!(state.user_error.is_none());
    let repository_error = state.repository_error.unwrap();
    assert_eq!(repository_error.kind, ErrorKind::InvalidDataLength);
    assert_eq!(
        repository_error.user_message(),
        "Repository \"solo\" has no potential reviewers."
    );
}

#[tokio::test]
async fn test_successful_load_excludes_owner() {
    let base_url = serve(
        Router::new()
            .route("/users/carol", respond(StatusCode::OK, user_json(1, "carol")))
            .route(
                "/repos/carol/team/contributors",
                respond(
                    StatusCode::OK,
                    json!([user_json(1, "carol"), user_json(2, "dave"), user_json(3, "erin")]),
                ),
            ),
    )
    .await;

    let state = load(&base_url, "carol", "team").await;

    assert_eq!(state.phase(), SettingsPhase::Success);
    assert_eq!(state.user_login(), "carol");
    assert_eq!(state.repository_name(), "team");
    assert_eq!(state.blacklist.iter().copied().collect::<Vec<_>>(), vec![1]);
    let reviewers: Vec<_> = state.reviewers().iter().map(|u| u.login.clone()).collect();
    assert_eq!(reviewers, vec!["dave", "erin"]);
    assert!(state.blacklisted().is_empty());
}

#[tokio::test]
async fn test_failure_keeps_previous_settings() {
    let base_url = serve(
        Router::new()
            .route("/users/carol", respond(StatusCode::OK, user_json(1, "carol")))
            .route(
                "/repos/carol/team/contributors",
                respond(StatusCode::OK, json!([user_json(1, "carol"), user_json(2, "dave")])),
            )
            .route(
                "/users/ghost",
                respond(StatusCode::NOT_FOUND, json!({ "message": "Not Found" })),
            )
            .route(
                "/repos/ghost/none/contributors",
                respond(StatusCode::NOT_FOUND, json!({ "message": "Not Found" })),
            ),
    )
    .await;

    let pipeline = pipeline(&base_url);
    let mut store = SettingsStore::new(MemoryStore::new());
    let _ = pipeline.fetch_settings(&mut store, "carol", "team").await;
    let phase = pipeline.fetch_settings(&mut store, "ghost", "none").await;

    assert_eq!(phase, SettingsPhase::Failure);
    let state = store.state();
    assert_eq!(state.user_login(), "carol");
    assert_eq!(state.reviewers().len(), 1);
    assert_eq!(
        state.repository_error.as_ref().unwrap().message,
        "Repository \"none\" not found."
    );
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let state = load(&format!("http://{}", addr), "alice", "repo").await;

    assert_eq!(state.user_error.unwrap().kind, ErrorKind::NetworkError);
    assert_eq!(
        state.repository_error.unwrap().kind,
        ErrorKind::NetworkError
    );
}

#[tokio::test]
async fn test_unparseable_body_is_syntax_error() {
    let base_url = serve(
        Router::new()
            .route("/users/alice", respond_raw(StatusCode::OK, "<html>rate limited</html>"))
            .route(
                "/repos/alice/repo/contributors",
                respond(StatusCode::OK, json!([user_json(1, "alice"), user_json(2, "bob")])),
            ),
    )
    .await;

    let state = load(&base_url, "alice", "repo").await;

    let user_error = state.user_error.unwrap();
    assert_eq!(user_error.kind, ErrorKind::SyntaxError);
    assert_eq!(user_error.user_message(), "Something went wrong.");
    assert!(state.repository_error.is_none());
}

#[tokio::test]
async fn test_status_codes_are_classified() {
    let base_url = serve(
        Router::new()
            .route(
                "/users/alice",
                respond(StatusCode::BAD_REQUEST, json!({ "message": "Bad" })),
            )
            .route(
                "/repos/alice/repo/contributors",
                respond_raw(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            ),
    )
    .await;

    let state = load(&base_url, "alice", "repo").await;

    assert_eq!(state.user_error.unwrap().kind, ErrorKind::BadRequestError);
    let repository_error = state.repository_error.unwrap();
    assert_eq!(repository_error.kind, ErrorKind::UnexpectedError);
    assert_eq!(repository_error.code(), 5000);
}

#[tokio::test]
async fn test_wrong_shape_is_invalid_response() {
    let base_url = serve(
        Router::new()
            .route("/users/alice", respond(StatusCode::OK, json!([user_json(1, "alice")])))
            .route(
                "/repos/alice/repo/contributors",
                respond(StatusCode::OK, json!([{ "id": "two", "login": "bob" }])),
            ),
    )
    .await;

    let state = load(&base_url, "alice", "repo").await;

    assert_eq!(
        state.user_error.unwrap().kind,
        ErrorKind::InvalidResponseError
    );
    assert_eq!(
        state.repository_error.unwrap().kind,
        ErrorKind::InvalidResponseError
    );
}

#[tokio::test]
async fn test_lookups_run_concurrently() {
    // Each handler waits for the other request to arrive.
    let barrier = Arc::new(Barrier::new(2));
    let user_barrier = Arc::clone(&barrier);
    let repo_barrier = Arc::clone(&barrier);

    let base_url = serve(
        Router::new()
            .route(
                "/users/carol",
                get(move || {
                    let barrier = Arc::clone(&user_barrier);
                    async move {
                        let _ = barrier.wait().await;
                        Json(user_json(1, "carol"))
                    }
                }),
            )
            .route(
                "/repos/carol/team/contributors",
                get(move || {
                    let barrier = Arc::clone(&repo_barrier);
                    async move {
                        let _ = barrier.wait().await;
                        Json(json!([user_json(1, "carol"), user_json(2, "dave")]))
                    }
                }),
            ),
    )
    .await;

    let state = tokio::time::timeout(Duration::from_secs(10), load(&base_url, "carol", "team"))
        .await
        .expect("lookups were not issued concurrently");

    assert_eq!(state.phase(), SettingsPhase::Success);
}
