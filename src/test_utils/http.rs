use axum::{body::Body, http::StatusCode, response::Response};
use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use rusqlite::Connection;

use crate::{AppState, auth::COOKIE_TOKEN, build_router, endpoints};

/// A test server for the full API backed by an in-memory database.
#[track_caller]
pub(crate) fn get_test_server() -> TestServer {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let state = AppState::new(connection, "42", "Etc/UTC").expect("Could not create app state");

    TestServer::try_new(build_router(state)).expect("Could not create test server")
}

/// Register `email` through the API and return the auth cookie so later
/// requests can be authenticated as that user.
pub(crate) async fn log_in_test_user(server: &TestServer, email: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::USERS)
        .json(&json!({
            "email": email,
            "password": "averysafeandsecurepassword",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.cookie(COOKIE_TOKEN)
}

/// Assert a JSON error response with `status` and a non-empty message.
#[track_caller]
pub(crate) fn assert_error_status(response: &TestResponse, status: StatusCode) {
    response.assert_status(status);
    let body: Value = response.json();
    let message = body["error"].as_str().expect("error body missing message");
    assert!(!message.is_empty(), "error message should not be empty");
}

/// Read and deserialize the JSON body of a handler response.
pub(crate) async fn parse_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Could not parse response body as JSON")
}
