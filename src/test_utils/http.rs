use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{AppState, auth::AuthResponse, endpoints, routing::build_router, user::UserProfile};

/// The password used for users registered by the test helpers.
pub(crate) const TEST_PASSWORD: &str = "averysecurepassword";

pub(crate) fn new_test_app_state() -> AppState {
    let connection = Connection::open_in_memory().expect("could not open database in memory");

    AppState::new(connection, "42").expect("could not create app state")
}

pub(crate) fn new_test_server() -> TestServer {
    let app = build_router(new_test_app_state());

    TestServer::new(app)
}

pub(crate) async fn create_app_with_user() -> (TestServer, UserProfile, String) {
    let server = new_test_server();

    let (user, token) = register_user_with_email(&server, "test@test.com").await;

    (server, user, token)
}

/// Like [create_app_with_user] but also returns the app state so tests can
/// seed the database directly.
pub(crate) async fn create_app_with_state_and_user() -> (TestServer, AppState, UserProfile, String)
{
    let state = new_test_app_state();
    let app = build_router(state.clone());
    let server = TestServer::new(app);

    let (user, token) = register_user_with_email(&server, "test@test.com").await;

    (server, state, user, token)
}

/// Register a new user through the API and return their profile and a bearer token.
pub(crate) async fn register_user_with_email(
    server: &TestServer,
    email: &str,
) -> (UserProfile, String) {
    let response = server
        .post(endpoints::REGISTER)
        .content_type("application/json")
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let auth_response = response.json::<AuthResponse>();

    (auth_response.user, auth_response.token)
}
