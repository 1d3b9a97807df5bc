//! Defines the endpoints for registering a new user and logging in.

use std::str::FromStr;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::token::encode_jwt,
    password::PasswordHash,
    user::{UserProfile, create_user, get_user_by_email},
};

/// The expected fields for a registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterData {
    /// The email address to register.
    pub email: String,
    /// The plain-text password for the new user.
    pub password: String,
}

/// The credentials for a log in request.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The email entered during log in.
    pub email: String,
    /// The password entered during log in.
    pub password: String,
}

/// The response body for a successful registration or log in.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// A signed bearer token for the session.
    pub token: String,
    /// The authenticated user.
    pub user: UserProfile,
}

/// A route handler for registering a new user.
///
/// Responds with 201 CREATED, a bearer token and the new user's profile.
///
/// # Errors
///
/// This function will return an error if:
/// - the email is not a valid email address,
/// - the password is shorter than [crate::MIN_PASSWORD_LENGTH](crate::MIN_PASSWORD_LENGTH) characters,
/// - or the email is already registered.
pub async fn register_endpoint(
    State(state): State<AppState>,
    Json(data): Json<RegisterData>,
) -> Result<impl IntoResponse, Error> {
    let email =
        EmailAddress::from_str(&data.email).map_err(|_| Error::InvalidEmail(data.email.clone()))?;
    let password_hash =
        PasswordHash::from_raw_password(&data.password, PasswordHash::DEFAULT_COST)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = create_user(email, password_hash, &connection)?;
    let token = encode_jwt(user.id, &state.jwt_keys.encoding)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserProfile::from(&user),
        }),
    ))
}

/// A route handler for logging in with an email and password.
///
/// Responds with a bearer token and the user's profile.
///
/// # Errors
///
/// This function will return a [Error::InvalidCredentials] if the email does not
/// belong to a registered user or the password is wrong. The two cases are not
/// distinguished so the response does not reveal which emails are registered.
pub async fn log_in_endpoint(
    State(state): State<AppState>,
    Json(credentials): Json<LogInData>,
) -> Result<Json<AuthResponse>, Error> {
    let email =
        EmailAddress::from_str(&credentials.email).map_err(|_| Error::InvalidCredentials)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = get_user_by_email(&email, &connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCredentials,
        error => error,
    })?;

    let password_is_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| {
            tracing::error!("could not verify password: {error}");
            Error::HashingError(error.to_string())
        })?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_jwt(user.id, &state.jwt_keys.encoding)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(&user),
    }))
}



#[cfg(test)]
mod protected_route_tests {
    use axum::{Json, Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use jsonwebtoken::{Header, encode};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::token::{Claims, encode_jwt},
        test_utils::new_test_app_state,
        user::UserID,
    };

    async fn protected_handler(claims: Claims) -> Json<UserID> {
        Json(claims.user_id)
    }

    fn new_protected_server() -> (TestServer, crate::AppState) {
        let state = new_test_app_state();
        let app = Router::new()
            .route("/protected", get(protected_handler))
            .with_state(state.clone());
        let server = TestServer::new(app);

        (server, state)
    }

    #[tokio::test]
    async fn request_with_valid_token_succeeds() {
        let (server, state) = new_protected_server();
        let token =
            encode_jwt(UserID::new(1), &state.jwt_keys.encoding).expect("could not encode token");

        let response = server.get("/protected").authorization_bearer(token).await;

        response.assert_status_ok();
        assert_eq!(response.json::<UserID>(), UserID::new(1));
    }

    #[tokio::test]
    async fn request_with_missing_header_is_unauthorized() {
        let (server, _) = new_protected_server();

        server
            .get("/protected")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn request_with_garbage_token_is_forbidden() {
        let (server, _) = new_protected_server();

        server
            .get("/protected")
            .authorization_bearer("not.a.token")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn request_with_expired_token_is_forbidden() {
        let (server, state) = new_protected_server();
        let two_hours_ago = OffsetDateTime::now_utc() - Duration::hours(2);
        let claims = Claims {
            exp: two_hours_ago.unix_timestamp() as usize,
            iat: (two_hours_ago - Duration::hours(24)).unix_timestamp() as usize,
            user_id: UserID::new(1),
        };
        let token = encode(&Header::default(), &claims, &state.jwt_keys.encoding)
            .expect("could not encode token");

        server
            .get("/protected")
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn request_with_token_from_another_secret_is_forbidden() {
        let (server, _) = new_protected_server();
        let other_keys = crate::JwtKeys::new("not the right secret");
        let token =
            encode_jwt(UserID::new(1), &other_keys.encoding).expect("could not encode token");

        server
            .get("/protected")
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
