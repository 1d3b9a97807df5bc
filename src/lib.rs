//! FinTrack is a personal finance tracker: accounts, categories, transactions,
//! budgets, and on-demand reports behind a JSON REST API.
//!
//! This library provides the API router, the SQLite storage layer, and the
//! domain logic; the `server` binary wires them together and serves HTTP.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod budget;
mod category;
mod db;
mod endpoints;
mod logging;
mod money;
mod notification;
mod password;
mod report;
mod routing;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, JwtKeys};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Cents;
pub use password::{MIN_PASSWORD_LENGTH, PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserID, UserProfile};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a bearer token.
    #[error("authentication token is missing")]
    MissingToken,

    /// The bearer token could not be decoded or has expired.
    #[error("authentication token is invalid or expired")]
    InvalidToken,

    /// An unexpected error occurred while signing a bearer token.
    ///
    /// The cause should only be logged on the server. The client receives a
    /// general internal server error.
    #[error("could not create authentication token")]
    TokenCreation,

    /// The string used to register was not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The password used to register was shorter than the minimum length.
    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    /// The email used to register already belongs to a user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An empty string was used for a name field.
    #[error("name cannot be empty")]
    EmptyName,

    /// A monetary amount was not a finite, in-range number of the required sign.
    #[error("{0} is not a valid monetary amount")]
    InvalidAmount(f64),

    /// A date range ended before it started.
    #[error("end date must not be before start date")]
    InvalidDateRange,

    /// A calendar month outside 1-12 was requested.
    #[error("{0} is not a valid calendar month")]
    InvalidMonth(u8),

    /// A year outside the supported calendar range was requested.
    #[error("{0} is not a valid calendar year")]
    InvalidYear(i32),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete an account that still has transactions referencing it.
    #[error("cannot delete an account that still has transactions")]
    AccountInUse,

    /// Tried to delete a category that transactions still reference.
    #[error("cannot delete a category that is still used by transactions")]
    CategoryInUse,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a subcategory that does not exist
    #[error("tried to delete a subcategory that is not in the database")]
    DeleteMissingSubcategory,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to mark a notification that does not exist as read
    #[error("tried to update a notification that is not in the database")]
    UpdateMissingNotification,

    /// Tried to delete a notification that does not exist
    #[error("tried to delete a notification that is not in the database")]
    DeleteMissingNotification,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidCredentials | Error::MissingToken => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::FORBIDDEN,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::NotFound
            | Error::UpdateMissingAccount
            | Error::DeleteMissingAccount
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::DeleteMissingSubcategory
            | Error::UpdateMissingBudget
            | Error::DeleteMissingBudget
            | Error::UpdateMissingNotification
            | Error::DeleteMissingNotification => StatusCode::NOT_FOUND,
            Error::InvalidEmail(_)
            | Error::PasswordTooShort
            | Error::EmptyName
            | Error::InvalidAmount(_)
            | Error::InvalidDateRange
            | Error::InvalidMonth(_)
            | Error::InvalidYear(_)
            | Error::AccountInUse
            | Error::CategoryInUse => StatusCode::BAD_REQUEST,
            Error::TokenCreation
            | Error::DatabaseLockError
            | Error::HashingError(_)
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal errors are not intended to be shown to the client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
