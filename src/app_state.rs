//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;

use crate::{Error, db::initialize};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection shared across request handlers.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys used for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `jwt_secret` is the secret used to sign and verify bearer tokens.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, jwt_secret: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            jwt_keys: JwtKeys::new(jwt_secret),
        })
    }
}

/// The key pair for signing and verifying JWT bearer tokens.
#[derive(Clone)]
pub struct JwtKeys {
    /// The key used to sign new tokens.
    pub encoding: EncodingKey,
    /// The key used to verify tokens on incoming requests.
    pub decoding: DecodingKey,
}

impl JwtKeys {
    /// Create a signing and verifying key pair from a `secret` string.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

// this impl lets the claims extractor fetch the keys from the app state
impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_keys.clone()
    }
}
