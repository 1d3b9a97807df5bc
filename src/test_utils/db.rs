use std::str::FromStr;

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    PasswordHash,
    user::{UserID, create_user},
};

/// Insert a user row directly and return its ID, for query-level tests that
/// do not go through the HTTP surface.
pub(crate) fn create_test_user(connection: &Connection) -> UserID {
    create_test_user_with_email(connection, "test@test.com")
}

pub(crate) fn create_test_user_with_email(connection: &Connection, email: &str) -> UserID {
    create_user(
        EmailAddress::from_str(email).expect("invalid test email"),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("could not create test user")
    .id
}
