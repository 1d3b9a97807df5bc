//! Defines the notification model, its database table and queries.
//!
//! Notifications are written only through this query layer; the HTTP surface
//! reads, marks and deletes them.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, user::UserID};

/// The id of a notification row.
pub type NotificationId = i64;

/// The severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Something needs the user's attention.
    Warning,
    /// Purely informational.
    Info,
    /// Something completed well.
    Success,
}

impl NotificationKind {
    /// The text stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
        }
    }

    /// Parse the text stored in the database.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "warning" => Some(NotificationKind::Warning),
            "info" => Some(NotificationKind::Info),
            "success" => Some(NotificationKind::Success),
            _ => None,
        }
    }
}

/// A message for the user, unread until marked otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// The ID of the notification.
    pub id: NotificationId,
    /// The ID of the user the notification is for.
    pub user_id: UserID,
    /// The severity of the notification.
    pub kind: NotificationKind,
    /// The message shown to the user.
    pub message: String,
    /// Whether the user has marked the notification as read.
    pub read: bool,
    /// When the notification was created.
    pub created_at: OffsetDateTime,
}

/// Create the notification table.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_notification_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS notification (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                message TEXT NOT NULL,
                read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create an unread notification for `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_notification(
    user_id: UserID,
    kind: NotificationKind,
    message: &str,
    connection: &Connection,
) -> Result<Notification, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO notification (user_id, kind, message, read, created_at)
         VALUES (?1, ?2, ?3, 0, ?4)",
        (user_id.as_i64(), kind.as_str(), message, created_at),
    )?;

    Ok(Notification {
        id: connection.last_insert_rowid(),
        user_id,
        kind,
        message: message.to_owned(),
        read: false,
        created_at,
    })
}

/// Retrieve the caller's unread notifications, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_unread_notifications(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Notification>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, message, read, created_at
             FROM notification
             WHERE user_id = :user_id AND read = 0
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_notification_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Mark a notification as read.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingNotification] if `id` does not refer to a
///   notification owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn mark_notification_read(
    id: NotificationId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Notification, Error> {
    let rows_affected = connection.execute(
        "UPDATE notification SET read = 1 WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingNotification);
    }

    connection
        .prepare(
            "SELECT id, user_id, kind, message, read, created_at
             FROM notification
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_notification_row,
        )
        .map_err(|error| error.into())
}

/// Delete a notification.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingNotification] if `id` does not refer to a
///   notification owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_notification(
    id: NotificationId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM notification WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingNotification);
    }

    Ok(())
}

fn map_notification_row(row: &Row) -> Result<Notification, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let raw_kind: String = row.get(2)?;
    let kind = NotificationKind::parse(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown notification kind: {raw_kind}").into(),
        )
    })?;
    let message = row.get(3)?;
    let read = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Notification {
        id,
        user_id,
        kind,
        message,
        read,
        created_at,
    })
}
