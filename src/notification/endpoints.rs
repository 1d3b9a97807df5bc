//! Defines the JSON endpoints for reading, marking and deleting
//! notifications.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    AppState, Error,
    auth::Claims,
    notification::core::{
        Notification, NotificationId, delete_notification, get_unread_notifications,
        mark_notification_read,
    },
};

/// A route handler for listing the caller's unread notifications, newest
/// first.
pub async fn get_notifications_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Notification>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_unread_notifications(claims.user_id, &connection).map(Json)
}

/// A route handler for marking a notification as read.
pub async fn mark_notification_read_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(notification_id): Path<NotificationId>,
) -> Result<Json<Notification>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    mark_notification_read(notification_id, claims.user_id, &connection).map(Json)
}

/// A route handler for deleting a notification.
pub async fn delete_notification_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(notification_id): Path<NotificationId>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_notification(notification_id, claims.user_id, &connection)?;

    Ok(Json(json!({ "message": "Notification deleted successfully" })))
}
