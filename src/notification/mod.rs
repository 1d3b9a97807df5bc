//! Notifications: messages for the user, read and managed over the API but
//! only ever written through the query layer.

mod core;
mod endpoints;

pub use core::{
    Notification, NotificationId, NotificationKind, create_notification,
    create_notification_table, delete_notification, get_unread_notifications,
    mark_notification_read,
};
pub use endpoints::{
    delete_notification_endpoint, get_notifications_endpoint, mark_notification_read_endpoint,
};
