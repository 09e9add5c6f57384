use tracing::warn;
use uuid::Uuid;

use skillswap_db::models::NotificationRow;
use skillswap_db::now_timestamp;
use skillswap_types::api::ActionOutcome;
use skillswap_types::models::{Notification, NotificationKind, UserSnapshot};

use crate::error::{Done, EngineError, or_empty, parse_id, settle};
use crate::{Actor, Engine};

/// How many notifications a user sees at once.
const NOTIFICATION_PAGE_SIZE: u32 = 50;

/// A notification about to be written.
pub(crate) struct Notice<'a> {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub swap_request_id: Uuid,
    pub from: &'a UserSnapshot,
}

impl Engine {
    /// Best-effort: a failed insert is logged and never fails the action
    /// that produced it.
    pub(crate) fn notify(&self, notice: Notice<'_>) {
        let row = NotificationRow {
            id: Uuid::new_v4().to_string(),
            user_id: notice.user_id.to_string(),
            kind: notice.kind.as_str().to_string(),
            title: notice.title,
            message: notice.message,
            swap_request_id: Some(notice.swap_request_id.to_string()),
            from_user_id: Some(notice.from.id.to_string()),
            from_user_name: Some(notice.from.name.clone()),
            from_user_avatar: Some(notice.from.avatar.clone()),
            is_read: false,
            created_at: now_timestamp(),
        };

        if let Err(e) = self.db.insert_notification(&row) {
            warn!(
                "Dropped {} notification for user {}: {:#}",
                row.kind, row.user_id, e
            );
        }
    }

    /// The user's newest notifications.
    pub fn get_notifications(&self, user_id: &str) -> Vec<Notification> {
        let Ok(id) = parse_id(user_id, "Invalid user ID format.") else {
            return Vec::new();
        };
        or_empty(
            "load notifications",
            self.db.list_notifications(&id.to_string(), NOTIFICATION_PAGE_SIZE),
        )
        .into_iter()
        .map(Notification::from)
        .collect()
    }

    pub fn unread_notification_count(&self, user_id: &str) -> u64 {
        let Ok(id) = parse_id(user_id, "Invalid user ID format.") else {
            return 0;
        };
        or_empty("count notifications", self.db.count_unread_notifications(&id.to_string()))
    }

    pub fn mark_notification_as_read(&self, actor: &Actor, notification_id: &str) -> ActionOutcome {
        settle(
            "mark notification as read",
            "Failed to mark notification as read.",
            self.try_mark_notification_as_read(actor, notification_id),
        )
    }

    fn try_mark_notification_as_read(&self, actor: &Actor, notification_id: &str) -> Result<Done, EngineError> {
        let id = parse_id(notification_id, "Invalid notification ID.")?.to_string();

        let notification = self
            .db
            .get_notification(&id)?
            .ok_or_else(|| EngineError::not_found("Notification not found."))?;

        if notification.user_id != actor.key() {
            return Err(EngineError::forbidden("You can only update your own notifications."));
        }

        self.db.mark_notification_read(&id)?;
        Ok(Done::message("Notification marked as read."))
    }

    pub fn mark_all_notifications_read(&self, actor: &Actor) -> ActionOutcome {
        let result = self
            .db
            .mark_all_notifications_read(&actor.key())
            .map(|n| Done::message(format!("{n} notifications marked as read.")))
            .map_err(EngineError::from);
        settle(
            "mark all notifications as read",
            "Failed to mark notifications as read.",
            result,
        )
    }
}
