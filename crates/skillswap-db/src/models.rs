//! Database row types. These map directly to SQLite rows and keep ids and
//! timestamps as stored text; `From` impls lift them into the typed models.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use skillswap_types::models::{
    Chat, ChatSummary, Feedback, LastMessage, Message, Notification, NotificationKind,
    SkillPair, SwapRequest, SwapStatus, User, UserSnapshot,
};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
    pub location: String,
    pub is_public: bool,
    pub is_admin: bool,
    /// JSON array text
    pub skills_offered: String,
    /// JSON array text
    pub skills_wanted: String,
    pub availability: String,
    pub rating: f64,
    pub reviews: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct SwapRequestRow {
    pub id: String,
    pub from_user_id: String,
    pub from_user_name: String,
    pub from_user_avatar: String,
    pub to_user_id: String,
    pub to_user_name: String,
    pub to_user_avatar: String,
    pub offered_skill: String,
    pub wanted_skill: String,
    pub status: String,
    pub message: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ChatRow {
    pub id: String,
    pub swap_request_id: String,
    pub user_a_id: String,
    pub user_a_name: String,
    pub user_a_avatar: String,
    pub user_b_id: String,
    pub user_b_name: String,
    pub user_b_avatar: String,
    pub last_message_content: Option<String>,
    pub last_message_sender: Option<String>,
    pub last_message_at: Option<String>,
    pub is_cleared: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Chat joined with the skills of its swap request (absent if the request
/// row is missing).
#[derive(Debug, Clone)]
pub struct ChatListRow {
    pub chat: ChatRow,
    pub offered_skill: Option<String>,
    pub wanted_skill: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_avatar: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub swap_request_id: Option<String>,
    pub from_user_id: Option<String>,
    pub from_user_name: Option<String>,
    pub from_user_avatar: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct FeedbackRow {
    pub id: String,
    pub swap_request_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub from_user_name: String,
    pub to_user_name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

pub(crate) fn parse_id(raw: &str, what: &str, row_id: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", what, raw, row_id, e);
        Uuid::default()
    })
}

pub(crate) fn parse_timestamp(raw: &str, row_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') form has no timezone; treat it as UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on row '{}': {}", raw, row_id, e);
            DateTime::default()
        })
}

pub(crate) fn parse_skills(raw: &str, row_id: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Corrupt skill list on user '{}': {}", row_id, e);
        Vec::new()
    })
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: parse_id(&row.id, "id", &row.id),
            skills_offered: parse_skills(&row.skills_offered, &row.id),
            skills_wanted: parse_skills(&row.skills_wanted, &row.id),
            created_at: parse_timestamp(&row.created_at, &row.id),
            reviews: u32::try_from(row.reviews).unwrap_or_default(),
            name: row.name,
            email: row.email,
            avatar: row.avatar,
            bio: row.bio,
            location: row.location,
            is_public: row.is_public,
            is_admin: row.is_admin,
            availability: row.availability,
            rating: row.rating,
        }
    }
}

impl From<SwapRequestRow> for SwapRequest {
    fn from(row: SwapRequestRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            // Unknown states are treated as terminal so no action can move them.
            warn!("Corrupt status on swap request '{}': {}", row.id, e);
            SwapStatus::Cancelled
        });

        SwapRequest {
            id: parse_id(&row.id, "id", &row.id),
            from_user: UserSnapshot {
                id: parse_id(&row.from_user_id, "from_user_id", &row.id),
                name: row.from_user_name,
                avatar: row.from_user_avatar,
            },
            to_user: UserSnapshot {
                id: parse_id(&row.to_user_id, "to_user_id", &row.id),
                name: row.to_user_name,
                avatar: row.to_user_avatar,
            },
            offered_skill: row.offered_skill,
            wanted_skill: row.wanted_skill,
            status,
            created_at: parse_timestamp(&row.created_at, &row.id),
            message: row.message,
        }
    }
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        let last_message = match (row.last_message_content, row.last_message_sender) {
            (Some(content), Some(sender_name)) => Some(LastMessage {
                content,
                sender_name,
                created_at: row
                    .last_message_at
                    .as_deref()
                    .map(|at| parse_timestamp(at, &row.id))
                    .unwrap_or_default(),
            }),
            _ => None,
        };

        Chat {
            id: parse_id(&row.id, "id", &row.id),
            participants: vec![
                UserSnapshot {
                    id: parse_id(&row.user_a_id, "user_a_id", &row.id),
                    name: row.user_a_name,
                    avatar: row.user_a_avatar,
                },
                UserSnapshot {
                    id: parse_id(&row.user_b_id, "user_b_id", &row.id),
                    name: row.user_b_name,
                    avatar: row.user_b_avatar,
                },
            ],
            swap_request_id: parse_id(&row.swap_request_id, "swap_request_id", &row.id),
            last_message,
            is_cleared: row.is_cleared,
            created_at: parse_timestamp(&row.created_at, &row.id),
            updated_at: parse_timestamp(&row.updated_at, &row.id),
        }
    }
}

impl From<ChatListRow> for ChatSummary {
    fn from(row: ChatListRow) -> Self {
        ChatSummary {
            chat: row.chat.into(),
            swap_request: SkillPair {
                offered_skill: row.offered_skill.unwrap_or_default(),
                wanted_skill: row.wanted_skill.unwrap_or_default(),
            },
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: parse_id(&row.id, "id", &row.id),
            chat_id: parse_id(&row.chat_id, "chat_id", &row.id),
            sender_id: parse_id(&row.sender_id, "sender_id", &row.id),
            created_at: parse_timestamp(&row.created_at, &row.id),
            sender_name: row.sender_name,
            sender_avatar: row.sender_avatar,
            content: row.content,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        let kind = NotificationKind::parse(&row.kind).unwrap_or_else(|| {
            warn!("Corrupt kind '{}' on notification '{}'", row.kind, row.id);
            NotificationKind::SwapRequest
        });

        let from_user = row.from_user_id.as_deref().map(|from_id| UserSnapshot {
            id: parse_id(from_id, "from_user_id", &row.id),
            name: row.from_user_name.clone().unwrap_or_default(),
            avatar: row.from_user_avatar.clone().unwrap_or_default(),
        });

        Notification {
            id: parse_id(&row.id, "id", &row.id),
            user_id: parse_id(&row.user_id, "user_id", &row.id),
            kind,
            swap_request_id: row
                .swap_request_id
                .as_deref()
                .map(|sid| parse_id(sid, "swap_request_id", &row.id)),
            from_user,
            is_read: row.is_read,
            created_at: parse_timestamp(&row.created_at, &row.id),
            title: row.title,
            message: row.message,
        }
    }
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: parse_id(&row.id, "id", &row.id),
            swap_request_id: parse_id(&row.swap_request_id, "swap_request_id", &row.id),
            from_user_id: parse_id(&row.from_user_id, "from_user_id", &row.id),
            to_user_id: parse_id(&row.to_user_id, "to_user_id", &row.id),
            rating: row.rating.clamp(1, 5) as u8,
            created_at: parse_timestamp(&row.created_at, &row.id),
            from_user_name: row.from_user_name,
            to_user_name: row.to_user_name,
            comment: row.comment,
        }
    }
}
