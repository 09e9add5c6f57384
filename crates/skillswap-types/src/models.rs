use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display attributes of a user, copied into other records at write time.
/// Profile edits never rewrite existing snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
    pub location: String,
    pub is_public: bool,
    pub is_admin: bool,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability: String,
    /// Mean of received feedback ratings, one decimal place. 0 when unrated.
    pub rating: f64,
    pub reviews: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id,
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl SwapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// Lifecycle edges: pending -> accepted | rejected, accepted -> completed.
    pub fn can_transition_to(&self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Rejected)
                | (Self::Accepted, Self::Completed)
        )
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown swap status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for SwapStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub id: Uuid,
    pub from_user: UserSnapshot,
    pub to_user: UserSnapshot,
    pub offered_skill: String,
    pub wanted_skill: String,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SwapRequest {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.from_user.id == user_id || self.to_user.id == user_id
    }

    /// The participant on the other side of the swap from `user_id`.
    pub fn counterpart_of(&self, user_id: Uuid) -> Option<&UserSnapshot> {
        if self.from_user.id == user_id {
            Some(&self.to_user)
        } else if self.to_user.id == user_id {
            Some(&self.from_user)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastMessage {
    pub content: String,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
}

/// A two-party thread opened when a swap request is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub participants: Vec<UserSnapshot>,
    pub swap_request_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<LastMessage>,
    pub is_cleared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read-only projection of the swap request a chat was opened for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillPair {
    pub offered_skill: String,
    pub wanted_skill: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(flatten)]
    pub chat: Chat,
    pub swap_request: SkillPair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_avatar: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SwapRequest,
    SwapResponse,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwapRequest => "swap_request",
            Self::SwapResponse => "swap_response",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "swap_request" => Some(Self::SwapRequest),
            "swap_response" => Some(Self::SwapResponse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_request_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_user: Option<UserSnapshot>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub swap_request_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub from_user_name: String,
    pub to_user_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub admin_users: u64,
    pub total_requests: u64,
    pub pending_requests: u64,
}
