use tracing::info;
use uuid::Uuid;

use skillswap_db::models::{ChatRow, MessageRow};
use skillswap_db::now_timestamp;
use skillswap_types::api::ActionOutcome;
use skillswap_types::models::{ChatSummary, Message, SwapStatus, User};

use crate::error::{Done, EngineError, or_empty, parse_id, settle};
use crate::{Actor, Engine};

impl Engine {
    /// Opens the chat for an accepted swap request. Idempotent: a second
    /// call reports the existing chat's id.
    pub fn create_chat_from_swap_request(&self, swap_request_id: &str) -> ActionOutcome {
        settle(
            "create chat",
            "Failed to create chat. Please try again.",
            self.try_create_chat_from_swap_request(swap_request_id),
        )
    }

    fn try_create_chat_from_swap_request(&self, swap_request_id: &str) -> Result<Done, EngineError> {
        let request_id = parse_id(swap_request_id, "Invalid swap request ID.")?.to_string();

        if let Some(existing) = self.db.get_chat_by_swap_request(&request_id)? {
            return Ok(Done::with_id("Chat already exists.", chat_id(&existing)?));
        }

        let request = self
            .db
            .get_swap_request(&request_id)?
            .ok_or_else(|| EngineError::not_found("Swap request not found."))?;

        if request.status != SwapStatus::Accepted.as_str() {
            return Err(EngineError::conflict("Can only create chat for accepted swap requests."));
        }

        let now = now_timestamp();
        let id = Uuid::new_v4();
        let row = ChatRow {
            id: id.to_string(),
            swap_request_id: request_id.clone(),
            user_a_id: request.from_user_id,
            user_a_name: request.from_user_name,
            user_a_avatar: request.from_user_avatar,
            user_b_id: request.to_user_id,
            user_b_name: request.to_user_name,
            user_b_avatar: request.to_user_avatar,
            last_message_content: None,
            last_message_sender: None,
            last_message_at: None,
            is_cleared: false,
            created_at: now.clone(),
            updated_at: now,
        };

        if !self.db.insert_chat(&row)? {
            // Lost the race on the unique swap request; report the winner.
            let existing = self
                .db
                .get_chat_by_swap_request(&request_id)?
                .ok_or_else(|| EngineError::Storage(anyhow::anyhow!("chat for {request_id} vanished after insert")))?;
            return Ok(Done::with_id("Chat already exists.", chat_id(&existing)?));
        }

        info!(chat_id = %id, swap_request_id = %request_id, "Chat opened");
        Ok(Done::with_id("Chat created successfully.", id))
    }

    pub fn send_message(&self, actor: &Actor, chat_id: &str, content: &str) -> ActionOutcome {
        settle(
            "send message",
            "Failed to send message. Please try again.",
            self.try_send_message(actor, chat_id, content),
        )
    }

    fn try_send_message(&self, actor: &Actor, chat_id: &str, content: &str) -> Result<Done, EngineError> {
        let chat_id = parse_id(chat_id, "Invalid chat ID.")?.to_string();

        let content = content.trim();
        if content.is_empty() {
            return Err(EngineError::invalid("Message cannot be empty."));
        }

        self.db
            .get_chat_for_participant(&chat_id, &actor.key())?
            .ok_or_else(|| EngineError::forbidden("You are not a participant in this chat."))?;

        let sender = self
            .db
            .get_user_by_id(&actor.key())?
            .map(User::from)
            .ok_or_else(|| EngineError::not_found("User not found."))?;

        let id = Uuid::new_v4();
        let now = now_timestamp();
        self.db.insert_message(&MessageRow {
            id: id.to_string(),
            chat_id: chat_id.clone(),
            sender_id: sender.id.to_string(),
            sender_name: sender.name.clone(),
            sender_avatar: sender.avatar,
            content: content.to_string(),
            created_at: now.clone(),
        })?;
        self.db.set_last_message(&chat_id, content, &sender.name, &now)?;

        Ok(Done::with_id("Message sent successfully.", id))
    }

    /// Messages of a chat, oldest first.
    pub fn get_messages(&self, chat_id: &str) -> Vec<Message> {
        let Ok(id) = parse_id(chat_id, "Invalid chat ID.") else {
            return Vec::new();
        };
        or_empty("load messages", self.db.list_messages(&id.to_string()))
            .into_iter()
            .map(Message::from)
            .collect()
    }

    /// The user's chats, most recently active first.
    pub fn get_chats(&self, user_id: &str) -> Vec<ChatSummary> {
        let Ok(id) = parse_id(user_id, "Invalid user ID format.") else {
            return Vec::new();
        };
        or_empty("load chats", self.db.list_chats_for_user(&id.to_string()))
            .into_iter()
            .map(ChatSummary::from)
            .collect()
    }

    /// A single chat, visible to its participants only.
    pub fn get_chat(&self, actor: &Actor, chat_id: &str) -> Option<ChatSummary> {
        let id = parse_id(chat_id, "Invalid chat ID.").ok()?;
        or_empty(
            "load chat",
            self.db.get_chat_for_participant(&id.to_string(), &actor.key()),
        )
        .map(ChatSummary::from)
    }

    /// Flags the chat and deletes every message in it, for both participants.
    pub fn clear_chat(&self, actor: &Actor, chat_id: &str) -> ActionOutcome {
        settle(
            "clear chat",
            "Failed to clear chat. Please try again.",
            self.try_clear_chat(actor, chat_id),
        )
    }

    fn try_clear_chat(&self, actor: &Actor, chat_id: &str) -> Result<Done, EngineError> {
        let chat_id = parse_id(chat_id, "Invalid chat ID.")?.to_string();
        self.db
            .get_chat_for_participant(&chat_id, &actor.key())?
            .ok_or_else(|| EngineError::forbidden("You are not a participant in this chat."))?;

        self.db.mark_chat_cleared(&chat_id, &now_timestamp())?;
        let removed = self.db.delete_messages_for_chat(&chat_id)?;
        info!(%chat_id, removed, by = %actor.user_id, "Chat cleared");
        Ok(Done::message("Chat cleared successfully."))
    }

    /// Flags the chat as finished. Messages are kept.
    pub fn mark_chat_as_cleared(&self, actor: &Actor, chat_id: &str) -> ActionOutcome {
        settle(
            "mark chat as cleared",
            "Failed to mark chat as cleared. Please try again.",
            self.try_mark_chat_as_cleared(actor, chat_id),
        )
    }

    fn try_mark_chat_as_cleared(&self, actor: &Actor, chat_id: &str) -> Result<Done, EngineError> {
        let chat_id = parse_id(chat_id, "Invalid chat ID.")?.to_string();
        self.db
            .get_chat_for_participant(&chat_id, &actor.key())?
            .ok_or_else(|| EngineError::forbidden("You are not a participant in this chat."))?;

        self.db.mark_chat_cleared(&chat_id, &now_timestamp())?;
        Ok(Done::message("Chat marked as cleared."))
    }
}

fn chat_id(row: &ChatRow) -> Result<Uuid, EngineError> {
    row.id
        .parse()
        .map_err(|e| EngineError::Storage(anyhow::anyhow!("corrupt chat id '{}': {}", row.id, e)))
}
