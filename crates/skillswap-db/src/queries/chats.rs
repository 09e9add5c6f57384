use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

use crate::Database;
use crate::models::{ChatListRow, ChatRow, MessageRow};

/// Chat columns joined with the originating request's skills.
const CHAT_SELECT: &str = "SELECT c.id, c.swap_request_id,
            c.user_a_id, c.user_a_name, c.user_a_avatar,
            c.user_b_id, c.user_b_name, c.user_b_avatar,
            c.last_message_content, c.last_message_sender, c.last_message_at,
            c.is_cleared, c.created_at, c.updated_at,
            s.offered_skill, s.wanted_skill
     FROM chats c
     LEFT JOIN swap_requests s ON s.id = c.swap_request_id";

impl Database {
    // -- Chats --

    /// Inserts unless a chat already exists for the same swap request.
    /// Returns true if this call created the row.
    pub fn insert_chat(&self, chat: &ChatRow) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO chats (id, swap_request_id,
                                              user_a_id, user_a_name, user_a_avatar,
                                              user_b_id, user_b_name, user_b_avatar,
                                              is_cleared, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    chat.id,
                    chat.swap_request_id,
                    chat.user_a_id,
                    chat.user_a_name,
                    chat.user_a_avatar,
                    chat.user_b_id,
                    chat.user_b_name,
                    chat.user_b_avatar,
                    chat.is_cleared,
                    chat.created_at,
                    chat.updated_at,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn get_chat_by_swap_request(&self, swap_request_id: &str) -> Result<Option<ChatRow>> {
        self.with_conn(|conn| {
            let sql = format!("{CHAT_SELECT} WHERE c.swap_request_id = ?1");
            let row = conn.query_row(&sql, [swap_request_id], map_chat_list).optional()?;
            Ok(row.map(|r| r.chat))
        })
    }

    /// The chat, only if `user_id` is one of its two participants.
    pub fn get_chat_for_participant(&self, chat_id: &str, user_id: &str) -> Result<Option<ChatListRow>> {
        self.with_conn(|conn| {
            let sql = format!("{CHAT_SELECT} WHERE c.id = ?1 AND (c.user_a_id = ?2 OR c.user_b_id = ?2)");
            let row = conn.query_row(&sql, [chat_id, user_id], map_chat_list).optional()?;
            Ok(row)
        })
    }

    /// Chats the user takes part in, most recently updated first.
    pub fn list_chats_for_user(&self, user_id: &str) -> Result<Vec<ChatListRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{CHAT_SELECT} WHERE c.user_a_id = ?1 OR c.user_b_id = ?1
                 ORDER BY c.updated_at DESC, c.rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_chat_list)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_last_message(&self, chat_id: &str, content: &str, sender_name: &str, at: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE chats SET last_message_content = ?2, last_message_sender = ?3,
                                  last_message_at = ?4, updated_at = ?4
                 WHERE id = ?1",
                params![chat_id, content, sender_name, at],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn mark_chat_cleared(&self, chat_id: &str, at: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE chats SET is_cleared = 1, updated_at = ?2 WHERE id = ?1",
                params![chat_id, at],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, message: &MessageRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, chat_id, sender_id, sender_name, sender_avatar, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    message.id,
                    message.chat_id,
                    message.sender_id,
                    message.sender_name,
                    message.sender_avatar,
                    message.content,
                    message.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// All messages of a chat, oldest first.
    pub fn list_messages(&self, chat_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, sender_id, sender_name, sender_avatar, content, created_at
                 FROM messages
                 WHERE chat_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt
                .query_map([chat_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        chat_id: row.get(1)?,
                        sender_id: row.get(2)?,
                        sender_name: row.get(3)?,
                        sender_avatar: row.get(4)?,
                        content: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Hard-deletes every message of the chat. Returns the number removed.
    pub fn delete_messages_for_chat(&self, chat_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM messages WHERE chat_id = ?1", [chat_id])?;
            Ok(removed)
        })
    }
}

fn map_chat_list(row: &Row<'_>) -> rusqlite::Result<ChatListRow> {
    Ok(ChatListRow {
        chat: ChatRow {
            id: row.get(0)?,
            swap_request_id: row.get(1)?,
            user_a_id: row.get(2)?,
            user_a_name: row.get(3)?,
            user_a_avatar: row.get(4)?,
            user_b_id: row.get(5)?,
            user_b_name: row.get(6)?,
            user_b_avatar: row.get(7)?,
            last_message_content: row.get(8)?,
            last_message_sender: row.get(9)?,
            last_message_at: row.get(10)?,
            is_cleared: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        },
        offered_skill: row.get(14)?,
        wanted_skill: row.get(15)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::now_timestamp;
    use crate::queries::fixtures::{chat, swap, user};
    use uuid::Uuid;

    fn message(chat_id: &str, sender: &crate::models::UserRow, content: &str) -> MessageRow {
        MessageRow {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            sender_id: sender.id.clone(),
            sender_name: sender.name.clone(),
            sender_avatar: sender.avatar.clone(),
            content: content.to_string(),
            created_at: now_timestamp(),
        }
    }

    fn seeded() -> (Database, crate::models::UserRow, crate::models::UserRow, ChatRow) {
        let db = Database::open_in_memory().unwrap();
        let a = user("Alice", "alice@example.com");
        let b = user("Bob", "bob@example.com");
        db.create_user(&a).unwrap();
        db.create_user(&b).unwrap();
        let req = swap(&a, &b, "accepted");
        db.insert_swap_request(&req).unwrap();
        let c = chat(&req);
        assert!(db.insert_chat(&c).unwrap());
        (db, a, b, c)
    }

    #[test]
    fn one_chat_per_swap_request() {
        let (db, _a, _b, c) = seeded();

        let mut dup = c.clone();
        dup.id = Uuid::new_v4().to_string();
        assert!(!db.insert_chat(&dup).unwrap());

        let existing = db.get_chat_by_swap_request(&c.swap_request_id).unwrap().unwrap();
        assert_eq!(existing.id, c.id);
    }

    #[test]
    fn participant_lookup_excludes_outsiders() {
        let (db, a, b, c) = seeded();
        let outsider = Uuid::new_v4().to_string();

        assert!(db.get_chat_for_participant(&c.id, &a.id).unwrap().is_some());
        assert!(db.get_chat_for_participant(&c.id, &b.id).unwrap().is_some());
        assert!(db.get_chat_for_participant(&c.id, &outsider).unwrap().is_none());
    }

    #[test]
    fn chat_list_carries_request_skills() {
        let (db, a, _b, c) = seeded();

        let chats = db.list_chats_for_user(&a.id).unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].chat.id, c.id);
        assert_eq!(chats[0].offered_skill.as_deref(), Some("Guitar"));
        assert_eq!(chats[0].wanted_skill.as_deref(), Some("Python"));
    }

    #[test]
    fn messages_in_order_and_bulk_delete() {
        let (db, a, b, c) = seeded();

        let first = message(&c.id, &a, "hi");
        let second = message(&c.id, &b, "hello");
        db.insert_message(&first).unwrap();
        db.insert_message(&second).unwrap();
        assert!(db.set_last_message(&c.id, "hello", &b.name, &second.created_at).unwrap());

        let msgs = db.list_messages(&c.id).unwrap();
        assert_eq!(msgs.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(), vec!["hi", "hello"]);

        let chat = db.get_chat_for_participant(&c.id, &a.id).unwrap().unwrap().chat;
        assert_eq!(chat.last_message_content.as_deref(), Some("hello"));
        assert_eq!(chat.updated_at, second.created_at);

        assert_eq!(db.delete_messages_for_chat(&c.id).unwrap(), 2);
        assert!(db.list_messages(&c.id).unwrap().is_empty());
    }

    #[test]
    fn cleared_flag_persists() {
        let (db, _a, b, c) = seeded();
        assert!(db.mark_chat_cleared(&c.id, &now_timestamp()).unwrap());
        assert!(db.get_chat_for_participant(&c.id, &b.id).unwrap().unwrap().chat.is_cleared);
        assert!(!db.mark_chat_cleared("missing", &now_timestamp()).unwrap());
    }
}
