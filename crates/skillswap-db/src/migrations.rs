use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                email           TEXT NOT NULL UNIQUE,
                avatar          TEXT NOT NULL DEFAULT '',
                bio             TEXT NOT NULL DEFAULT '',
                location        TEXT NOT NULL DEFAULT '',
                is_public       INTEGER NOT NULL DEFAULT 1,
                is_admin        INTEGER NOT NULL DEFAULT 0,
                skills_offered  TEXT NOT NULL DEFAULT '[]',
                skills_wanted   TEXT NOT NULL DEFAULT '[]',
                availability    TEXT NOT NULL DEFAULT '',
                rating          REAL NOT NULL DEFAULT 0,
                reviews         INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE swap_requests (
                id                TEXT PRIMARY KEY,
                from_user_id      TEXT NOT NULL REFERENCES users(id),
                from_user_name    TEXT NOT NULL,
                from_user_avatar  TEXT NOT NULL,
                to_user_id        TEXT NOT NULL REFERENCES users(id),
                to_user_name      TEXT NOT NULL,
                to_user_avatar    TEXT NOT NULL,
                offered_skill     TEXT NOT NULL,
                wanted_skill      TEXT NOT NULL,
                status            TEXT NOT NULL DEFAULT 'pending',
                message           TEXT,
                created_at        TEXT NOT NULL
            );

            CREATE INDEX idx_swap_requests_from ON swap_requests(from_user_id, status);
            CREATE INDEX idx_swap_requests_to ON swap_requests(to_user_id, status);

            -- Participant A is the requester, B the recipient.
            CREATE TABLE chats (
                id                   TEXT PRIMARY KEY,
                swap_request_id      TEXT NOT NULL UNIQUE REFERENCES swap_requests(id),
                user_a_id            TEXT NOT NULL,
                user_a_name          TEXT NOT NULL,
                user_a_avatar        TEXT NOT NULL,
                user_b_id            TEXT NOT NULL,
                user_b_name          TEXT NOT NULL,
                user_b_avatar        TEXT NOT NULL,
                last_message_content TEXT,
                last_message_sender  TEXT,
                last_message_at      TEXT,
                is_cleared           INTEGER NOT NULL DEFAULT 0,
                created_at           TEXT NOT NULL,
                updated_at           TEXT NOT NULL
            );

            CREATE INDEX idx_chats_user_a ON chats(user_a_id);
            CREATE INDEX idx_chats_user_b ON chats(user_b_id);

            CREATE TABLE messages (
                id             TEXT PRIMARY KEY,
                chat_id        TEXT NOT NULL REFERENCES chats(id),
                sender_id      TEXT NOT NULL,
                sender_name    TEXT NOT NULL,
                sender_avatar  TEXT NOT NULL,
                content        TEXT NOT NULL,
                created_at     TEXT NOT NULL
            );

            CREATE INDEX idx_messages_chat ON messages(chat_id, created_at);

            CREATE TABLE notifications (
                id                TEXT PRIMARY KEY,
                user_id           TEXT NOT NULL REFERENCES users(id),
                kind              TEXT NOT NULL,
                title             TEXT NOT NULL,
                message           TEXT NOT NULL,
                swap_request_id   TEXT,
                from_user_id      TEXT,
                from_user_name    TEXT,
                from_user_avatar  TEXT,
                is_read           INTEGER NOT NULL DEFAULT 0,
                created_at        TEXT NOT NULL
            );

            CREATE INDEX idx_notifications_user ON notifications(user_id, created_at);

            CREATE TABLE feedback (
                id               TEXT PRIMARY KEY,
                swap_request_id  TEXT NOT NULL REFERENCES swap_requests(id),
                from_user_id     TEXT NOT NULL REFERENCES users(id),
                to_user_id       TEXT NOT NULL REFERENCES users(id),
                from_user_name   TEXT NOT NULL,
                to_user_name     TEXT NOT NULL,
                rating           INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment          TEXT NOT NULL DEFAULT '',
                created_at       TEXT NOT NULL,
                UNIQUE(swap_request_id, from_user_id)
            );

            CREATE INDEX idx_feedback_to_user ON feedback(to_user_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
