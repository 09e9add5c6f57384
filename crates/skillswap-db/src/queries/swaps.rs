use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

use crate::Database;
use crate::models::SwapRequestRow;

const SWAP_COLUMNS: &str = "id, from_user_id, from_user_name, from_user_avatar, \
     to_user_id, to_user_name, to_user_avatar, offered_skill, wanted_skill, status, message, created_at";

impl Database {
    pub fn insert_swap_request(&self, request: &SwapRequestRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO swap_requests (id, from_user_id, from_user_name, from_user_avatar,
                                            to_user_id, to_user_name, to_user_avatar,
                                            offered_skill, wanted_skill, status, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    request.id,
                    request.from_user_id,
                    request.from_user_name,
                    request.from_user_avatar,
                    request.to_user_id,
                    request.to_user_name,
                    request.to_user_avatar,
                    request.offered_skill,
                    request.wanted_skill,
                    request.status,
                    request.message,
                    request.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_swap_request(&self, id: &str) -> Result<Option<SwapRequestRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {SWAP_COLUMNS} FROM swap_requests WHERE id = ?1");
            let row = conn.query_row(&sql, [id], map_swap).optional()?;
            Ok(row)
        })
    }

    /// Whether `from_user_id` already has a pending request to `to_user_id`.
    /// Direction matters: a pending request the other way does not count.
    pub fn has_pending_swap_request(&self, from_user_id: &str, to_user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<String> = conn
                .query_row(
                    "SELECT id FROM swap_requests
                     WHERE from_user_id = ?1 AND to_user_id = ?2 AND status = 'pending'
                     LIMIT 1",
                    [from_user_id, to_user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Every request the user sent or received, newest first.
    pub fn list_swap_requests_for_user(&self, user_id: &str) -> Result<Vec<SwapRequestRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SWAP_COLUMNS} FROM swap_requests
                 WHERE from_user_id = ?1 OR to_user_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_swap)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Moves a request from `from_status` to `to_status` in a single
    /// conditional update. Returns false if the request was not in
    /// `from_status` (or does not exist), leaving it untouched.
    pub fn transition_swap_status(&self, id: &str, from_status: &str, to_status: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE swap_requests SET status = ?3 WHERE id = ?1 AND status = ?2",
                params![id, from_status, to_status],
            )?;
            Ok(changed > 0)
        })
    }

    /// Counts all requests, or only those in `status`.
    pub fn count_swap_requests(&self, status: Option<&str>) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = match status {
                Some(status) => conn.query_row(
                    "SELECT COUNT(*) FROM swap_requests WHERE status = ?1",
                    [status],
                    |r| r.get(0),
                )?,
                None => conn.query_row("SELECT COUNT(*) FROM swap_requests", [], |r| r.get(0))?,
            };
            Ok(n as u64)
        })
    }
}

fn map_swap(row: &Row<'_>) -> rusqlite::Result<SwapRequestRow> {
    Ok(SwapRequestRow {
        id: row.get(0)?,
        from_user_id: row.get(1)?,
        from_user_name: row.get(2)?,
        from_user_avatar: row.get(3)?,
        to_user_id: row.get(4)?,
        to_user_name: row.get(5)?,
        to_user_avatar: row.get(6)?,
        offered_skill: row.get(7)?,
        wanted_skill: row.get(8)?,
        status: row.get(9)?,
        message: row.get(10)?,
        created_at: row.get(11)?,
    })
}
