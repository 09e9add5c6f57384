use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::FeedbackRow;

impl Database {
    /// Inserts unless this author already rated this swap. Returns true if
    /// this call created the row.
    pub fn insert_feedback(&self, feedback: &FeedbackRow) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO feedback (id, swap_request_id, from_user_id, to_user_id,
                                                 from_user_name, to_user_name, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    feedback.id,
                    feedback.swap_request_id,
                    feedback.from_user_id,
                    feedback.to_user_id,
                    feedback.from_user_name,
                    feedback.to_user_name,
                    feedback.rating,
                    feedback.comment,
                    feedback.created_at,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn feedback_exists(&self, swap_request_id: &str, from_user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<String> = conn
                .query_row(
                    "SELECT id FROM feedback WHERE swap_request_id = ?1 AND from_user_id = ?2",
                    [swap_request_id, from_user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Feedback left on a swap, newest first.
    pub fn list_feedback_for_swap(&self, swap_request_id: &str) -> Result<Vec<FeedbackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, swap_request_id, from_user_id, to_user_id, from_user_name, to_user_name,
                        rating, comment, created_at
                 FROM feedback
                 WHERE swap_request_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([swap_request_id], |row| {
                    Ok(FeedbackRow {
                        id: row.get(0)?,
                        swap_request_id: row.get(1)?,
                        from_user_id: row.get(2)?,
                        to_user_id: row.get(3)?,
                        from_user_name: row.get(4)?,
                        to_user_name: row.get(5)?,
                        rating: row.get(6)?,
                        comment: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Every rating the user has received.
    pub fn ratings_for_user(&self, to_user_id: &str) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT rating FROM feedback WHERE to_user_id = ?1")?;
            let ratings = stmt
                .query_map([to_user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(ratings)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRow;
    use crate::now_timestamp;
    use crate::queries::fixtures::{swap, user};
    use uuid::Uuid;

    fn feedback(request_id: &str, from: &UserRow, to: &UserRow, rating: i64) -> FeedbackRow {
        FeedbackRow {
            id: Uuid::new_v4().to_string(),
            swap_request_id: request_id.to_string(),
            from_user_id: from.id.clone(),
            to_user_id: to.id.clone(),
            from_user_name: from.name.clone(),
            to_user_name: to.name.clone(),
            rating,
            comment: String::new(),
            created_at: now_timestamp(),
        }
    }

    #[test]
    fn one_feedback_per_author_per_swap() {
        let db = Database::open_in_memory().unwrap();
        let a = user("Alice", "alice@example.com");
        let b = user("Bob", "bob@example.com");
        db.create_user(&a).unwrap();
        db.create_user(&b).unwrap();
        let req = swap(&a, &b, "completed");
        db.insert_swap_request(&req).unwrap();

        assert!(!db.feedback_exists(&req.id, &a.id).unwrap());
        assert!(db.insert_feedback(&feedback(&req.id, &a, &b, 5)).unwrap());
        assert!(db.feedback_exists(&req.id, &a.id).unwrap());
        assert!(!db.insert_feedback(&feedback(&req.id, &a, &b, 1)).unwrap());

        // The other side can still rate.
        assert!(db.insert_feedback(&feedback(&req.id, &b, &a, 4)).unwrap());

        let listed = db.list_feedback_for_swap(&req.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].from_user_id, b.id);

        assert_eq!(db.ratings_for_user(&b.id).unwrap(), vec![5]);
    }
}
