use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

use skillswap_types::api::ProfileUpdate;

use crate::Database;
use crate::models::{UserRow, parse_skills};

const USER_COLUMNS: &str = "id, name, email, avatar, bio, location, is_public, is_admin, \
     skills_offered, skills_wanted, availability, rating, reviews, created_at";

impl Database {
    pub fn create_user(&self, user: &UserRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, avatar, bio, location, is_public, is_admin,
                                    skills_offered, skills_wanted, availability, rating, reviews, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    user.id,
                    user.name,
                    user.email,
                    user.avatar,
                    user.bio,
                    user.location,
                    user.is_public,
                    user.is_admin,
                    user.skills_offered,
                    user.skills_wanted,
                    user.availability,
                    user.rating,
                    user.reviews,
                    user.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    /// Case-insensitive substring match on name and on each entry of both
    /// skill lists. `None` or a blank term lists everyone.
    pub fn search_users(&self, term: Option<&str>) -> Result<Vec<UserRow>> {
        let needle = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let rows = self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        // Matched here rather than in SQL: skills are JSON text and SQLite's
        // lower() only folds ASCII.
        Ok(match needle {
            Some(needle) => rows.into_iter().filter(|row| matches_term(row, &needle)).collect(),
            None => rows,
        })
    }

    /// Applies only the fields present in `update`. Returns false when no
    /// user has this id.
    pub fn update_user_profile(&self, id: &str, update: &ProfileUpdate) -> Result<bool> {
        let skills_offered = update
            .skills_offered
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let skills_wanted = update
            .skills_wanted
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    name = COALESCE(?2, name),
                    avatar = COALESCE(?3, avatar),
                    bio = COALESCE(?4, bio),
                    location = COALESCE(?5, location),
                    is_public = COALESCE(?6, is_public),
                    availability = COALESCE(?7, availability),
                    skills_offered = COALESCE(?8, skills_offered),
                    skills_wanted = COALESCE(?9, skills_wanted)
                 WHERE id = ?1",
                params![
                    id,
                    update.name,
                    update.avatar,
                    update.bio,
                    update.location,
                    update.is_public,
                    update.availability,
                    skills_offered,
                    skills_wanted,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn set_user_admin(&self, id: &str, is_admin: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET is_admin = ?2 WHERE id = ?1",
                params![id, is_admin],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn set_user_rating(&self, id: &str, rating: f64, reviews: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET rating = ?2, reviews = ?3 WHERE id = ?1",
                params![id, rating, reviews],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn count_users(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }

    pub fn count_admins(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 =
                conn.query_row("SELECT COUNT(*) FROM users WHERE is_admin = 1", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }
}

/// `needle` is already lowercased.
fn matches_term(row: &UserRow, needle: &str) -> bool {
    row.name.to_lowercase().contains(needle)
        || [&row.skills_offered, &row.skills_wanted]
            .into_iter()
            .flat_map(|raw| parse_skills(raw, &row.id))
            .any(|skill| skill.to_lowercase().contains(needle))
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let row = conn.query_row(&sql, [value], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        avatar: row.get(3)?,
        bio: row.get(4)?,
        location: row.get(5)?,
        is_public: row.get(6)?,
        is_admin: row.get(7)?,
        skills_offered: row.get(8)?,
        skills_wanted: row.get(9)?,
        availability: row.get(10)?,
        rating: row.get(11)?,
        reviews: row.get(12)?,
        created_at: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::user;

    #[test]
    fn create_and_lookup_by_id_and_email() {
        let db = Database::open_in_memory().unwrap();
        let alice = user("Alice", "alice@example.com");
        db.create_user(&alice).unwrap();

        let by_id = db.get_user_by_id(&alice.id).unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");

        let by_email = db.get_user_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, alice.id);

        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn email_is_unique() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("Alice", "same@example.com")).unwrap();
        assert!(db.create_user(&user("Alicia", "same@example.com")).is_err());
    }

    #[test]
    fn search_matches_names_and_skills_case_insensitively() {
        let db = Database::open_in_memory().unwrap();
        let mut alice = user("Alice", "alice@example.com");
        alice.skills_offered = r#"["Guitar"]"#.into();
        let mut bob = user("Bob", "bob@example.com");
        bob.skills_wanted = r#"["Python","guitar tuning"]"#.into();
        let carol = user("Carol", "carol@example.com");
        for u in [&alice, &bob, &carol] {
            db.create_user(u).unwrap();
        }

        let hits = db.search_users(Some("GUITAR")).unwrap();
        let names: Vec<_> = hits.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);

        let hits = db.search_users(Some("caro")).unwrap();
        assert_eq!(hits.len(), 1);

        assert_eq!(db.search_users(None).unwrap().len(), 3);
        assert_eq!(db.search_users(Some("   ")).unwrap().len(), 3);
    }

    #[test]
    fn search_ignores_json_punctuation() {
        let db = Database::open_in_memory().unwrap();
        let mut alice = user("Alice", "alice@example.com");
        alice.skills_offered = r#"["Guitar","Piano"]"#.into();
        db.create_user(&alice).unwrap();
        db.create_user(&user("Bob", "bob@example.com")).unwrap();

        for term in ["[", "]", ",", "\"", "\",\""] {
            assert!(db.search_users(Some(term)).unwrap().is_empty(), "term {term:?} matched");
        }
        let hits = db.search_users(Some("piano")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Alice");
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let db = Database::open_in_memory().unwrap();
        let mut unal = user("Ünal", "unal@example.com");
        unal.skills_wanted = r#"["Ölmalerei"]"#.into();
        db.create_user(&unal).unwrap();
        db.create_user(&user("Bob", "bob@example.com")).unwrap();

        let hits = db.search_users(Some("ünal")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "unal@example.com");
        assert_eq!(db.search_users(Some("ÖLMAL")).unwrap().len(), 1);
    }

    #[test]
    fn profile_update_only_touches_present_fields() {
        let db = Database::open_in_memory().unwrap();
        let alice = user("Alice", "alice@example.com");
        db.create_user(&alice).unwrap();

        let update = ProfileUpdate {
            bio: Some("Luthier".into()),
            skills_offered: Some(vec!["Guitar".into(), "Woodwork".into()]),
            ..Default::default()
        };
        assert!(db.update_user_profile(&alice.id, &update).unwrap());

        let row = db.get_user_by_id(&alice.id).unwrap().unwrap();
        assert_eq!(row.name, "Alice");
        assert_eq!(row.bio, "Luthier");
        assert_eq!(row.skills_offered, r#"["Guitar","Woodwork"]"#);
        assert_eq!(row.skills_wanted, "[]");

        assert!(!db.update_user_profile("missing", &update).unwrap());
    }

    #[test]
    fn counts_admins_separately() {
        let db = Database::open_in_memory().unwrap();
        let alice = user("Alice", "alice@example.com");
        db.create_user(&alice).unwrap();
        db.create_user(&user("Bob", "bob@example.com")).unwrap();

        assert!(db.set_user_admin(&alice.id, true).unwrap());
        assert_eq!(db.count_users().unwrap(), 2);
        assert_eq!(db.count_admins().unwrap(), 1);
    }
}
