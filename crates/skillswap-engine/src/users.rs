use tracing::{info, warn};
use uuid::Uuid;

use skillswap_db::models::UserRow;
use skillswap_db::now_timestamp;
use skillswap_types::api::{ActionOutcome, ProfileUpdate, SignInRequest};
use skillswap_types::models::User;

use crate::error::{Done, EngineError, or_empty, parse_id, settle};
use crate::{Actor, Engine};

const DEFAULT_NAME: &str = "New User";
const DEFAULT_AVATAR: &str = "https://placehold.co/96x96.png";

/// Result of mapping an identity-provider principal onto a local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedIn {
    pub user_id: Uuid,
    /// True until the user lists at least one offered skill.
    pub is_new_user: bool,
    pub is_admin: bool,
}

impl From<&User> for SignedIn {
    fn from(user: &User) -> Self {
        SignedIn {
            user_id: user.id,
            is_new_user: user.skills_offered.is_empty(),
            is_admin: user.is_admin,
        }
    }
}

impl Engine {
    /// Finds the user by email, creating a record on first sight.
    pub fn sign_in(&self, principal: &SignInRequest) -> Result<SignedIn, EngineError> {
        let email = principal.email.trim();
        if email.is_empty() {
            return Err(EngineError::invalid("An email address is required to sign in."));
        }

        if let Some(row) = self.db.get_user_by_email(email)? {
            return Ok(SignedIn::from(&User::from(row)));
        }

        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            name: non_blank(principal.name.as_deref()).unwrap_or(DEFAULT_NAME).to_string(),
            email: email.to_string(),
            avatar: non_blank(principal.avatar.as_deref()).unwrap_or(DEFAULT_AVATAR).to_string(),
            bio: String::new(),
            location: String::new(),
            is_public: true,
            is_admin: false,
            skills_offered: "[]".into(),
            skills_wanted: "[]".into(),
            availability: String::new(),
            rating: 0.0,
            reviews: 0,
            created_at: now_timestamp(),
        };

        if let Err(e) = self.db.create_user(&row) {
            // A concurrent first sign-in may have won the unique email.
            if let Some(existing) = self.db.get_user_by_email(email)? {
                warn!("Sign-in raced with another insert for {}: {:#}", email, e);
                return Ok(SignedIn::from(&User::from(existing)));
            }
            return Err(e.into());
        }

        let user = User::from(row);
        info!(user_id = %user.id, "Created user on first sign-in");
        Ok(SignedIn::from(&user))
    }

    /// Users whose name or skills contain `search` (case-insensitive).
    pub fn get_users(&self, search: Option<&str>) -> Vec<User> {
        or_empty("list users", self.db.search_users(search))
            .into_iter()
            .map(User::from)
            .collect()
    }

    pub fn get_user_by_id(&self, user_id: &str) -> Option<User> {
        let id = parse_id(user_id, "Invalid user ID format.").ok()?;
        or_empty("load user", self.db.get_user_by_id(&id.to_string())).map(User::from)
    }

    pub fn update_user_profile(&self, actor: &Actor, user_id: &str, update: ProfileUpdate) -> ActionOutcome {
        settle(
            "update profile",
            "Failed to update profile.",
            self.try_update_user_profile(actor, user_id, update),
        )
    }

    fn try_update_user_profile(
        &self,
        actor: &Actor,
        user_id: &str,
        mut update: ProfileUpdate,
    ) -> Result<Done, EngineError> {
        let id = parse_id(user_id, "Invalid user ID format.")?;
        if id != actor.user_id {
            return Err(EngineError::forbidden("You can only edit your own profile."));
        }

        if let Some(name) = update.name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err(EngineError::invalid("Name cannot be empty."));
            }
        }
        update.skills_offered = update.skills_offered.map(clean_skills);
        update.skills_wanted = update.skills_wanted.map(clean_skills);

        if !self.db.update_user_profile(&id.to_string(), &update)? {
            return Err(EngineError::not_found("User not found."));
        }

        Ok(Done::message("Profile updated successfully."))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clean_skills(skills: Vec<String>) -> Vec<String> {
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_ok, assert_refused, engine, sign_up};

    #[test]
    fn first_sign_in_creates_user_with_defaults() {
        let engine = engine();
        let signed = engine
            .sign_in(&SignInRequest {
                email: "dana@example.com".into(),
                name: None,
                avatar: Some("  ".into()),
            })
            .unwrap();
        assert!(signed.is_new_user);
        assert!(!signed.is_admin);

        let user = engine.get_user_by_id(&signed.user_id.to_string()).unwrap();
        assert_eq!(user.name, "New User");
        assert_eq!(user.avatar, "https://placehold.co/96x96.png");
        assert!(user.is_public);
        assert_eq!(user.rating, 0.0);
        assert_eq!(user.reviews, 0);
    }

    #[test]
    fn repeat_sign_in_maps_to_same_user() {
        let engine = engine();
        let first = sign_up(&engine, "Alice");
        let again = engine
            .sign_in(&SignInRequest {
                email: "alice@example.com".into(),
                name: Some("Someone Else".into()),
                avatar: None,
            })
            .unwrap();
        assert_eq!(again.user_id, first.user_id);

        let user = engine.get_user_by_id(&first.user_id.to_string()).unwrap();
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn sign_in_requires_email() {
        let engine = engine();
        let err = engine
            .sign_in(&SignInRequest { email: " ".into(), name: None, avatar: None })
            .unwrap_err();
        assert!(matches!(err, EngineError::Invalid(_)));
    }

    #[test]
    fn new_user_flag_clears_once_skills_are_offered() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");

        let outcome = engine.update_user_profile(
            &alice,
            &alice.user_id.to_string(),
            ProfileUpdate {
                skills_offered: Some(vec![" Guitar ".into(), "".into(), "Piano".into()]),
                availability: Some("Weekends".into()),
                ..Default::default()
            },
        );
        assert_ok(&outcome);

        let user = engine.get_user_by_id(&alice.user_id.to_string()).unwrap();
        assert_eq!(user.skills_offered, vec!["Guitar", "Piano"]);
        assert_eq!(user.availability, "Weekends");

        let again = engine
            .sign_in(&SignInRequest { email: "alice@example.com".into(), name: None, avatar: None })
            .unwrap();
        assert!(!again.is_new_user);
    }

    #[test]
    fn profile_edits_are_owner_only() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");

        let outcome = engine.update_user_profile(
            &bob,
            &alice.user_id.to_string(),
            ProfileUpdate { bio: Some("hijacked".into()), ..Default::default() },
        );
        assert_refused(&outcome, "You can only edit your own profile.");

        let outcome = engine.update_user_profile(
            &alice,
            &alice.user_id.to_string(),
            ProfileUpdate { name: Some("   ".into()), ..Default::default() },
        );
        assert_refused(&outcome, "Name cannot be empty.");
    }

    #[test]
    fn search_by_skill() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        sign_up(&engine, "Bob");
        assert_ok(&engine.update_user_profile(
            &alice,
            &alice.user_id.to_string(),
            ProfileUpdate { skills_wanted: Some(vec!["Python".into()]), ..Default::default() },
        ));

        let hits = engine.get_users(Some("python"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, alice.user_id);
        assert_eq!(engine.get_users(None).len(), 2);
    }

    #[test]
    fn unknown_or_malformed_ids_resolve_to_none() {
        let engine = engine();
        assert!(engine.get_user_by_id("not-a-uuid").is_none());
        assert!(engine.get_user_by_id(&Uuid::new_v4().to_string()).is_none());
    }
}
