use tracing::{info, warn};

use skillswap_types::api::ActionOutcome;
use skillswap_types::models::{AdminStats, SwapStatus, User};

use crate::error::{Done, EngineError, or_empty, parse_id, settle};
use crate::{Actor, Engine};

impl Engine {
    /// Whether the user currently holds admin rights. Reads the store, not
    /// the caller's token, so revocation takes effect immediately.
    pub fn is_user_admin(&self, user_id: &str) -> bool {
        let Ok(id) = parse_id(user_id, "Invalid user ID format.") else {
            return false;
        };
        or_empty("check admin", self.db.get_user_by_id(&id.to_string()))
            .is_some_and(|row| row.is_admin)
    }

    fn require_admin(&self, actor: &Actor) -> Result<(), EngineError> {
        let is_admin = self
            .db
            .get_user_by_id(&actor.key())?
            .is_some_and(|row| row.is_admin);
        if !is_admin {
            warn!(user_id = %actor.user_id, "Non-admin attempted an admin operation");
            return Err(EngineError::forbidden("Admin access required."));
        }
        Ok(())
    }

    pub fn get_admin_stats(&self, actor: &Actor) -> Result<AdminStats, EngineError> {
        self.require_admin(actor)?;
        Ok(AdminStats {
            total_users: self.db.count_users()?,
            admin_users: self.db.count_admins()?,
            total_requests: self.db.count_swap_requests(None)?,
            pending_requests: self.db.count_swap_requests(Some(SwapStatus::Pending.as_str()))?,
        })
    }

    /// Every user, public or not.
    pub fn get_all_users(&self, actor: &Actor) -> Result<Vec<User>, EngineError> {
        self.require_admin(actor)?;
        Ok(self.db.search_users(None)?.into_iter().map(User::from).collect())
    }

    pub fn set_admin_status(&self, actor: &Actor, user_id: &str, is_admin: bool) -> ActionOutcome {
        settle(
            "set admin status",
            "Failed to update admin status.",
            self.try_set_admin_status(actor, user_id, is_admin),
        )
    }

    fn try_set_admin_status(&self, actor: &Actor, user_id: &str, is_admin: bool) -> Result<Done, EngineError> {
        self.require_admin(actor)?;
        let id = parse_id(user_id, "Invalid user ID format.")?;

        if id == actor.user_id && !is_admin {
            return Err(EngineError::conflict("You cannot remove your own admin access."));
        }

        if !self.db.set_user_admin(&id.to_string(), is_admin)? {
            return Err(EngineError::not_found("User not found."));
        }

        info!(user_id = %id, is_admin, by = %actor.user_id, "Admin status changed");
        let message = if is_admin {
            "User promoted to admin."
        } else {
            "Admin access removed."
        };
        Ok(Done::with_id(message, id))
    }
}
