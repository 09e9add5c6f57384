//! Business rules of the skill-swap marketplace: the swap-request
//! lifecycle and everything it triggers (notifications, chats, feedback and
//! rating aggregation), plus the user directory and admin reporting.
//!
//! Every operation is a short, synchronous sequence of single-row store
//! calls. Mutating operations return an [`ActionOutcome`] and never panic or
//! propagate errors; reads degrade to empty values on storage failure.
//!
//! [`ActionOutcome`]: skillswap_types::api::ActionOutcome

mod admin;
mod chats;
mod error;
mod feedback;
mod notifications;
mod swaps;
mod users;

#[cfg(test)]
mod testing;

use skillswap_db::Database;
use uuid::Uuid;

pub use error::EngineError;
pub use feedback::{RatingSummary, aggregate_rating};
pub use users::SignedIn;

/// The authenticated user on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
}

impl Actor {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    fn key(&self) -> String {
        self.user_id.to_string()
    }
}

pub struct Engine {
    db: Database,
}

impl Engine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}
