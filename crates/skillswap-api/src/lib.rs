//! HTTP surface of the marketplace: JSON routes over the engine, guarded by
//! a bearer JWT issued at sign-in.

pub mod admin;
pub mod auth;
pub mod chats;
pub mod feedback;
pub mod middleware;
pub mod notifications;
mod reply;
mod router;
pub mod swaps;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use router::router;
