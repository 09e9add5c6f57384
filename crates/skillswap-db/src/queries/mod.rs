//! Table-level operations on [`Database`](crate::Database). Every write
//! targets a single row or a single chat's messages; nothing here spans a
//! transaction.

mod chats;
mod feedback;
mod notifications;
mod swaps;
mod users;

#[cfg(test)]
pub(crate) mod fixtures;
