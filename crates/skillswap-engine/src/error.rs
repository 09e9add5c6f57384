use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use skillswap_types::api::{ActionOutcome, FailureKind};

/// Why an engine operation refused or failed. `Display` is the one-line
/// message shown to the end user, except for `Storage`, which is logged and
/// replaced with a generic per-operation message.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Invalid(_) => FailureKind::Validation,
            Self::Forbidden(_) => FailureKind::Forbidden,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Conflict(_) => FailureKind::Conflict,
            Self::Storage(_) => FailureKind::Storage,
        }
    }

    /// Converts to the caller-facing failure shape. Storage details are
    /// logged here and never leave the engine.
    pub fn into_outcome(self, op: &str, fallback: &str) -> ActionOutcome {
        match self {
            Self::Storage(e) => {
                error!("Failed to {}: {:#}", op, e);
                ActionOutcome::failed(FailureKind::Storage, fallback)
            }
            other => {
                debug!("Refused to {}: {}", op, other);
                ActionOutcome::failed(other.kind(), other.to_string())
            }
        }
    }
}

/// Successful result of a mutating operation.
#[derive(Debug)]
pub(crate) struct Done {
    pub message: String,
    pub id: Option<Uuid>,
}

impl Done {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(message: impl Into<String>, id: Uuid) -> Self {
        Self {
            message: message.into(),
            id: Some(id),
        }
    }
}

pub(crate) fn settle(op: &str, fallback: &str, result: Result<Done, EngineError>) -> ActionOutcome {
    match result {
        Ok(done) => ActionOutcome::ok(done.message, done.id),
        Err(e) => e.into_outcome(op, fallback),
    }
}

/// Unwraps a read, logging storage failures and falling back to the
/// type's empty value.
pub(crate) fn or_empty<T: Default>(op: &str, result: anyhow::Result<T>) -> T {
    result.unwrap_or_else(|e| {
        error!("Failed to {}: {:#}", op, e);
        T::default()
    })
}

pub(crate) fn parse_id(raw: &str, msg: &str) -> Result<Uuid, EngineError> {
    raw.trim().parse().map_err(|_| EngineError::invalid(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_masked() {
        let outcome = EngineError::Storage(anyhow::anyhow!("disk I/O error"))
            .into_outcome("send message", "Failed to send message. Please try again.");
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Failed to send message. Please try again.");
        assert_eq!(outcome.failure, Some(FailureKind::Storage));
    }

    #[test]
    fn rule_failures_keep_their_message() {
        let outcome = EngineError::forbidden("You are not a participant in this chat.")
            .into_outcome("send message", "generic");
        assert_eq!(outcome.message, "You are not a participant in this chat.");
        assert_eq!(outcome.failure, Some(FailureKind::Forbidden));
    }

    #[test]
    fn id_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&format!(" {id} "), "bad").unwrap(), id);
        assert!(matches!(parse_id("42", "bad"), Err(EngineError::Invalid(m)) if m == "bad"));
    }
}
