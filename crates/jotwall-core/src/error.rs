//! Error types for jotwall-core

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using jotwall-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in jotwall-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any backend call
    #[error("Invalid note: {0}")]
    Validation(String),

    /// Authentication failure surfaced by the auth provider
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Note not found on the backend
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Generic backend failure (including network failures)
    #[error("Store error: {0}")]
    Store(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A mutation was attempted without a signed-in session
    #[error("Not signed in")]
    NotAuthenticated,

    /// A save or delete is already in flight
    #[error("Another save or delete is already in progress")]
    Busy,

    /// The requested lifecycle action does not apply to the current state
    #[error("Cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether re-invoking the same action can succeed without changing input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Validation(_) | Self::InvalidTransition { .. } | Self::NotAuthenticated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_are_retryable() {
        assert!(Error::Store("connection reset".to_string()).is_retryable());
        assert!(Error::NotFound("abc".to_string()).is_retryable());
        assert!(Error::Busy.is_retryable());
    }

    #[test]
    fn input_errors_are_not_retryable() {
        assert!(!Error::Validation("empty".to_string()).is_retryable());
        assert!(!Error::NotAuthenticated.is_retryable());
        assert!(!Error::InvalidTransition {
            from: "idle",
            action: "save"
        }
        .is_retryable());
    }

    #[test]
    fn invalid_transition_message_names_state_and_action() {
        let error = Error::InvalidTransition {
            from: "confirming a delete",
            action: "save",
        };
        assert_eq!(error.to_string(), "Cannot save while confirming a delete");
    }
}
