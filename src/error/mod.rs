//! Error types for stowage.

use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Primary error type for all stowage operations.
#[derive(Error, Debug)]
pub enum StowageError {
    /// The device flow, a credential exchange, or client construction failed.
    #[error("Authorization failed: {message}")]
    AuthorizationFailed {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    /// The operator did not confirm the device authorization in time.
    #[error("Authorization timed out after {0}s")]
    AuthorizationTimeout(u64),

    /// The bounded refresh loop was exhausted.
    #[error("Too many auth errors")]
    TooManyAuthRetries,

    /// A transfer operation failed for a non-credential reason.
    #[error("Transfer failed: {message}")]
    TransferFailed {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    /// The remote rejected the current access token.
    #[error("Access token expired or rejected")]
    AuthExpired,

    /// A cached session entry could not be decoded.
    #[error("Cache entry corrupt: {0}")]
    CacheCorrupt(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl StowageError {
    /// Create an authorization failure without an underlying cause.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::AuthorizationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a cause into an authorization failure.
    pub fn authorization_with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        Self::AuthorizationFailed {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    /// Create a transfer failure without an underlying cause.
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::TransferFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a cause into a transfer failure.
    pub fn transfer_with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        Self::TransferFailed {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    /// Whether this failure points at stale credentials rather than the
    /// transfer itself.
    ///
    /// A broken pipe or connection reset counts as auth-class: the server is
    /// assumed to have dropped the connection over a stale session, the same
    /// way it would reject an expired token.
    pub fn is_auth_class(&self) -> bool {
        match self {
            Self::AuthExpired => true,
            Self::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StowageError>;
