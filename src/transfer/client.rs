//! The opaque transfer-client capability.

use async_trait::async_trait;
use tokio::fs::File;

use crate::error::Result;

/// Transport-level retry settings, handed to the transfer client unchanged.
///
/// Chunked-upload retry and inter-attempt waits happen inside the provider
/// SDK; the auth-level retry in
/// [`RetryingExecutor`](crate::transfer::RetryingExecutor) is a separate,
/// bounded mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOptions {
    pub retry_times: u32,
    pub retry_waitsec: u64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            retry_times: 10,
            retry_waitsec: 30,
        }
    }
}

/// Provider SDK surface this crate drives, bound to a (session, directory
/// scope) pair by a [`ClientBuilder`](crate::auth::ClientBuilder).
///
/// Implementations signal a rejected access token as
/// [`StowageError::AuthExpired`](crate::error::StowageError::AuthExpired) so
/// the executor can refresh and retry.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Upload an open file to `dest`, retrying transport hiccups internally
    /// according to `retry`.
    async fn put(&self, file: File, dest: &str, retry: &RetryOptions) -> Result<()>;

    /// Delete a remote path (a file or a package directory).
    async fn delete(&self, path: &str) -> Result<()>;
}
