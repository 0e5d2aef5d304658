//! Auth-aware retry around individual transfer operations.
//!
//! Transport-level retry lives inside the transfer client; this wrapper only
//! recovers from stale credentials, with a hard bound so a dead refresh
//! token cannot loop forever.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthBackend, AuthenticatedClient, ClientHandle};
use crate::error::{Result, StowageError};
use crate::session::{CacheKey, SessionStore};

/// Refresh attempts allowed per operation before giving up.
const MAX_AUTH_RETRIES: u32 = 5;

/// Wraps transfer operations with refresh-and-retry on auth-class failures.
pub struct RetryingExecutor {
    client: Arc<AuthenticatedClient>,
    store: Arc<dyn SessionStore>,
    backend: Arc<AuthBackend>,
    key: CacheKey,
}

impl RetryingExecutor {
    pub fn new(
        client: Arc<AuthenticatedClient>,
        store: Arc<dyn SessionStore>,
        backend: Arc<AuthBackend>,
        key: CacheKey,
    ) -> Self {
        Self {
            client,
            store,
            backend,
            key,
        }
    }

    /// Run `op` against the current client handle, refreshing the session
    /// and rebuilding the handle when the failure looks credential-caused.
    ///
    /// The retry budget is per call; every top-level operation starts fresh.
    /// Non-auth failures are wrapped once as a transfer failure and returned
    /// immediately.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(ClientHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut auth_retries = 0;
        loop {
            let handle = self.client.get().await?;
            match op(handle).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_auth_class() => {
                    auth_retries += 1;
                    if auth_retries > MAX_AUTH_RETRIES {
                        warn!(
                            retries = auth_retries - 1,
                            "giving up after repeated auth errors"
                        );
                        return Err(StowageError::TooManyAuthRetries);
                    }
                    info!(attempt = auth_retries, "refreshing session");
                    self.refresh_session().await?;
                }
                Err(err @ StowageError::TransferFailed { .. }) => return Err(err),
                Err(err) => {
                    return Err(StowageError::transfer_with_cause(
                        "transfer operation failed",
                        err,
                    ))
                }
            }
        }
    }

    /// Exchange the cached refresh token for a new session, persist it, and
    /// invalidate the live handle.
    ///
    /// Fails without touching the cache when there is nothing to refresh
    /// with, or when the backend rejects the exchange.
    async fn refresh_session(&self) -> Result<()> {
        let session = self
            .store
            .load(&self.key)
            .ok_or_else(|| StowageError::authorization("no cached session to refresh"))?;
        let refresh_token = session
            .refresh_token
            .ok_or_else(|| StowageError::authorization("cached session has no refresh token"))?;
        let refreshed = self.backend.refresh(&refresh_token).await.map_err(|err| {
            StowageError::authorization_with_cause("refresh exchange failed", err)
        })?;
        let Some(new_session) = refreshed else {
            return Err(StowageError::authorization(
                "refresh exchange yielded no session",
            ));
        };
        self.store.store(&self.key, &new_session)?;
        self.client.invalidate().await;
        Ok(())
    }
}
