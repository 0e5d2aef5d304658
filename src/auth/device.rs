//! Interactive device-flow authorization.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::backend::AuthBackend;
use crate::error::{Result, StowageError};
use crate::session::{CacheKey, Session, SessionStore};

/// Where device-flow instructions go and how confirmation comes back.
///
/// Instructions are operator-facing output, kept separate from the log
/// stream so they cannot get lost between ordinary log lines.
#[async_trait]
pub trait OperatorConsole: Send + Sync {
    fn present(&self, verification_url: &str, user_code: &str);
    async fn wait_confirmation(&self) -> std::io::Result<()>;
}

/// Production console: stdout instructions, stdin confirmation.
pub struct StdinConsole;

#[async_trait]
impl OperatorConsole for StdinConsole {
    fn present(&self, verification_url: &str, user_code: &str) {
        println!("1. Visit verification url: {verification_url}");
        println!("2. Type user code below in the form");
        println!("\t {user_code}");
        println!("3. Hit 'Enter/Return' once you're authorized.");
    }

    async fn wait_confirmation(&self) -> std::io::Result<()> {
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(())
    }
}

/// Runs the blocking device flow when no usable cached session exists.
pub struct DeviceAuthorizer {
    backend: Arc<AuthBackend>,
    store: Arc<dyn SessionStore>,
    key: CacheKey,
    product: String,
    confirm_timeout: Duration,
    console: Arc<dyn OperatorConsole>,
}

impl DeviceAuthorizer {
    pub fn new(
        backend: Arc<AuthBackend>,
        store: Arc<dyn SessionStore>,
        key: CacheKey,
        product: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            store,
            key,
            product: product.into(),
            confirm_timeout: Duration::from_secs(300),
            console: Arc::new(StdinConsole),
        }
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    pub fn with_console(mut self, console: Arc<dyn OperatorConsole>) -> Self {
        self.console = console;
        self
    }

    /// Run the full flow: request codes, wait for the operator, exchange the
    /// device code, persist.
    ///
    /// Never returns a session that has not already been cached, and never
    /// returns a partial one: any failed step wraps into a single
    /// authorization error with its cause attached.
    pub async fn run(&self) -> Result<Session> {
        let grant = self
            .backend
            .user_and_device_code(&self.product)
            .await
            .map_err(|err| {
                StowageError::authorization_with_cause("could not request a device code", err)
            })?;

        self.console.present(&grant.verification_url, &grant.user_code);

        match tokio::time::timeout(self.confirm_timeout, self.console.wait_confirmation()).await {
            Err(_) => {
                return Err(StowageError::AuthorizationTimeout(
                    self.confirm_timeout.as_secs(),
                ))
            }
            Ok(Err(err)) => {
                return Err(StowageError::authorization_with_cause(
                    "operator confirmation failed",
                    err,
                ))
            }
            Ok(Ok(())) => {}
        }

        let session = self
            .backend
            .exchange_device_code(&grant.device_code)
            .await
            .map_err(|err| {
                StowageError::authorization_with_cause("device code exchange failed", err)
            })?;

        self.store.store(&self.key, &session).map_err(|err| {
            StowageError::authorization_with_cause("could not cache the new session", err)
        })?;
        info!("new session authorized and cached");
        Ok(session)
    }
}
