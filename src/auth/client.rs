//! Lazily built transfer-client handle bound to the current session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::device::DeviceAuthorizer;
use crate::error::{Result, StowageError};
use crate::session::{CacheKey, Session, SessionStore};
use crate::transfer::TransferClient;

/// Builds the provider-specific transfer client from a session and a
/// directory scope. Implemented by the host application around whatever SDK
/// talks to the storage service.
pub trait ClientBuilder: Send + Sync {
    fn build(&self, session: &Session, dir_scope: &str) -> Result<Arc<dyn TransferClient>>;
}

/// The live (session, directory scope) binding used for operations.
///
/// `generation` increments on every rebuild, which is how tests and logs can
/// tell a refreshed handle from a reused one.
#[derive(Clone)]
pub struct ClientHandle {
    pub transfer: Arc<dyn TransferClient>,
    pub generation: u64,
}

/// Owns at most one live [`ClientHandle`], rebuilding it lazily after an
/// invalidation.
///
/// One instance per backup run; access is one control flow at a time, so the
/// mutex is only ever briefly contended.
pub struct AuthenticatedClient {
    builder: Arc<dyn ClientBuilder>,
    store: Arc<dyn SessionStore>,
    authorizer: DeviceAuthorizer,
    key: CacheKey,
    dir_scope: String,
    current: Mutex<Option<ClientHandle>>,
    generation: AtomicU64,
}

impl AuthenticatedClient {
    pub fn new(
        builder: Arc<dyn ClientBuilder>,
        store: Arc<dyn SessionStore>,
        authorizer: DeviceAuthorizer,
        key: CacheKey,
        dir_scope: impl Into<String>,
    ) -> Self {
        Self {
            builder,
            store,
            authorizer,
            key,
            dir_scope: dir_scope.into(),
            current: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Current handle, building one first if needed.
    ///
    /// A cache miss starts the interactive device flow. Repeated calls
    /// return the same handle until [`Self::invalidate`] drops it.
    pub async fn get(&self) -> Result<ClientHandle> {
        let mut current = self.current.lock().await;
        if let Some(handle) = current.as_ref() {
            return Ok(handle.clone());
        }
        let session = match self.store.load(&self.key) {
            Some(session) => session,
            None => {
                info!("no usable cached session, starting device authorization");
                self.authorizer.run().await?
            }
        };
        let handle = self.build_handle(&session)?;
        *current = Some(handle.clone());
        Ok(handle)
    }

    /// Drop the live handle so the next [`Self::get`] rebuilds it from the
    /// (possibly just-refreshed) cached session.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }

    fn build_handle(&self, session: &Session) -> Result<ClientHandle> {
        let transfer = self
            .builder
            .build(session, &self.dir_scope)
            .map_err(|err| {
                StowageError::authorization_with_cause("could not build the transfer client", err)
            })?;
        let handle = ClientHandle {
            transfer,
            generation: self.generation.fetch_add(1, Ordering::SeqCst),
        };
        debug!(generation = handle.generation, "transfer client built");
        Ok(handle)
    }
}
