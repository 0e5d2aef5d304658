//! Session values, their on-disk envelope, and the per-backend cache.

pub mod codec;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use store::{CacheKey, FileSessionStore, SessionStore};

/// Credential bundle for the remote storage service.
///
/// Produced only by the device-flow exchange or a refresh exchange; treated
/// as an immutable value. A refreshed session replaces the old one wholesale,
/// in memory and in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub obtained_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Provider-specific extras (scope, session keys) carried opaquely.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}
