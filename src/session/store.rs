//! Durable per-backend session cache.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::{codec, Session};
use crate::error::Result;

/// Identifies one cache entry: one per (storage identity, credential
/// identity).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    storage_id: Option<String>,
    client_id: String,
}

impl CacheKey {
    pub fn new(storage_id: Option<&str>, client_id: &str) -> Self {
        Self {
            storage_id: storage_id.map(str::to_owned),
            client_id: client_id.to_owned(),
        }
    }

    /// Deterministic file name for this key. An absent storage id is a
    /// valid, stable component, kept distinct from any explicit id.
    pub fn file_name(&self) -> String {
        format!(
            "session_{}_{}",
            normalize_label(self.storage_id.as_deref().unwrap_or("")),
            normalize_label(&self.client_id)
        )
    }
}

/// Storage abstraction for persisted sessions.
pub trait SessionStore: Send + Sync {
    /// Load the cached session for `key`.
    ///
    /// Any unreadable entry — missing file, mangled envelope, bad JSON — is
    /// a soft miss: it forces a fresh authorization but never fails the run.
    fn load(&self, key: &CacheKey) -> Option<Session>;

    /// Persist `session` for `key`, replacing any previous entry.
    fn store(&self, key: &CacheKey, session: &Session) -> Result<()>;
}

/// File-backed session store, one envelope file per cache key.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.base_dir.join(key.file_name())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &CacheKey) -> Option<Session> {
        let path = self.entry_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read cached session");
                return None;
            }
        };
        match codec::decode(&raw) {
            Ok(session) => {
                debug!(path = %path.display(), "session loaded from cache");
                Some(session)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cached session looks corrupt, ignoring it");
                None
            }
        }
    }

    fn store(&self, key: &CacheKey, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let path = self.entry_path(key);
        // Write to a temp sibling and rename, so an interrupted write never
        // clobbers a previously good entry.
        let tmp = self.base_dir.join(format!("{}.tmp", key.file_name()));
        fs::write(&tmp, codec::encode(session)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn normalize_label(value: &str) -> String {
    value
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '-'
            }
        })
        .collect()
}
