//! Plain-value configuration for one storage target.
//!
//! The host application owns parsing and validation; this struct only
//! carries the resolved values the transfer core consumes.

use std::path::PathBuf;

/// Default remote destination prefix.
pub const DEFAULT_PATH: &str = "backups";
/// Default transport retry count, passed through to the transfer client.
pub const DEFAULT_MAX_RETRIES: u32 = 10;
/// Default wait between transport retries, in seconds.
pub const DEFAULT_RETRY_WAITSEC: u64 = 30;
/// How long the device flow waits for operator confirmation.
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 300;

/// Everything needed to drive one configured storage backend.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// OAuth client credentials for the storage product.
    pub client_id: String,
    pub client_secret: String,
    /// Distinguishes multiple configured backends sharing one credential.
    /// Absent is a valid, stable identity of its own.
    pub storage_id: Option<String>,
    /// Directory scope the transfer client is bound to.
    pub dir_name: String,
    /// Remote destination prefix for uploads.
    pub path: String,
    /// Where cached sessions live.
    pub cache_dir: PathBuf,
    /// Authorization scope requested during the device flow.
    pub product: String,
    /// Transport retry count, passed through to the transfer client.
    pub max_retries: u32,
    /// Wait between transport retries, in seconds. Passed through.
    pub retry_waitsec: u64,
    /// Device-flow confirmation timeout, in seconds.
    pub confirm_timeout_secs: u64,
}

impl StorageConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        dir_name: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            storage_id: None,
            dir_name: dir_name.into(),
            path: DEFAULT_PATH.to_string(),
            cache_dir: default_cache_dir(),
            product: "netdisk".to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_waitsec: DEFAULT_RETRY_WAITSEC,
            confirm_timeout_secs: DEFAULT_CONFIRM_TIMEOUT_SECS,
        }
    }

    pub fn with_storage_id(mut self, storage_id: impl Into<String>) -> Self {
        self.storage_id = Some(storage_id.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_waitsec: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_waitsec = retry_waitsec;
        self
    }

    pub fn with_confirm_timeout(mut self, secs: u64) -> Self {
        self.confirm_timeout_secs = secs;
        self
    }
}

/// `~/.stowage/sessions`, or a relative fallback when no home dir exists.
fn default_cache_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".stowage").join("sessions"))
        .unwrap_or_else(|| PathBuf::from(".stowage/sessions"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = StorageConfig::new("ci", "cs", "dn");
        assert_eq!(config.client_id, "ci");
        assert_eq!(config.client_secret, "cs");
        assert_eq!(config.dir_name, "dn");
        assert!(config.storage_id.is_none());
        assert_eq!(config.path, "backups");
        assert_eq!(config.product, "netdisk");
        assert_eq!(config.max_retries, 10);
        assert_eq!(config.retry_waitsec, 30);
        assert_eq!(config.confirm_timeout_secs, 300);
    }

    #[test]
    fn builders_override_defaults() {
        let config = StorageConfig::new("ci", "cs", "dn")
            .with_storage_id("sid")
            .with_path("myback")
            .with_cache_dir("/tmp/stowage-cache")
            .with_product("mydisk")
            .with_retries(2, 3)
            .with_confirm_timeout(10);
        assert_eq!(config.storage_id.as_deref(), Some("sid"));
        assert_eq!(config.path, "myback");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/stowage-cache"));
        assert_eq!(config.product, "mydisk");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_waitsec, 3);
        assert_eq!(config.confirm_timeout_secs, 10);
    }
}
