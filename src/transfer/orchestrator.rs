//! Sequences per-file uploads and per-package deletes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::client::RetryOptions;
use super::executor::RetryingExecutor;
use crate::auth::{AuthBackend, AuthenticatedClient, ClientBuilder, DeviceAuthorizer};
use crate::config::StorageConfig;
use crate::error::{Result, StowageError};
use crate::session::{CacheKey, FileSessionStore, SessionStore};

/// Uploads backup archives and removes expired packages, one operation at a
/// time, through the auth-aware executor.
pub struct ArchiveTransfer {
    executor: RetryingExecutor,
    retry: RetryOptions,
}

impl ArchiveTransfer {
    /// Wire up the full stack from plain configuration: file-backed session
    /// store, device authorization on stdin/stdout, and the retrying
    /// executor.
    pub fn new(config: StorageConfig, builder: Arc<dyn ClientBuilder>) -> Self {
        let store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(config.cache_dir.clone()));
        Self::with_store(config, builder, store)
    }

    /// Same wiring with an injected session store.
    pub fn with_store(
        config: StorageConfig,
        builder: Arc<dyn ClientBuilder>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let key = CacheKey::new(config.storage_id.as_deref(), &config.client_id);
        let backend = Arc::new(AuthBackend::new(&config.client_id, &config.client_secret));
        let authorizer =
            DeviceAuthorizer::new(backend.clone(), store.clone(), key.clone(), &config.product)
                .with_confirm_timeout(Duration::from_secs(config.confirm_timeout_secs));
        let client = Arc::new(AuthenticatedClient::new(
            builder,
            store.clone(),
            authorizer,
            key.clone(),
            &config.dir_name,
        ));
        let executor = RetryingExecutor::new(client, store, backend, key);
        Self {
            executor,
            retry: RetryOptions {
                retry_times: config.max_retries,
                retry_waitsec: config.retry_waitsec,
            },
        }
    }

    /// Build from pre-assembled parts, for hosts that bring their own seams.
    pub fn from_parts(executor: RetryingExecutor, retry: RetryOptions) -> Self {
        Self { executor, retry }
    }

    /// Upload each file to `dest_prefix/<filename>`, in the given order.
    ///
    /// Each file gets its own auth-retry budget. The first unrecovered
    /// failure aborts the rest; files already transferred stay put.
    pub async fn upload(&self, files: &[PathBuf], dest_prefix: &str) -> Result<()> {
        for file in files {
            let dest = join_remote(dest_prefix, file)?;
            info!(dest = %dest, "storing archive");
            self.executor
                .run(|handle| {
                    let src = file.clone();
                    let dest = dest.clone();
                    let retry = self.retry.clone();
                    async move {
                        // Reopened per attempt so a retried upload starts
                        // from the beginning of the file.
                        let reader = tokio::fs::File::open(&src).await?;
                        handle.transfer.put(reader, &dest, &retry).await
                    }
                })
                .await?;
        }
        Ok(())
    }

    /// Remove one backup package's remote directory.
    pub async fn remove(&self, remote_path: &str) -> Result<()> {
        info!(path = %remote_path, "removing backup package");
        self.executor
            .run(|handle| {
                let path = remote_path.to_string();
                async move { handle.transfer.delete(&path).await }
            })
            .await
    }
}

/// `prefix/filename`; the source path must have a usable final component.
fn join_remote(prefix: &str, file: &Path) -> Result<String> {
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            StowageError::transfer(format!(
                "source path has no usable file name: {}",
                file.display()
            ))
        })?;
    Ok(format!("{}/{}", prefix.trim_end_matches('/'), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_remote_appends_file_name() {
        let dest = join_remote("backups/daily", Path::new("/tmp/pkg.tar_aa")).unwrap();
        assert_eq!(dest, "backups/daily/pkg.tar_aa");
    }

    #[test]
    fn join_remote_tolerates_trailing_slash() {
        let dest = join_remote("backups/daily/", Path::new("pkg.tar_aa")).unwrap();
        assert_eq!(dest, "backups/daily/pkg.tar_aa");
    }

    #[test]
    fn join_remote_rejects_path_without_file_name() {
        let result = join_remote("backups", Path::new("/"));
        assert!(matches!(
            result,
            Err(StowageError::TransferFailed { .. })
        ));
    }
}
