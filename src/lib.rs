//! Stowage — backup archive transfer for device-flow protected object storage.
//!
//! Uploads backup archives to a remote object store whose API sits behind an
//! OAuth-style device authorization, and deletes archives when their
//! retention cycle expires. The file transfer itself is a thin wrapper around
//! an opaque provider client; the substance of this crate is the credential
//! lifecycle: sessions are cached on disk between runs, refreshed in place
//! when the remote rejects a stale token mid-transfer, and re-created through
//! the interactive device flow only when nothing usable is left.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use stowage::auth::ClientBuilder;
//! use stowage::config::StorageConfig;
//! use stowage::transfer::ArchiveTransfer;
//!
//! # async fn example(builder: Arc<dyn ClientBuilder>) -> stowage::Result<()> {
//! let config = StorageConfig::new("client-id", "client-secret", "apps/backups");
//! let transfer = ArchiveTransfer::new(config, builder);
//! transfer.upload(&["archive.tar_aa".into()], "backups/daily").await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod transfer;

pub use error::{Result, StowageError};
