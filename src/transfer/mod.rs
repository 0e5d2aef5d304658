//! Transfer operations: the auth-aware retry wrapper and the per-file
//! upload/delete sequencing.

pub mod client;
pub mod executor;
pub mod orchestrator;

pub use client::{RetryOptions, TransferClient};
pub use executor::RetryingExecutor;
pub use orchestrator::ArchiveTransfer;
