//! Credential lifecycle: device-flow authorization, session refresh, and the
//! lazily built transfer-client handle.

pub mod backend;
pub mod client;
pub mod device;

pub use backend::{AuthBackend, DeviceCodeGrant};
pub use client::{AuthenticatedClient, ClientBuilder, ClientHandle};
pub use device::{DeviceAuthorizer, OperatorConsole, StdinConsole};
