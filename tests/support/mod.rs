#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use stowage::auth::{ClientBuilder, OperatorConsole};
use stowage::error::{Result, StowageError};
use stowage::session::{CacheKey, Session, SessionStore};
use stowage::transfer::{RetryOptions, TransferClient};
use tokio::fs::File;

/// In-memory stand-in for the file-backed session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    stores: AtomicU64,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, key: &CacheKey, session: Session) {
        self.sessions
            .lock()
            .expect("store lock poisoned")
            .insert(key.file_name(), session);
    }

    pub fn get(&self, key: &CacheKey) -> Option<Session> {
        self.sessions
            .lock()
            .expect("store lock poisoned")
            .get(&key.file_name())
            .cloned()
    }

    /// Number of successful `store` calls.
    pub fn store_count(&self) -> u64 {
        self.stores.load(Ordering::SeqCst)
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, key: &CacheKey) -> Option<Session> {
        self.get(key)
    }

    fn store(&self, key: &CacheKey, session: &Session) -> Result<()> {
        self.sessions
            .lock()
            .expect("store lock poisoned")
            .insert(key.file_name(), session.clone());
        self.stores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn session(access: &str, refresh: Option<&str>) -> Session {
    Session {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_owned),
        obtained_at: Utc::now(),
        expires_at: None,
        metadata: serde_json::Map::new(),
    }
}

/// One scripted outcome for a transfer call.
#[derive(Debug, Clone, Copy)]
pub enum ScriptStep {
    Succeed,
    AuthExpired,
    BrokenPipe,
    Fail,
}

impl ScriptStep {
    fn into_result(self) -> Result<()> {
        match self {
            Self::Succeed => Ok(()),
            Self::AuthExpired => Err(StowageError::AuthExpired),
            Self::BrokenPipe => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stream closed",
            )
            .into()),
            Self::Fail => Err(StowageError::InvalidResponse("scripted failure".to_string())),
        }
    }
}

/// Builds [`RecordingTransferClient`]s that share one call log and one
/// outcome script; counts how many clients were built.
pub struct RecordingBuilder {
    script: Arc<Mutex<VecDeque<ScriptStep>>>,
    calls: Arc<Mutex<Vec<String>>>,
    builds: AtomicU64,
}

impl RecordingBuilder {
    pub fn new(script: Vec<ScriptStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
            builds: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::SeqCst)
    }
}

impl ClientBuilder for RecordingBuilder {
    fn build(
        &self,
        _session: &Session,
        _dir_scope: &str,
    ) -> Result<Arc<dyn TransferClient>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(RecordingTransferClient {
            script: self.script.clone(),
            calls: self.calls.clone(),
        }))
    }
}

pub struct RecordingTransferClient {
    script: Arc<Mutex<VecDeque<ScriptStep>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingTransferClient {
    fn next(&self) -> Result<()> {
        self.script
            .lock()
            .expect("script poisoned")
            .pop_front()
            .unwrap_or(ScriptStep::Succeed)
            .into_result()
    }
}

#[async_trait]
impl TransferClient for RecordingTransferClient {
    async fn put(&self, _file: File, dest: &str, retry: &RetryOptions) -> Result<()> {
        self.calls.lock().expect("call log poisoned").push(format!(
            "put {dest} retry_times={} retry_waitsec={}",
            retry.retry_times, retry.retry_waitsec
        ));
        self.next()
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push(format!("delete {path}"));
        self.next()
    }
}

/// Console that confirms immediately, for non-interactive tests.
pub struct AutoConfirmConsole;

#[async_trait]
impl OperatorConsole for AutoConfirmConsole {
    fn present(&self, _verification_url: &str, _user_code: &str) {}

    async fn wait_confirmation(&self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Console where the operator never answers, for timeout tests.
pub struct UnresponsiveConsole;

#[async_trait]
impl OperatorConsole for UnresponsiveConsole {
    fn present(&self, _verification_url: &str, _user_code: &str) {}

    async fn wait_confirmation(&self) -> std::io::Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}
