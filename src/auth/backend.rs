//! HTTP client for the authorization backend's device-flow endpoints.

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Result, StowageError};
use crate::session::Session;

const DEFAULT_DEVICE_CODE_URL: &str = "https://openapi.baidu.com/oauth/2.0/device/code";
const DEFAULT_TOKEN_URL: &str = "https://openapi.baidu.com/oauth/2.0/token";

/// Client for the storage provider's OAuth device-flow endpoints.
///
/// # Example
/// ```no_run
/// use stowage::auth::AuthBackend;
///
/// # async fn example() -> stowage::Result<()> {
/// let backend = AuthBackend::new("client-id", "client-secret");
/// let grant = backend.user_and_device_code("netdisk").await?;
/// println!("visit {} and enter {}", grant.verification_url, grant.user_code);
/// # Ok(())
/// # }
/// ```
pub struct AuthBackend {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    device_code_url: String,
    token_url: String,
}

impl AuthBackend {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Request a (user code, device code, verification url) triple scoped to
    /// the storage product.
    pub async fn user_and_device_code(&self, product: &str) -> Result<DeviceCodeGrant> {
        let resp = self
            .client
            .post(&self.device_code_url)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("response_type", "device_code"),
                ("scope", product),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(StowageError::InvalidResponse(format!(
                "Device code request failed with status {}",
                resp.status()
            )));
        }
        let payload: DeviceCodeResponse = resp.json().await?;
        Ok(DeviceCodeGrant {
            device_code: payload.device_code,
            user_code: payload.user_code,
            verification_url: payload.verification_url,
            expires_in: payload.expires_in,
            interval: payload.interval,
        })
    }

    /// Exchange an authorized device code for a fresh session.
    pub async fn exchange_device_code(&self, device_code: &str) -> Result<Session> {
        let resp = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "device_token"),
                ("code", device_code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(StowageError::InvalidResponse(format!(
                "Device token exchange failed with status {}",
                resp.status()
            )));
        }
        let payload: TokenResponse = resp.json().await?;
        if let Some(error) = payload.error {
            return Err(StowageError::InvalidResponse(format!(
                "Device token exchange rejected: {error}"
            )));
        }
        payload.into_session()
    }

    /// Trade a refresh token for a new session.
    ///
    /// `Ok(None)` means the backend answered with an OAuth error — the
    /// refresh token is no longer good. Transport failures and unparseable
    /// bodies are `Err`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Option<Session>> {
        let resp = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            let payload: TokenResponse = serde_json::from_str(&body)?;
            if let Some(error) = payload.error {
                warn!(error = %error, "refresh exchange rejected");
                return Ok(None);
            }
            return payload.into_session().map(Some);
        }

        // Providers signal a dead refresh token as a 4xx with an OAuth error
        // body; anything else is a backend fault.
        if status.is_client_error() {
            if let Ok(payload) = serde_json::from_str::<TokenResponse>(&body) {
                if let Some(error) = payload.error {
                    warn!(error = %error, "refresh exchange rejected");
                    return Ok(None);
                }
            }
        }
        Err(StowageError::InvalidResponse(format!(
            "Refresh request failed with status {status}"
        )))
    }
}

/// One device-flow grant, as returned by the device-code endpoint.
#[derive(Debug, Clone)]
pub struct DeviceCodeGrant {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    pub expires_in: u64,
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    #[serde(alias = "verification_uri")]
    verification_url: String,
    expires_in: u64,
    interval: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TokenResponse {
    fn into_session(self) -> Result<Session> {
        let access_token = self.access_token.ok_or_else(|| {
            StowageError::InvalidResponse("Token response missing access_token".to_string())
        })?;
        let now = Utc::now();
        Ok(Session {
            access_token,
            refresh_token: self.refresh_token,
            obtained_at: now,
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            metadata: self.extra,
        })
    }
}
