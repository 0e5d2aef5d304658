//! Textual envelope for cached sessions.
//!
//! Cache files may cross filesystem boundaries or get copied around with the
//! rest of a backup host's state, so the envelope is base64 over JSON:
//! binary-safe and immune to line-ending rewrites.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::Session;
use crate::error::{Result, StowageError};

const ENVELOPE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    session: Session,
}

/// Encode a session into its cache-file form.
pub fn encode(session: &Session) -> Result<String> {
    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        session: session.clone(),
    };
    let json = serde_json::to_vec(&envelope)?;
    Ok(STANDARD.encode(json))
}

/// Decode a cache-file envelope back into a session.
///
/// Tolerates surrounding whitespace; everything else about the envelope must
/// be exact, including the version.
pub fn decode(raw: &str) -> Result<Session> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|err| StowageError::CacheCorrupt(format!("not valid base64: {err}")))?;
    let envelope: Envelope = serde_json::from_slice(&bytes)
        .map_err(|err| StowageError::CacheCorrupt(format!("not a session envelope: {err}")))?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(StowageError::CacheCorrupt(format!(
            "unsupported envelope version {}",
            envelope.version
        )));
    }
    Ok(envelope.session)
}
