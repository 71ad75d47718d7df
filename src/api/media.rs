use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::SyncError;

/// Image bytes for a new post, carried base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    base64: String,
}

impl MediaPayload {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
        }
    }

    /// Wrap an already-encoded payload after checking it decodes.
    pub fn from_base64(encoded: impl Into<String>) -> Result<Self, SyncError> {
        let base64 = encoded.into();
        STANDARD
            .decode(base64.as_bytes())
            .map_err(|e| SyncError::Decoding(format!("invalid media payload: {}", e)))?;
        Ok(Self { base64 })
    }

    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    pub fn is_empty(&self) -> bool {
        self.base64.is_empty()
    }
}
