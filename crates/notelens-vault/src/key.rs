use std::fmt;

use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    Engine as _,
};
use notelens_core::source::LoadError;
use rand::{rngs::OsRng, RngCore};

pub const KEY_LEN: usize = 32;

/// 256-bit symmetric key for a sealed dataset, supplied by the user at
/// load time and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct DatasetKey {
    bytes: [u8; KEY_LEN],
}

impl DatasetKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Parse a URL-safe base64 encoding of 32 bytes, with or without
    /// padding. Surrounding whitespace is tolerated.
    pub fn parse(encoded: &str) -> Result<Self, LoadError> {
        let trimmed = encoded.trim();
        let bytes = URL_SAFE
            .decode(trimmed)
            .or_else(|_| URL_SAFE_NO_PAD.decode(trimmed))
            .map_err(|err| LoadError::InvalidKey {
                reason: err.to_string(),
            })?;

        if bytes.len() != KEY_LEN {
            return Err(LoadError::InvalidKey {
                reason: format!("expected {KEY_LEN} bytes, got {}", bytes.len()),
            });
        }

        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self { bytes: out })
    }

    pub fn encode(&self) -> String {
        URL_SAFE.encode(self.bytes)
    }

    pub(crate) fn bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

// Never expose key bytes through Debug output or logs.
impl fmt::Debug for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DatasetKey(..)")
    }
}
