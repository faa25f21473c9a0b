use thiserror::Error;

use crate::model::NoteTable;

/// Errors produced by a dataset load attempt. All variants are non-fatal;
/// callers surface them and let the user retry with a corrected key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// Key is not a URL-safe base64 encoding of 256 bits.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },
    /// Dataset file is missing, unreadable, or its envelope is corrupt.
    #[error("dataset unreadable at {path}: {reason}")]
    Unreadable { path: String, reason: String },
    /// Wrong key, or tampered/corrupted ciphertext. Reported without
    /// detail; the cipher does not distinguish the two.
    #[error("authentication failed")]
    AuthenticationFailed,
    /// Decrypted plaintext is not a valid note table.
    #[error("malformed dataset: {reason}")]
    Malformed { reason: String },
}

/// Contract for anything that can produce a note table from a
/// user-supplied key. One idempotent request/response operation; the
/// implementation must never panic on a bad key or a bad file.
pub trait NoteSource {
    fn load(&self, key: &str) -> Result<NoteTable, LoadError>;
}

/// In-memory source that simulates key-gated decryption for tests and
/// smoke runs. Not cryptographically meaningful; the production
/// implementation lives in `notelens-vault`.
#[derive(Debug, Clone)]
pub struct InMemoryNoteSource {
    key: String,
    table: NoteTable,
}

impl InMemoryNoteSource {
    pub fn new(key: impl Into<String>, table: NoteTable) -> Self {
        Self {
            key: key.into(),
            table,
        }
    }
}

impl NoteSource for InMemoryNoteSource {
    fn load(&self, key: &str) -> Result<NoteTable, LoadError> {
        if key == self.key {
            Ok(self.table.clone())
        } else {
            Err(LoadError::AuthenticationFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NoteRecord, Quality};

    fn sample_table() -> NoteTable {
        NoteTable::new(vec![NoteRecord {
            quality: Quality::Good,
            commenter: "Jane Doe".into(),
            action_stages: vec!["Submitted".into()],
        }])
        .expect("valid table")
    }

    #[test]
    fn matching_key_returns_the_table() {
        let source = InMemoryNoteSource::new("open-sesame", sample_table());
        let table = source.load("open-sesame").expect("load");
        assert_eq!(table, sample_table());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let source = InMemoryNoteSource::new("open-sesame", sample_table());
        let err = source.load("wrong").expect_err("should fail");
        assert_eq!(err, LoadError::AuthenticationFailed);
    }

    #[test]
    fn repeated_loads_are_value_equal() {
        let source = InMemoryNoteSource::new("k", sample_table());
        let first = source.load("k").expect("first load");
        let second = source.load("k").expect("second load");
        assert_eq!(first, second);
    }
}
