use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use notelens_core::{
    model::NoteTable,
    source::{LoadError, NoteSource},
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::instrument;

use crate::key::DatasetKey;

const NONCE_LEN: usize = 12;

/// Errors produced when sealing a dataset to disk.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("failed to serialize dataset: {reason}")]
    Serialize { reason: String },
    #[error("encryption failed: {reason}")]
    Encrypt { reason: String },
    #[error("failed to write {path}: {reason}")]
    Io { path: String, reason: String },
}

/// AES-256-GCM sealed note dataset at a fixed path. The on-disk form is a
/// JSON envelope of base64 nonce and ciphertext; the plaintext is the
/// JSON-serialized note table.
pub struct SealedNoteFile {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    nonce: String,
    ciphertext: String,
}

impl SealedNoteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, authenticate, decrypt, and schema-check the dataset.
    /// Every failure maps to one `LoadError`; this never panics on a bad
    /// key or a bad file.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn open(&self, key: &DatasetKey) -> Result<NoteTable, LoadError> {
        let envelope = self.read_envelope()?;

        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(&envelope.nonce)
            .map_err(|err| self.corrupt(format!("nonce decode failed: {err}")))?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(self.corrupt(format!(
                "expected {NONCE_LEN}-byte nonce, got {}",
                nonce_bytes.len()
            )));
        }
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = URL_SAFE_NO_PAD
            .decode(&envelope.ciphertext)
            .map_err(|err| self.corrupt(format!("ciphertext decode failed: {err}")))?;

        let cipher = Aes256Gcm::new(key.bytes().into());
        let plaintext = cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| LoadError::AuthenticationFailed)?;

        NoteTable::from_json(&plaintext)
    }

    /// Seal a table under the key: the matching encryption routine for
    /// `open`. Writes the envelope atomically so readers never observe a
    /// partial file.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn seal(&self, key: &DatasetKey, table: &NoteTable) -> Result<(), SealError> {
        let plaintext = serde_json::to_vec(table).map_err(|err| SealError::Serialize {
            reason: err.to_string(),
        })?;
        self.seal_bytes(key, &plaintext)
    }

    fn seal_bytes(&self, key: &DatasetKey, plaintext: &[u8]) -> Result<(), SealError> {
        let cipher = Aes256Gcm::new(key.bytes().into());
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|err| SealError::Encrypt {
                reason: err.to_string(),
            })?;

        let envelope = Envelope {
            nonce: URL_SAFE_NO_PAD.encode(nonce.as_slice()),
            ciphertext: URL_SAFE_NO_PAD.encode(ciphertext),
        };
        self.write_envelope(&envelope)
    }

    fn read_envelope(&self) -> Result<Envelope, LoadError> {
        let bytes = fs::read(&self.path).map_err(|err| LoadError::Unreadable {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|err| self.corrupt(format!("envelope parse failed: {err}")))
    }

    fn write_envelope(&self, envelope: &Envelope) -> Result<(), SealError> {
        let parent = self.path.parent().ok_or_else(|| SealError::Io {
            path: self.path.display().to_string(),
            reason: "invalid output path".to_string(),
        })?;
        fs::create_dir_all(parent).map_err(|err| self.io_err(err))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|err| self.io_err(err))?;
        let json = serde_json::to_vec(envelope).map_err(|err| self.io_err(err))?;
        tmp.write_all(&json).map_err(|err| self.io_err(err))?;
        tmp.flush().map_err(|err| self.io_err(err))?;
        tmp.persist(&self.path).map_err(|err| self.io_err(err.error))?;
        Ok(())
    }

    fn corrupt(&self, reason: String) -> LoadError {
        LoadError::Unreadable {
            path: self.path.display().to_string(),
            reason: format!("corrupt envelope: {reason}"),
        }
    }

    fn io_err<E: ToString>(&self, err: E) -> SealError {
        SealError::Io {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl NoteSource for SealedNoteFile {
    fn load(&self, key: &str) -> Result<NoteTable, LoadError> {
        let key = DatasetKey::parse(key)?;
        self.open(&key)
    }
}

#[cfg(test)]
mod tests {
    use notelens_core::model::{NoteRecord, Quality};

    use super::*;

    fn sample_table() -> NoteTable {
        NoteTable::new(vec![
            NoteRecord {
                quality: Quality::Good,
                commenter: "Jane Doe".into(),
                action_stages: vec!["Submitted".into()],
            },
            NoteRecord {
                quality: Quality::Bad,
                commenter: "Sam Hill".into(),
                action_stages: vec!["Interview Scheduled".into(), "Placed".into()],
            },
        ])
        .expect("valid table")
    }

    fn sealed_in(dir: &Path) -> SealedNoteFile {
        SealedNoteFile::new(dir.join("notes.sealed"))
    }

    #[test]
    fn round_trip_seals_and_opens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        let key = DatasetKey::generate();

        file.seal(&key, &sample_table()).expect("seal");
        let opened = file.open(&key).expect("open");
        assert_eq!(opened, sample_table());

        // ensure plaintext is not present on disk
        let stored = fs::read_to_string(file.path()).expect("read envelope");
        assert!(!stored.contains("Jane"), "plaintext must not be stored");
    }

    #[test]
    fn opening_twice_yields_equal_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        let key = DatasetKey::generate();
        file.seal(&key, &sample_table()).expect("seal");

        let first = file.open(&key).expect("first open");
        let second = file.open(&key).expect("second open");
        assert_eq!(first, second);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        file.seal(&DatasetKey::generate(), &sample_table())
            .expect("seal");

        let err = file.open(&DatasetKey::generate()).expect_err("should fail");
        assert_eq!(err, LoadError::AuthenticationFailed);
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        let key = DatasetKey::generate();
        file.seal(&key, &sample_table()).expect("seal");

        let mut envelope: Envelope =
            serde_json::from_slice(&fs::read(file.path()).expect("read")).expect("parse");
        let mut ciphertext = URL_SAFE_NO_PAD.decode(&envelope.ciphertext).expect("decode");
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;
        envelope.ciphertext = URL_SAFE_NO_PAD.encode(ciphertext);
        fs::write(file.path(), serde_json::to_vec(&envelope).expect("encode")).expect("write");

        let err = file.open(&key).expect_err("should fail");
        assert_eq!(err, LoadError::AuthenticationFailed);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        let err = file
            .open(&DatasetKey::generate())
            .expect_err("should fail");
        assert!(matches!(err, LoadError::Unreadable { .. }));
    }

    #[test]
    fn corrupt_envelope_is_unreadable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        fs::write(file.path(), b"not an envelope").expect("write");

        let err = file
            .open(&DatasetKey::generate())
            .expect_err("should fail");
        assert!(matches!(err, LoadError::Unreadable { .. }));
    }

    #[test]
    fn garbage_plaintext_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        let key = DatasetKey::generate();
        file.seal_bytes(&key, b"not a table").expect("seal bytes");

        let err = file.open(&key).expect_err("should fail");
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[test]
    fn load_trait_parses_the_encoded_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        let key = DatasetKey::generate();
        file.seal(&key, &sample_table()).expect("seal");

        let table = file.load(&key.encode()).expect("load");
        assert_eq!(table, sample_table());

        let err = file.load("definitely not base64 of 32 bytes").expect_err("bad key");
        assert!(matches!(err, LoadError::InvalidKey { .. }));
    }

    #[test]
    fn single_row_scenario_round_trips_exactly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = sealed_in(dir.path());
        let key = DatasetKey::generate();
        let table = NoteTable::new(vec![NoteRecord {
            quality: Quality::Good,
            commenter: "Jane Doe".into(),
            action_stages: vec!["Submitted".into()],
        }])
        .expect("valid table");

        file.seal(&key, &table).expect("seal");
        let opened = file.open(&key).expect("open");
        assert_eq!(opened, table);
        assert_eq!(opened.rows()[0].commenter, "Jane Doe");
        assert_eq!(opened.rows()[0].quality, Quality::Good);
        assert_eq!(opened.rows()[0].action_stages, vec!["Submitted".to_string()]);
    }
}
