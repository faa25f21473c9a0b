use serde::{Deserialize, Serialize};

use crate::source::LoadError;

/// Quality label assigned to a recruiter note.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Good,
    Ok,
    Bad,
}

impl Quality {
    /// Display order used by every chart and report.
    pub const ORDERED: [Quality; 3] = [Quality::Good, Quality::Ok, Quality::Bad];

    pub fn label(&self) -> &'static str {
        match self {
            Quality::Good => "good",
            Quality::Ok => "ok",
            Quality::Bad => "bad",
        }
    }
}

/// One recruiter note. Extra columns in the serialized form are ignored;
/// missing or ill-typed required columns reject the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteRecord {
    pub quality: Quality,
    pub commenter: String,
    /// Pipeline stages the note is attached to. Rows without stages are
    /// counted in the distribution but skipped by the stage chart.
    #[serde(default)]
    pub action_stages: Vec<String>,
}

/// In-memory note table. Built only through [`NoteTable::from_json`] or
/// [`NoteTable::new`], which enforce the schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct NoteTable {
    rows: Vec<NoteRecord>,
}

impl NoteTable {
    /// Validate and wrap already-constructed rows.
    pub fn new(rows: Vec<NoteRecord>) -> Result<Self, LoadError> {
        let table = Self { rows };
        table.validate()?;
        Ok(table)
    }

    /// Parse a JSON array of rows and enforce the schema: every row needs
    /// a known quality label, a non-empty commenter, and (if present) a
    /// list of non-empty stage names.
    pub fn from_json(bytes: &[u8]) -> Result<Self, LoadError> {
        let rows: Vec<NoteRecord> =
            serde_json::from_slice(bytes).map_err(|err| LoadError::Malformed {
                reason: err.to_string(),
            })?;
        Self::new(rows)
    }

    pub fn rows(&self) -> &[NoteRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn validate(&self) -> Result<(), LoadError> {
        for (index, row) in self.rows.iter().enumerate() {
            if row.commenter.trim().is_empty() {
                return Err(LoadError::Malformed {
                    reason: format!("row {index}: empty commenter"),
                });
            }
            if row.action_stages.iter().any(|s| s.trim().is_empty()) {
                return Err(LoadError::Malformed {
                    reason: format!("row {index}: empty action stage name"),
                });
            }
        }
        Ok(())
    }
}
