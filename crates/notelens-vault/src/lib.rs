//! Sealed dataset files: AES-256-GCM encryption at rest with
//! user-supplied keys. Implements the `NoteSource` loading contract.

pub mod key;
pub mod sealed;
