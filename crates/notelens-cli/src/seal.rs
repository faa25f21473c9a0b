use std::{fs, path::Path};

use color_eyre::Result;
use notelens_core::model::NoteTable;
use notelens_vault::{key::DatasetKey, sealed::SealedNoteFile};

/// Execute the seal subcommand: read a plaintext JSON dataset, validate
/// it against the note schema, and write the sealed file. Generates and
/// prints a fresh key when none is supplied.
pub fn run(input: &Path, output: &Path, key: Option<String>) -> Result<()> {
    let bytes = fs::read(input)
        .map_err(|err| color_eyre::eyre::eyre!("failed to read {}: {err}", input.display()))?;
    let table = NoteTable::from_json(&bytes).map_err(|err| color_eyre::eyre::eyre!("{err}"))?;

    let (dataset_key, generated) = match key {
        Some(encoded) => (
            DatasetKey::parse(&encoded).map_err(|err| color_eyre::eyre::eyre!("{err}"))?,
            false,
        ),
        None => (DatasetKey::generate(), true),
    };

    SealedNoteFile::new(output)
        .seal(&dataset_key, &table)
        .map_err(|err| color_eyre::eyre::eyre!("{err}"))?;

    println!("Sealed {} notes to {}", table.len(), output.display());
    if generated {
        println!(
            "Encryption key (save it, it is not stored): {}",
            dataset_key.encode()
        );
    }
    Ok(())
}
