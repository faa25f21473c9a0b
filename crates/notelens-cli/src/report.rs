use color_eyre::Result;
use notelens_core::{
    model::{NoteTable, Quality},
    source::NoteSource,
    stats::{self, QualityCounts},
};

/// Environment fallback for the dataset key when `--key` is absent.
pub const KEY_ENV: &str = "NOTELENS_DATA_KEY";

/// Execute the report subcommand: resolve the key, load the dataset, and
/// print the three aggregations. A missing or blank key short-circuits
/// before any file access.
pub fn run(source: &dyn NoteSource, key: Option<String>) -> Result<()> {
    let Some(key) = resolve_key(key) else {
        color_eyre::eyre::bail!("Please provide the encryption key (--key or {KEY_ENV}).");
    };
    let table = source
        .load(key.trim())
        .map_err(|err| color_eyre::eyre::eyre!("Failed to decrypt data: {err}"))?;
    print!("{}", render(&table));
    Ok(())
}

/// Flag first, then the environment. A blank flag does not fall through
/// to the environment; it means the user supplied no key.
fn resolve_key(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var(KEY_ENV).ok())
        .filter(|key| !key.trim().is_empty())
}

fn render(table: &NoteTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("Loaded {} notes.\n\n", table.len()));

    let distribution = stats::quality_distribution(table);
    out.push_str("Note quality distribution\n");
    for quality in Quality::ORDERED {
        out.push_str(&format!(
            "  {:<6} {:>5}  ({})\n",
            quality.label(),
            distribution.get(quality),
            percentage(distribution.get(quality), distribution.total()),
        ));
    }

    let stages = stats::quality_by_stage(table);
    if !stages.is_empty() {
        out.push_str("\nQuality across action stages\n");
        for (stage, counts) in &stages {
            out.push_str(&format!("  {:<26}{}\n", stage, counts_line(counts)));
        }
    }

    let recruiters = stats::quality_by_recruiter(table);
    if !recruiters.is_empty() {
        out.push_str("\nNote quality per recruiter\n");
        for (recruiter, counts) in &recruiters {
            out.push_str(&format!("  {:<26}{}\n", recruiter, counts_line(counts)));
        }
    }

    out
}

fn counts_line(counts: &QualityCounts) -> String {
    format!(
        "good {:>4}  ok {:>4}  bad {:>4}",
        counts.good, counts.ok, counts.bad
    )
}

fn percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}
