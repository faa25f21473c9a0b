use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI surface definition. The dashboard is the default when no
/// subcommand is given.
#[derive(Parser, Debug)]
#[command(
    name = "notelens",
    about = "Terminal dashboard for recruiter note-quality analytics",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to launching the dashboard when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch the interactive dashboard (press q or Esc to exit).
    Dash {
        /// Path to the sealed dataset (overrides config).
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Print the note-quality report to stdout.
    Report {
        /// URL-safe base64 encryption key; falls back to NOTELENS_DATA_KEY.
        #[arg(long)]
        key: Option<String>,
        /// Path to the sealed dataset (overrides config).
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Encrypt a plaintext JSON dataset into a sealed file.
    Seal {
        /// Plaintext dataset: a JSON array of note rows.
        #[arg(long)]
        input: PathBuf,
        /// Destination for the sealed file (defaults to the dataset path).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Key to seal under; a fresh key is generated and printed when absent.
        #[arg(long)]
        key: Option<String>,
    },
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
