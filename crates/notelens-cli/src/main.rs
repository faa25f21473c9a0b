mod cli;
mod config;
mod report;
mod seal;
mod tui;

use clap::Parser;
use color_eyre::Result;
use notelens_vault::sealed::SealedNoteFile;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the dashboard and report commands.
fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command.unwrap_or(cli::Command::Dash { data: None }) {
        cli::Command::Dash { data } => {
            let source = sealed_source(data, &config);
            tui::launch(&source)?
        }
        cli::Command::Report { key, data } => {
            let source = sealed_source(data, &config);
            report::run(&source, key)?
        }
        cli::Command::Seal { input, output, key } => {
            let output = config::resolve_data_path(output, &config);
            seal::run(&input, &output, key)?
        }
        cli::Command::Version => print_version(),
        cli::Command::Config(cli::ConfigCommand::Init) => init_config(&config)?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn sealed_source(data: Option<std::path::PathBuf>, config: &config::Config) -> SealedNoteFile {
    let path = config::resolve_data_path(data, config);
    debug!(?path, "using sealed dataset");
    SealedNoteFile::new(path)
}

fn print_version() {
    println!("notelens {}", env!("CARGO_PKG_VERSION"));
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}
