mod format;
mod generate;
mod init;
mod run;

pub use generate::GenerateCommand;
pub use init::InitCommand;
pub use run::RunCommand;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// phony - generate concurrency-safe Go fakes for interfaces
#[derive(Parser)]
#[command(name = "phony")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a single fake.
    Generate(GenerateCommand),

    /// Generate every fake listed in a config file.
    Run(RunCommand),

    /// Write a starter phony.toml.
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate(cmd) => cmd.execute().await,
            Commands::Run(cmd) => cmd.execute().await,
            Commands::Init(cmd) => cmd.execute(),
        }
    }
}

/// Install the fmt subscriber on stderr; stdout may carry generated source.
fn init_tracing(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read a header file, if one is configured.
fn read_header(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read header file {}", p.display()))
    })
    .transpose()
}

/// Write generated source, creating parent directories.
fn write_source(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, source)
        .with_context(|| format!("Failed to write {}", path.display()))
}
