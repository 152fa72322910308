use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use phony_codegen::GenerateRequest;
use phony_core::{ManifestResolver, PhonyConfig};
use tracing::info;

use super::format::GoFormatter;
use super::{init_tracing, read_header, write_source};

/// Generate every fake listed in a config file.
#[derive(Parser)]
pub struct RunCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "phony.toml")]
    pub config: PathBuf,

    /// Skip the Go formatter (overrides config).
    #[arg(long)]
    pub no_format: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunCommand {
    /// Execute the run command.
    pub async fn execute(self) -> Result<()> {
        if !self.config.exists() {
            anyhow::bail!(
                "Configuration file not found: {}\nRun `phony init` to create one.",
                self.config.display()
            );
        }

        let config = PhonyConfig::from_file(&self.config)?;
        init_tracing(if self.verbose {
            "debug"
        } else {
            config.logging.level.as_str()
        });
        info!("Loaded configuration from {}", self.config.display());

        let written = generate_all(&config, !self.no_format && config.output.format).await?;

        println!();
        println!(
            "  {} Generated {} fakes",
            style("✓").green(),
            style(written.len()).cyan()
        );
        for path in &written {
            println!("    {}", style(path.display()).dim());
        }
        println!();

        Ok(())
    }
}

/// Generate every configured fake, stopping at the first failure.
async fn generate_all(config: &PhonyConfig, format: bool) -> Result<Vec<PathBuf>> {
    let resolver = ManifestResolver::from_dir(&config.resolver.manifests)?;
    let header = read_header(config.output.header.as_deref())?;
    let formatter = GoFormatter::new(&config.output.gofmt);

    let pb = ProgressBar::new(config.fakes.len() as u64);
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut written = Vec::with_capacity(config.fakes.len());
    for target in &config.fakes {
        let name = target.fake_name();
        pb.set_message(format!("Generating {}...", name));

        let mut request = GenerateRequest::new(&target.interface, &target.package)
            .fake_name(&name)
            .destination_package(target.destination_package(&config.output));
        if let Some(path) = target.destination_path(&config.output) {
            request = request.destination_path(path);
        }
        if let Some(header) = &header {
            request = request.header(header);
        }

        let source = match phony_codegen::generate(&request, &resolver) {
            Ok(source) => source,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e).with_context(|| {
                    format!("Failed to generate {} for {}", name, target.interface)
                });
            }
        };
        let source = if format {
            formatter.format(&source).await
        } else {
            source
        };

        let path = target.output_path(&config.output);
        write_source(&path, &source)?;
        written.push(path);
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(written)
}
