use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;
use phony_codegen::{FakeSpec, GenerateRequest};
use phony_core::ManifestResolver;

use super::format::GoFormatter;
use super::{init_tracing, read_header, write_source};

/// Generate a single fake.
#[derive(Parser)]
pub struct GenerateCommand {
    /// Import path declaring the interface (`prefix/...` searches beneath it).
    pub package: String,

    /// Interface to fake.
    pub interface: String,

    /// Name of the generated type (defaults to Fake<Interface>).
    #[arg(long)]
    pub fake_name: Option<String>,

    /// Package clause of the generated file.
    #[arg(short = 'p', long = "package", default_value = "fakes")]
    pub destination_package: String,

    /// Import path of the destination package, if the fake lives inside a known package.
    #[arg(long)]
    pub destination_path: Option<String>,

    /// Output file (prints to stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory of JSON package manifests.
    #[arg(short, long, default_value = "phony/packages")]
    pub manifests: PathBuf,

    /// File whose contents are placed above the generated-code marker.
    #[arg(long)]
    pub header: Option<PathBuf>,

    /// Skip the Go formatter.
    #[arg(long)]
    pub no_format: bool,

    /// Formatter program.
    #[arg(long, default_value = "gofmt")]
    pub gofmt: String,

    /// Print the resolved model as JSON instead of Go source.
    #[arg(long)]
    pub model: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateCommand {
    /// Execute the generate command.
    pub async fn execute(self) -> Result<()> {
        init_tracing(if self.verbose { "debug" } else { "info" });

        let resolver = ManifestResolver::from_dir(&self.manifests)?;
        let request = self.request()?;

        if self.model {
            let spec = FakeSpec::build(&request, &resolver)?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
            return Ok(());
        }

        let source = phony_codegen::generate(&request, &resolver)?;
        let source = if self.no_format {
            source
        } else {
            GoFormatter::new(&self.gofmt).format(&source).await
        };

        match &self.output {
            Some(path) => {
                write_source(path, &source)?;
                eprintln!(
                    "  {} Wrote {} to {}",
                    style("✓").green(),
                    style(&request.fake_name).cyan(),
                    path.display()
                );
            }
            None => print!("{}", source),
        }

        Ok(())
    }

    fn request(&self) -> Result<GenerateRequest> {
        let mut request = GenerateRequest::new(&self.interface, &self.package)
            .destination_package(&self.destination_package);
        if let Some(name) = &self.fake_name {
            request = request.fake_name(name);
        }
        if let Some(path) = &self.destination_path {
            request = request.destination_path(path);
        }
        if let Some(header) = read_header(self.header.as_deref())? {
            request = request.header(header);
        }
        Ok(request)
    }
}
