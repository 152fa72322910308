use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

const STARTER_CONFIG: &str = r#"# phony configuration

[resolver]
# Directory of JSON package manifests describing the packages to fake.
manifests = "phony/packages"

[output]
dir = "fakes"
package = "fakes"
format = true
gofmt = "gofmt"
# header = "phony/header.txt"

[logging]
level = "info"

# [[fakes]]
# interface = "Getter"
# package = "example.com/app/store"
# name = "FakeGetter"
"#;

/// Write a starter phony.toml.
#[derive(Parser)]
pub struct InitCommand {
    /// Where to write the config.
    #[arg(short, long, default_value = "phony.toml")]
    pub config: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(self) -> Result<()> {
        if self.config.exists() && !self.force {
            anyhow::bail!(
                "{} already exists. Use --force to overwrite it.",
                self.config.display()
            );
        }

        std::fs::write(&self.config, STARTER_CONFIG)?;
        println!(
            "{} Created {}",
            style("✓").green(),
            style(self.config.display()).cyan()
        );
        Ok(())
    }
}
