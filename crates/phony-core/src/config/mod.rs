mod fake;
mod output;

pub use fake::FakeTarget;
pub use output::OutputConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PhonyError, Result};

/// Root configuration, usually read from `phony.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhonyConfig {
    /// Where package manifests come from.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Output settings shared by every fake.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fakes to generate.
    #[serde(default)]
    pub fakes: Vec<FakeTarget>,
}

impl PhonyConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PhonyError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);

        let config: Self = toml::from_str(&content)
            .map_err(|e| PhonyError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every fake names an interface and a package.
    pub fn validate(&self) -> Result<()> {
        for (i, fake) in self.fakes.iter().enumerate() {
            if fake.interface.trim().is_empty() {
                return Err(PhonyError::Config(format!(
                    "fakes[{}]: interface must not be empty",
                    i
                )));
            }
            if fake.package.trim().is_empty() {
                return Err(PhonyError::Config(format!(
                    "fakes[{}] ({}): package must not be empty",
                    i, fake.interface
                )));
            }
        }
        Ok(())
    }
}

/// Symbol resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Directory scanned for JSON package manifests.
    #[serde(default = "default_manifests")]
    pub manifests: PathBuf,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            manifests: default_manifests(),
        }
    }
}

fn default_manifests() -> PathBuf {
    PathBuf::from("phony/packages")
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}
