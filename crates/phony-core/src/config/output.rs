use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output configuration shared by every generated fake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory fakes are written to unless a fake sets its own path.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Go package name of the generated files.
    #[serde(default = "default_package")]
    pub package: String,

    /// Import path of the destination package. Types declared there are not imported.
    #[serde(default)]
    pub destination_path: Option<String>,

    /// File whose contents are placed above the generated-code marker.
    #[serde(default)]
    pub header: Option<PathBuf>,

    /// Pipe output through the Go formatter.
    #[serde(default = "default_true")]
    pub format: bool,

    /// Formatter program.
    #[serde(default = "default_gofmt")]
    pub gofmt: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            package: default_package(),
            destination_path: None,
            header: None,
            format: true,
            gofmt: default_gofmt(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("fakes")
}

fn default_package() -> String {
    "fakes".to_string()
}

fn default_true() -> bool {
    true
}

fn default_gofmt() -> String {
    "gofmt".to_string()
}
