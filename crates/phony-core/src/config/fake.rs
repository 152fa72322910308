use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::OutputConfig;

/// One `[[fakes]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FakeTarget {
    /// Interface to fake.
    pub interface: String,

    /// Import path (or `prefix/...` pattern) to search for the interface.
    pub package: String,

    /// Generated type name. Defaults to `Fake<Interface>`.
    #[serde(default)]
    pub name: Option<String>,

    /// Output file. Defaults to `<output.dir>/<snake_case(name)>.go`.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Package clause override for this fake.
    #[serde(default)]
    pub destination_package: Option<String>,

    /// Import path of this fake's destination package.
    #[serde(default)]
    pub destination_path: Option<String>,
}

impl FakeTarget {
    /// Name of the generated type.
    pub fn fake_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Fake{}", self.interface))
    }

    /// Destination file for this fake.
    pub fn output_path(&self, output: &OutputConfig) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            output
                .dir
                .join(format!("{}.go", to_snake_case(&self.fake_name())))
        })
    }

    /// Package clause for this fake.
    pub fn destination_package<'a>(&'a self, output: &'a OutputConfig) -> &'a str {
        self.destination_package
            .as_deref()
            .unwrap_or(output.package.as_str())
    }

    /// Import path of the package this fake is written into, if known.
    ///
    /// The shared `[output] destination_path` only describes fakes that land
    /// in the shared package, so it is ignored once a fake overrides its
    /// package or output file.
    pub fn destination_path<'a>(&'a self, output: &'a OutputConfig) -> Option<&'a str> {
        if let Some(path) = self.destination_path.as_deref() {
            return Some(path);
        }
        if self.destination_package.is_some() || self.output.is_some() {
            return None;
        }
        output.destination_path.as_deref()
    }
}

/// Convert a Go identifier to snake_case, keeping acronyms together.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map(|n| n.is_lowercase()).unwrap_or(false),
                _ => false,
            };
            if boundary {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
