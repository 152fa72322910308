use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::{devendor, Package, Scope, SymbolResolver};
use crate::error::{PhonyError, Result};
use crate::types::TypeDecl;

/// Serialized description of one type-checked package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Import path.
    pub path: String,

    /// Declared package name.
    pub name: String,

    /// Top-level type declarations. `None` when the package was not type-checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<TypeDecl>>,

    /// Load or type-check errors reported for the package.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl PackageManifest {
    /// Create a manifest with the given declarations.
    pub fn new(path: impl Into<String>, name: impl Into<String>, types: Vec<TypeDecl>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            types: Some(types),
            errors: Vec::new(),
        }
    }

    fn to_package(&self) -> Result<Package> {
        if !self.errors.is_empty() {
            return Err(PhonyError::Resolution(format!(
                "package {} failed to load: {}",
                self.path,
                self.errors.join("; ")
            )));
        }

        Ok(Package {
            path: devendor(&self.path).to_string(),
            name: self.name.clone(),
            scope: self.types.clone().map(Scope::new),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    One(PackageManifest),
    Many(Vec<PackageManifest>),
}

/// Resolver backed by JSON package manifests.
///
/// Patterns are either an exact import path or `prefix/...`, which matches
/// the prefix itself and every package beneath it.
#[derive(Debug, Clone, Default)]
pub struct ManifestResolver {
    packages: BTreeMap<String, PackageManifest>,
}

impl ManifestResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver from manifests.
    pub fn from_manifests(manifests: impl IntoIterator<Item = PackageManifest>) -> Self {
        let mut resolver = Self::new();
        for manifest in manifests {
            resolver.add(manifest);
        }
        resolver
    }

    /// Load every `*.json` manifest found under `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(PhonyError::Config(format!(
                "manifest directory not found: {}",
                dir.display()
            )));
        }

        let mut resolver = Self::new();
        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
        {
            let content = std::fs::read_to_string(entry.path())?;
            let file: ManifestFile = serde_json::from_str(&content).map_err(|e| {
                PhonyError::Serialization(format!("{}: {}", entry.path().display(), e))
            })?;
            match file {
                ManifestFile::One(manifest) => resolver.add(manifest),
                ManifestFile::Many(manifests) => manifests.into_iter().for_each(|m| resolver.add(m)),
            }
        }

        tracing::debug!(dir = ?dir, packages = resolver.len(), "Loaded package manifests");
        Ok(resolver)
    }

    /// Register a manifest, replacing any with the same devendored path.
    pub fn add(&mut self, manifest: PackageManifest) {
        self.packages
            .insert(devendor(&manifest.path).to_string(), manifest);
    }

    /// Number of known packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether no packages are known.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl SymbolResolver for ManifestResolver {
    fn load(&self, pattern: &str) -> Result<Vec<Package>> {
        let pattern = devendor(pattern);

        if let Some(prefix) = pattern.strip_suffix("/...") {
            let nested = format!("{}/", prefix);
            let matched: Vec<&PackageManifest> = self
                .packages
                .iter()
                .filter(|(path, _)| path.as_str() == prefix || path.starts_with(&nested))
                .map(|(_, manifest)| manifest)
                .collect();
            if matched.is_empty() {
                return Err(PhonyError::Resolution(format!(
                    "no packages match {}",
                    pattern
                )));
            }
            return matched.into_iter().map(PackageManifest::to_package).collect();
        }

        match self.packages.get(pattern) {
            Some(manifest) => Ok(vec![manifest.to_package()?]),
            None => Err(PhonyError::Resolution(format!(
                "cannot load package {}",
                pattern
            ))),
        }
    }
}
