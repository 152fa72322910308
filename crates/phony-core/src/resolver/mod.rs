//! Symbol resolution seam.
//!
//! The generator never type-checks sources itself. It asks a
//! [`SymbolResolver`] for packages and looks names up in their scopes.

mod manifest;

pub use manifest::{ManifestResolver, PackageManifest};

use std::collections::BTreeMap;

use crate::error::Result;
use crate::types::TypeDecl;

/// Loads packages and exposes their top-level scopes.
pub trait SymbolResolver {
    /// Load every package matching `pattern`, in resolver order.
    fn load(&self, pattern: &str) -> Result<Vec<Package>>;
}

/// A loaded package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Import path.
    pub path: String,
    /// Declared package name.
    pub name: String,
    /// Top-level scope, absent when the package carries no type information.
    pub scope: Option<Scope>,
}

/// Top-level declarations of a package, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    decls: BTreeMap<String, TypeDecl>,
}

impl Scope {
    /// Build a scope from declarations. Later duplicates replace earlier ones.
    pub fn new(decls: impl IntoIterator<Item = TypeDecl>) -> Self {
        Self {
            decls: decls
                .into_iter()
                .map(|decl| (decl.name.clone(), decl))
                .collect(),
        }
    }

    /// Find the declaration for `name`.
    pub fn lookup(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.get(name)
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the scope declares nothing.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Strip any vendoring prefix from an import path.
pub fn devendor(path: &str) -> &str {
    let path = path.trim();
    if let Some(i) = path.rfind("/vendor/") {
        return &path[i + "/vendor/".len()..];
    }
    path.strip_prefix("vendor/").unwrap_or(path)
}
