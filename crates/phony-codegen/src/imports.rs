//! Import bookkeeping for a generated file.

use std::collections::{BTreeMap, BTreeSet};

use phony_core::devendor;
use serde::Serialize;

/// One imported package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    /// Name the package is referenced by in the generated file.
    pub alias: String,
    /// Devendored import path.
    pub path: String,
}

/// Ordered set of imports, unique by path.
///
/// Aliases may collide until [`ImportRegistry::disambiguate`] runs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ImportRegistry {
    imports: Vec<Import>,
}

impl ImportRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` under `alias`. Returns the existing entry if the
    /// devendored path is already known, whatever its alias.
    pub fn add(&mut self, alias: &str, path: &str) -> Import {
        let path = devendor(path);
        let alias = alias.trim();
        tracing::debug!(alias, path, "Adding import");

        if let Some(existing) = self.imports.iter().find(|i| i.path == path) {
            return existing.clone();
        }

        let import = Import {
            alias: alias.to_string(),
            path: path.to_string(),
        };
        self.imports.push(import.clone());
        import
    }

    /// Current alias for `path`.
    pub fn alias_for(&self, path: &str) -> Option<&str> {
        let path = devendor(path);
        self.imports
            .iter()
            .find(|i| i.path == path)
            .map(|i| i.alias.as_str())
    }

    /// Iterate imports in their current order.
    pub fn iter(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter()
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Whether any alias is shared by more than one path.
    pub fn has_duplicate_aliases(&self) -> bool {
        self.alias_groups().values().any(|group| group.len() > 1)
    }

    /// Sort by path, then suffix colliding aliases until every alias is unique.
    ///
    /// Within a group sharing an alias the first path keeps it and the rest
    /// get `a`, `b`, ... appended in path order. Suffixing can introduce new
    /// collisions with existing aliases, so groups are recomputed until none
    /// remain.
    pub fn disambiguate(&mut self) {
        self.disambiguate_reserving(&BTreeSet::new());
    }

    /// Like [`ImportRegistry::disambiguate`], but no import may keep an alias
    /// found in `reserved`. Every member of such a group is suffixed.
    pub fn disambiguate_reserving(&mut self, reserved: &BTreeSet<String>) {
        self.imports.sort_by(|a, b| a.path.cmp(&b.path));
        if !self.has_conflicts(reserved) {
            return;
        }

        tracing::warn!("Duplicate or reserved import aliases found, disambiguating");
        self.log_aliases("before disambiguation");

        while self.has_conflicts(reserved) {
            for (alias, group) in self.alias_groups() {
                let keep = if reserved.contains(&alias) { 0 } else { 1 };
                for (position, &index) in group.iter().enumerate().skip(keep) {
                    let suffix = alias_suffix(position - keep);
                    self.imports[index].alias.push_str(&suffix);
                }
            }
        }

        self.log_aliases("after disambiguation");
    }

    fn has_conflicts(&self, reserved: &BTreeSet<String>) -> bool {
        self.alias_groups()
            .iter()
            .any(|(alias, group)| group.len() > 1 || reserved.contains(alias))
    }

    /// Indices of imports sharing each alias, in current list order.
    fn alias_groups(&self) -> BTreeMap<String, Vec<usize>> {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, import) in self.imports.iter().enumerate() {
            groups.entry(import.alias.clone()).or_default().push(index);
        }
        groups
    }

    fn log_aliases(&self, stage: &str) {
        for import in &self.imports {
            tracing::debug!(stage, alias = %import.alias, path = %import.path, "Import alias");
        }
    }
}

/// Letter suffix for the n-th renamed member of a group: a..z, aa, ab, ...
fn alias_suffix(n: usize) -> String {
    let mut n = n + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn aliases(registry: &ImportRegistry) -> Vec<(&str, &str)> {
        registry
            .iter()
            .map(|i| (i.alias.as_str(), i.path.as_str()))
            .collect()
    }

    #[test]
    fn test_add_is_idempotent_by_path() {
        let mut registry = ImportRegistry::new();
        registry.add("foo", "example.com/foo");
        let second = registry.add("bar", "example.com/foo");
        registry.add("foo", "example.com/app/vendor/example.com/foo");

        assert_eq!(registry.len(), 1);
        assert_eq!(second.alias, "foo");
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut registry = ImportRegistry::new();
        registry.add("zeta", "z/zeta");
        registry.add("alpha", "a/alpha");
        assert_eq!(aliases(&registry), vec![("zeta", "z/zeta"), ("alpha", "a/alpha")]);
    }

    #[test]
    fn test_disambiguate_sorts_without_renaming() {
        let mut registry = ImportRegistry::new();
        registry.add("sync", "sync");
        registry.add("io", "io");
        registry.disambiguate();
        assert_eq!(aliases(&registry), vec![("io", "io"), ("sync", "sync")]);
    }

    #[test]
    fn test_disambiguate_suffixes_in_path_order() {
        let mut registry = ImportRegistry::new();
        registry.add("foo", "example.com/z/foo");
        registry.add("foo", "example.com/a/foo");
        registry.add("foo", "example.com/m/foo");
        registry.disambiguate();

        assert_eq!(
            aliases(&registry),
            vec![
                ("foo", "example.com/a/foo"),
                ("fooa", "example.com/m/foo"),
                ("foob", "example.com/z/foo"),
            ]
        );
    }

    #[test]
    fn test_disambiguate_resolves_cascading_collisions() {
        let mut registry = ImportRegistry::new();
        registry.add("foo", "x/foo");
        registry.add("foo", "y/foo");
        registry.add("fooa", "z/fooa");
        registry.disambiguate();

        assert!(!registry.has_duplicate_aliases());
        assert_eq!(
            aliases(&registry),
            vec![("foo", "x/foo"), ("fooa", "y/foo"), ("fooaa", "z/fooa")]
        );
    }

    #[test]
    fn test_disambiguate_many_collisions() {
        let mut registry = ImportRegistry::new();
        for i in 0..60 {
            registry.add("pkg", &format!("example.com/p{:02}/pkg", i));
        }
        let paths_before: HashSet<String> = registry.iter().map(|i| i.path.clone()).collect();

        registry.disambiguate();

        let unique: HashSet<&str> = registry.iter().map(|i| i.alias.as_str()).collect();
        assert_eq!(unique.len(), 60);
        let paths_after: HashSet<String> = registry.iter().map(|i| i.path.clone()).collect();
        assert_eq!(paths_before, paths_after);
        assert_eq!(registry.alias_for("example.com/p27/pkg"), Some("pkgaa"));
    }

    #[test]
    fn test_disambiguate_reserved_aliases() {
        let mut registry = ImportRegistry::new();
        registry.add("i", "example.com/i");
        registry.add("i", "example.com/other/i");
        registry.add("ia", "example.com/ia");
        registry.add("sync", "sync");
        let reserved: BTreeSet<String> = ["i", "stub"].iter().map(|s| s.to_string()).collect();

        registry.disambiguate_reserving(&reserved);

        assert_eq!(
            aliases(&registry),
            vec![
                ("ia", "example.com/i"),
                ("iaa", "example.com/ia"),
                ("ib", "example.com/other/i"),
                ("sync", "sync"),
            ]
        );
    }

    #[test]
    fn test_alias_suffix() {
        assert_eq!(alias_suffix(0), "a");
        assert_eq!(alias_suffix(25), "z");
        assert_eq!(alias_suffix(26), "aa");
        assert_eq!(alias_suffix(27), "ab");
        assert_eq!(alias_suffix(26 + 26 * 26), "aaa");
    }
}
