//! Finding the target interface and flattening its method set.

use std::collections::{BTreeMap, HashSet};

use phony_core::{
    devendor, MethodDecl, Package, PhonyError, Result, SymbolResolver, TypeDecl, TypeDesc,
};

/// The declaration a fake is generated for.
#[derive(Debug, Clone)]
pub struct LocatedInterface {
    /// Declared name.
    pub name: String,
    /// Devendored import path of the declaring package.
    pub package_path: String,
    /// Declared name of the package, its default alias.
    pub package_name: String,
    pub decl: TypeDecl,
}

/// Find the first package, in resolver order, whose scope declares `name`.
pub fn locate_interface(packages: &[Package], name: &str) -> Result<LocatedInterface> {
    for package in packages {
        let Some(scope) = &package.scope else {
            tracing::debug!(package = %package.path, "Skipping package without type information");
            continue;
        };

        if let Some(decl) = scope.lookup(name) {
            if !decl.interface {
                tracing::debug!(name, package = %package.path, "Located type is not an interface");
            }
            return Ok(LocatedInterface {
                name: decl.name.clone(),
                package_path: devendor(&package.path).to_string(),
                package_name: package.name.clone(),
                decl: decl.clone(),
            });
        }
    }

    Err(PhonyError::NotFound(format!(
        "cannot find package with interface {}",
        name
    )))
}

/// Method set of the located declaration.
///
/// Own methods come first, then embedded interfaces depth-first. Duplicates
/// keep the first occurrence and the result is sorted by method name, which
/// is the canonical order every generation run uses.
pub fn method_set(
    resolver: &dyn SymbolResolver,
    located: &LocatedInterface,
) -> Result<Vec<MethodDecl>> {
    let mut methods = BTreeMap::new();
    let mut visited = HashSet::new();
    visited.insert(format!("{}.{}", located.package_path, located.name));

    collect_methods(resolver, &located.decl, &mut methods, &mut visited)?;
    Ok(methods.into_values().collect())
}

fn collect_methods(
    resolver: &dyn SymbolResolver,
    decl: &TypeDecl,
    methods: &mut BTreeMap<String, MethodDecl>,
    visited: &mut HashSet<String>,
) -> Result<()> {
    for method in &decl.methods {
        methods
            .entry(method.name.clone())
            .or_insert_with(|| method.clone());
    }

    for embed in &decl.embeds {
        match embed {
            TypeDesc::Named {
                name,
                package: Some(package),
            } => {
                if !visited.insert(format!("{}.{}", devendor(&package.path), name)) {
                    continue;
                }
                let embedded = lookup_decl(resolver, &package.path, name)?;
                collect_methods(resolver, &embedded, methods, visited)?;
            }
            TypeDesc::Named {
                name,
                package: None,
            } => {
                if name == "error" {
                    methods
                        .entry("Error".to_string())
                        .or_insert_with(|| {
                            MethodDecl::new("Error", Vec::new(), vec![TypeDesc::basic("string")])
                        });
                }
            }
            TypeDesc::Interface {
                methods: literal_methods,
            } => {
                for method in literal_methods {
                    methods
                        .entry(method.name.clone())
                        .or_insert_with(|| method.clone());
                }
            }
            other => {
                return Err(PhonyError::Resolution(format!(
                    "{} embeds a {} type, expected an interface",
                    decl.name,
                    other.category()
                )));
            }
        }
    }

    Ok(())
}

fn lookup_decl(resolver: &dyn SymbolResolver, path: &str, name: &str) -> Result<TypeDecl> {
    resolver
        .load(path)?
        .iter()
        .filter_map(|package| package.scope.as_ref())
        .find_map(|scope| scope.lookup(name).cloned())
        .ok_or_else(|| {
            PhonyError::NotFound(format!(
                "embedded interface {}.{} not found",
                devendor(path),
                name
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use phony_core::{ManifestResolver, PackageManifest};

    fn io_manifest() -> PackageManifest {
        let bytes = TypeDesc::slice(TypeDesc::basic("byte"));
        let io_result = vec![TypeDesc::basic("int"), TypeDesc::universe("error")];
        PackageManifest::new(
            "io",
            "io",
            vec![
                TypeDecl::interface("Reader", vec![MethodDecl::new("Read", vec![bytes.clone()], io_result.clone())]),
                TypeDecl::interface("Writer", vec![MethodDecl::new("Write", vec![bytes], io_result)]),
                TypeDecl::interface("ReadWriter", Vec::new())
                    .embed(TypeDesc::named("Reader", "io", "io"))
                    .embed(TypeDesc::named("Writer", "io", "io")),
            ],
        )
    }

    fn names(methods: &[MethodDecl]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_locate_first_matching_package() {
        let resolver = ManifestResolver::from_manifests(vec![
            PackageManifest::new("example.com/a", "a", Vec::new()),
            PackageManifest::new("example.com/a/b", "b", vec![TypeDecl::interface("Thing", Vec::new())]),
            PackageManifest::new("example.com/a/c", "c", vec![TypeDecl::interface("Thing", Vec::new())]),
        ]);
        let packages = resolver.load("example.com/a/...").unwrap();

        let located = locate_interface(&packages, "Thing").unwrap();
        assert_eq!(located.package_path, "example.com/a/b");
        assert_eq!(located.package_name, "b");
    }

    #[test]
    fn test_locate_skips_packages_without_scope() {
        let mut untyped = PackageManifest::new("example.com/x", "x", Vec::new());
        untyped.types = None;
        let packages = ManifestResolver::from_manifests(vec![untyped])
            .load("example.com/x")
            .unwrap();

        let err = locate_interface(&packages, "Thing").unwrap_err();
        assert!(matches!(err, PhonyError::NotFound(_)));
    }

    #[test]
    fn test_locate_accepts_non_interface_types() {
        let mut decl = TypeDecl::interface("Clock", vec![MethodDecl::new("Now", Vec::new(), vec![TypeDesc::basic("int64")])]);
        decl.interface = false;
        let packages = ManifestResolver::from_manifests(vec![PackageManifest::new("example.com/clock", "clock", vec![decl])])
            .load("example.com/clock")
            .unwrap();

        let located = locate_interface(&packages, "Clock").unwrap();
        assert!(!located.decl.interface);
    }

    #[test]
    fn test_method_set_is_sorted_by_name() {
        let resolver = ManifestResolver::from_manifests(vec![PackageManifest::new(
            "example.com/store",
            "store",
            vec![TypeDecl::interface(
                "Store",
                vec![
                    MethodDecl::new("Put", Vec::new(), Vec::new()),
                    MethodDecl::new("Delete", Vec::new(), Vec::new()),
                    MethodDecl::new("Get", Vec::new(), Vec::new()),
                ],
            )],
        )]);
        let packages = resolver.load("example.com/store").unwrap();
        let located = locate_interface(&packages, "Store").unwrap();

        let methods = method_set(&resolver, &located).unwrap();
        assert_eq!(names(&methods), vec!["Delete", "Get", "Put"]);
    }

    #[test]
    fn test_method_set_flattens_embedded_interfaces() {
        let resolver = ManifestResolver::from_manifests(vec![
            io_manifest(),
            PackageManifest::new(
                "example.com/conn",
                "conn",
                vec![TypeDecl::interface("Conn", vec![MethodDecl::new("Close", Vec::new(), vec![TypeDesc::universe("error")])])
                    .embed(TypeDesc::named("ReadWriter", "io", "io"))
                    .embed(TypeDesc::named("Reader", "io", "io"))
                    .embed(TypeDesc::universe("error"))],
            ),
        ]);
        let packages = resolver.load("example.com/conn").unwrap();
        let located = locate_interface(&packages, "Conn").unwrap();

        let methods = method_set(&resolver, &located).unwrap();
        assert_eq!(names(&methods), vec!["Close", "Error", "Read", "Write"]);
    }

    #[test]
    fn test_method_set_survives_embedding_cycles() {
        let resolver = ManifestResolver::from_manifests(vec![PackageManifest::new(
            "example.com/loop",
            "loop",
            vec![
                TypeDecl::interface("A", vec![MethodDecl::new("A", Vec::new(), Vec::new())])
                    .embed(TypeDesc::named("B", "example.com/loop", "loop")),
                TypeDecl::interface("B", vec![MethodDecl::new("B", Vec::new(), Vec::new())])
                    .embed(TypeDesc::named("A", "example.com/loop", "loop")),
            ],
        )]);
        let packages = resolver.load("example.com/loop").unwrap();
        let located = locate_interface(&packages, "A").unwrap();

        let methods = method_set(&resolver, &located).unwrap();
        assert_eq!(names(&methods), vec!["A", "B"]);
    }

    #[test]
    fn test_method_set_missing_embedded_interface() {
        let resolver = ManifestResolver::from_manifests(vec![
            io_manifest(),
            PackageManifest::new(
                "example.com/conn",
                "conn",
                vec![TypeDecl::interface("Conn", Vec::new()).embed(TypeDesc::named("Closer", "io", "io"))],
            ),
        ]);
        let packages = resolver.load("example.com/conn").unwrap();
        let located = locate_interface(&packages, "Conn").unwrap();

        let err = method_set(&resolver, &located).unwrap_err();
        assert!(matches!(err, PhonyError::NotFound(ref msg) if msg.contains("io.Closer")));
    }
}
