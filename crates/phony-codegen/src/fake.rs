//! Assembling the fake model from a generation request.

use std::collections::HashMap;

use phony_core::{devendor, MethodDecl, PhonyError, Result, SymbolResolver};
use serde::Serialize;

use crate::emit::{method_members, reserved_identifiers, FakeEmitter, FAKE_MEMBERS};
use crate::imports::ImportRegistry;
use crate::locator::{locate_interface, method_set};
use crate::method::MethodDescriptor;
use crate::render::{ImportCollector, TypeRenderer};

/// Inputs for one fake.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Interface to fake.
    pub interface_name: String,
    /// Import path or `prefix/...` pattern to search.
    pub package_path: String,
    /// Name of the generated type.
    pub fake_name: String,
    /// Package clause of the generated file.
    pub destination_package: String,
    /// Import path of the destination package, if known.
    pub destination_path: Option<String>,
    /// Text placed above the generated-code marker.
    pub header: Option<String>,
}

impl GenerateRequest {
    /// Request a `Fake<Interface>` in package `fakes`.
    pub fn new(interface_name: impl Into<String>, package_path: impl Into<String>) -> Self {
        let interface_name = interface_name.into();
        Self {
            fake_name: format!("Fake{}", interface_name),
            interface_name,
            package_path: package_path.into(),
            destination_package: "fakes".to_string(),
            destination_path: None,
            header: None,
        }
    }

    /// Set the generated type name.
    pub fn fake_name(mut self, name: impl Into<String>) -> Self {
        self.fake_name = name.into();
        self
    }

    /// Set the package clause.
    pub fn destination_package(mut self, package: impl Into<String>) -> Self {
        self.destination_package = package.into();
        self
    }

    /// Set the destination import path.
    pub fn destination_path(mut self, path: impl Into<String>) -> Self {
        self.destination_path = Some(path.into());
        self
    }

    /// Set the header text.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    fn validate(&self) -> Result<()> {
        for (what, value) in [
            ("interface name", &self.interface_name),
            ("fake name", &self.fake_name),
            ("destination package", &self.destination_package),
        ] {
            if !is_identifier(value) {
                return Err(PhonyError::InvalidArgument(format!(
                    "{} {:?} is not a valid Go identifier",
                    what, value
                )));
            }
        }
        if self.package_path.trim().is_empty() {
            return Err(PhonyError::InvalidArgument(
                "package path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything the emitter needs to write one fake.
#[derive(Debug, Clone, Serialize)]
pub struct FakeSpec {
    pub interface_name: String,
    /// Devendored import path of the interface's package.
    pub interface_package: String,
    /// Alias of the interface's package, `None` when it is the destination.
    pub interface_alias: Option<String>,
    pub destination_package: String,
    pub name: String,
    pub header: Option<String>,
    pub imports: ImportRegistry,
    pub methods: Vec<MethodDescriptor>,
}

impl FakeSpec {
    /// Resolve the interface and build the complete model.
    pub fn build(request: &GenerateRequest, resolver: &dyn SymbolResolver) -> Result<Self> {
        request.validate()?;

        let packages = resolver.load(&request.package_path)?;
        let located = locate_interface(&packages, &request.interface_name)?;
        let methods = method_set(resolver, &located)?;
        check_member_names(&methods)?;

        let local_path = request.destination_path.as_deref().map(devendor);
        let interface_is_local = local_path == Some(located.package_path.as_str());

        let mut imports = ImportRegistry::new();
        imports.add("sync", "sync");
        if !interface_is_local {
            imports.add(&located.package_name, &located.package_path);
        }

        let mut collector = ImportCollector::new(&mut imports, local_path);
        for method in &methods {
            collector.visit_signature(&method.signature);
        }

        imports.disambiguate_reserving(&reserved_identifiers(&methods));

        let interface_alias = if interface_is_local {
            None
        } else {
            imports.alias_for(&located.package_path).map(str::to_string)
        };

        let renderer = TypeRenderer::new(&imports, local_path);
        let methods = methods
            .iter()
            .map(|method| MethodDescriptor::build(method, &renderer))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            interface_name: located.name,
            interface_package: located.package_path,
            interface_alias,
            destination_package: request.destination_package.clone(),
            name: request.fake_name.clone(),
            header: request.header.clone(),
            imports,
            methods,
        })
    }

    /// Alias the `sync` package ended up with.
    pub fn sync_alias(&self) -> &str {
        self.imports.alias_for("sync").unwrap_or("sync")
    }

    /// The interface as referenced from the generated file.
    pub fn qualified_interface(&self) -> String {
        match &self.interface_alias {
            Some(alias) => format!("{}.{}", alias, self.interface_name),
            None => self.interface_name.clone(),
        }
    }
}

/// Build and emit a fake in one step. The output is unformatted Go source.
pub fn generate(request: &GenerateRequest, resolver: &dyn SymbolResolver) -> Result<String> {
    let spec = FakeSpec::build(request, resolver)?;
    tracing::info!(
        fake = %spec.name,
        interface = %spec.interface_name,
        package = %spec.destination_package,
        "Writing fake"
    );
    Ok(FakeEmitter::new(&spec).emit())
}

/// Reject method sets whose names clash with members the fake declares.
fn check_member_names(methods: &[MethodDecl]) -> Result<()> {
    let mut owners: HashMap<String, &str> = FAKE_MEMBERS
        .iter()
        .map(|member| (member.to_string(), "the fake itself"))
        .collect();

    for method in methods {
        let members = std::iter::once(method.name.clone()).chain(method_members(method));
        for member in members {
            if let Some(owner) = owners.get(&member) {
                return Err(PhonyError::InvalidArgument(format!(
                    "method {} conflicts with {}: both need a member named {}",
                    method.name, owner, member
                )));
            }
            owners.insert(member, &method.name);
        }
    }
    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
