use serde::{Deserialize, Serialize};

use super::{Signature, TypeDesc};

/// A top-level type declaration in a package scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Declared name.
    pub name: String,

    /// Whether the underlying type is an interface.
    #[serde(default)]
    pub interface: bool,

    /// Methods declared directly on the type.
    #[serde(default)]
    pub methods: Vec<MethodDecl>,

    /// Embedded interfaces, as named type references.
    #[serde(default)]
    pub embeds: Vec<TypeDesc>,
}

impl TypeDecl {
    /// Create an interface declaration with the given methods.
    pub fn interface(name: impl Into<String>, methods: Vec<MethodDecl>) -> Self {
        Self {
            name: name.into(),
            interface: true,
            methods,
            embeds: Vec::new(),
        }
    }

    /// Add an embedded interface.
    pub fn embed(mut self, ty: TypeDesc) -> Self {
        self.embeds.push(ty);
        self
    }
}

/// A method with its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(flatten)]
    pub signature: Signature,
}

impl MethodDecl {
    /// Create a method from parameter and result types.
    pub fn new(name: impl Into<String>, params: Vec<TypeDesc>, results: Vec<TypeDesc>) -> Self {
        Self {
            name: name.into(),
            signature: Signature {
                params: params.into_iter().map(super::Var::new).collect(),
                results: results.into_iter().map(super::Var::new).collect(),
                variadic: false,
            },
        }
    }

    /// Mark the last parameter as variadic.
    pub fn variadic(mut self) -> Self {
        self.signature.variadic = true;
        self
    }
}
