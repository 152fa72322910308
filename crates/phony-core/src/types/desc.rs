use serde::{Deserialize, Serialize};

use super::MethodDecl;

/// A possibly nested type as reported by the symbol resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDesc {
    /// Predeclared basic type such as `int` or `string`.
    Basic { name: String },
    /// `*T`
    Pointer { elem: Box<TypeDesc> },
    /// `[]T`
    Slice { elem: Box<TypeDesc> },
    /// `[N]T`
    Array { len: u64, elem: Box<TypeDesc> },
    /// `map[K]V`
    Map {
        key: Box<TypeDesc>,
        value: Box<TypeDesc>,
    },
    /// `chan T`, `chan<- T` or `<-chan T`
    Chan {
        #[serde(default)]
        dir: ChanDir,
        elem: Box<TypeDesc>,
    },
    /// A declared type. Universe-scope names (`error`, `comparable`) have no package.
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package: Option<PackageRef>,
    },
    /// Function literal type.
    Func { signature: Signature },
    /// Anonymous interface literal, `interface{}` when empty.
    Interface {
        #[serde(default)]
        methods: Vec<MethodDecl>,
    },
    /// Anonymous struct literal, `struct{}` when empty.
    Struct {
        #[serde(default)]
        fields: Vec<Field>,
    },
    /// A shape the resolver saw but the generator does not model.
    Unsupported { category: String },
}

impl TypeDesc {
    /// Create a basic type.
    pub fn basic(name: impl Into<String>) -> Self {
        TypeDesc::Basic { name: name.into() }
    }

    /// Create a named type declared in a package.
    pub fn named(
        name: impl Into<String>,
        package_path: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        TypeDesc::Named {
            name: name.into(),
            package: Some(PackageRef::new(package_path, package_name)),
        }
    }

    /// Create a named type from the universe scope.
    pub fn universe(name: impl Into<String>) -> Self {
        TypeDesc::Named {
            name: name.into(),
            package: None,
        }
    }

    /// Create a pointer to `elem`.
    pub fn pointer(elem: TypeDesc) -> Self {
        TypeDesc::Pointer {
            elem: Box::new(elem),
        }
    }

    /// Create a slice of `elem`.
    pub fn slice(elem: TypeDesc) -> Self {
        TypeDesc::Slice {
            elem: Box::new(elem),
        }
    }

    /// Create a fixed-length array of `elem`.
    pub fn array(len: u64, elem: TypeDesc) -> Self {
        TypeDesc::Array {
            len,
            elem: Box::new(elem),
        }
    }

    /// Create a map from `key` to `value`.
    pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
        TypeDesc::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Create a channel of `elem`.
    pub fn chan(dir: ChanDir, elem: TypeDesc) -> Self {
        TypeDesc::Chan {
            dir,
            elem: Box::new(elem),
        }
    }

    /// Short name of the shape, used in diagnostics.
    pub fn category(&self) -> &str {
        match self {
            TypeDesc::Basic { .. } => "basic",
            TypeDesc::Pointer { .. } => "pointer",
            TypeDesc::Slice { .. } => "slice",
            TypeDesc::Array { .. } => "array",
            TypeDesc::Map { .. } => "map",
            TypeDesc::Chan { .. } => "chan",
            TypeDesc::Named { .. } => "named",
            TypeDesc::Func { .. } => "func",
            TypeDesc::Interface { .. } => "interface",
            TypeDesc::Struct { .. } => "struct",
            TypeDesc::Unsupported { category } => category,
        }
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanDir {
    /// Bidirectional `chan T`.
    #[default]
    Both,
    /// Send-only `chan<- T`.
    Send,
    /// Receive-only `<-chan T`.
    Recv,
}

/// Package that declares a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Full import path, possibly vendored.
    pub path: String,
    /// Declared package name, the default import alias.
    pub name: String,
}

impl PackageRef {
    /// Create a new package reference.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// A parameter or result slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    /// Declared name. Ignored by the generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
}

impl Var {
    /// Create an unnamed slot of the given type.
    pub fn new(ty: TypeDesc) -> Self {
        Self { name: None, ty }
    }
}

/// Function signature. When `variadic` is set the last param is a slice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Var>,
    #[serde(default)]
    pub results: Vec<Var>,
    #[serde(default)]
    pub variadic: bool,
}

/// Field of an anonymous struct. An empty name marks an embedded field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
    /// Raw tag text, without quotes. Tags are part of the struct's identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Field {
    /// Create an untagged field. Pass an empty name for an embedded field.
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
        }
    }

    /// Set the field tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_nested_descriptor() {
        let json = r#"{
            "kind": "map",
            "key": {"kind": "basic", "name": "string"},
            "value": {
                "kind": "slice",
                "elem": {
                    "kind": "pointer",
                    "elem": {"kind": "named", "name": "Buffer", "package": {"path": "bytes", "name": "bytes"}}
                }
            }
        }"#;

        let ty: TypeDesc = serde_json::from_str(json).unwrap();
        assert_eq!(
            ty,
            TypeDesc::map(
                TypeDesc::basic("string"),
                TypeDesc::slice(TypeDesc::pointer(TypeDesc::named("Buffer", "bytes", "bytes")))
            )
        );
    }

    #[test]
    fn test_chan_direction_defaults_to_both() {
        let ty: TypeDesc =
            serde_json::from_str(r#"{"kind": "chan", "elem": {"kind": "basic", "name": "int"}}"#)
                .unwrap();
        assert_eq!(ty, TypeDesc::chan(ChanDir::Both, TypeDesc::basic("int")));
    }

    #[test]
    fn test_deserialize_tagged_struct_field() {
        let ty: TypeDesc = serde_json::from_str(
            r#"{"kind": "struct", "fields": [
                {"name": "ID", "type": {"kind": "basic", "name": "int"}, "tag": "json:\"id\""},
                {"name": "Name", "type": {"kind": "basic", "name": "string"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            ty,
            TypeDesc::Struct {
                fields: vec![
                    Field::new("ID", TypeDesc::basic("int")).tag("json:\"id\""),
                    Field::new("Name", TypeDesc::basic("string")),
                ],
            }
        );
    }

    #[test]
    fn test_category() {
        assert_eq!(TypeDesc::universe("error").category(), "named");
        let unknown = TypeDesc::Unsupported {
            category: "tuple".into(),
        };
        assert_eq!(unknown.category(), "tuple");
    }
}
