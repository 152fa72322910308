//! Per-method descriptors used by the emitter.

use phony_core::{MethodDecl, Result};
use serde::Serialize;

use crate::render::{results_suffix, variadic_form, TypeRenderer};

/// A parameter of a faked method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    /// Positional name, `arg1`, `arg2`, ...
    pub name: String,
    /// Stored type. Variadic parameters keep their slice form here.
    pub ty: String,
    pub is_variadic: bool,
    pub is_slice: bool,
}

impl Param {
    /// Type as written in the method's parameter list.
    pub fn signature_type(&self) -> String {
        if self.is_variadic {
            variadic_form(&self.ty)
        } else {
            self.ty.clone()
        }
    }

    /// Name of the value recorded for this parameter.
    pub fn recorded(&self) -> String {
        if self.is_slice {
            self.copy_name()
        } else {
            self.name.clone()
        }
    }

    /// Name of the defensive copy for slice parameters.
    pub fn copy_name(&self) -> String {
        format!("{}Copy", self.name)
    }

    /// Expression forwarding this parameter to a stub.
    pub fn forwarded(&self) -> String {
        if self.is_variadic {
            format!("{}...", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// A result of a faked method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Return {
    /// Positional name, `result1`, `result2`, ...
    pub name: String,
    pub ty: String,
}

/// One interface method with synthetic, positional names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: Vec<Return>,
}

impl MethodDescriptor {
    /// Build a descriptor, rendering every type through `renderer`.
    pub fn build(method: &MethodDecl, renderer: &TypeRenderer<'_>) -> Result<Self> {
        tracing::debug!(method = %method.name, "Preparing method");
        let signature = &method.signature;

        let mut params = Vec::with_capacity(signature.params.len());
        for (i, param) in signature.params.iter().enumerate() {
            let ty = renderer.render(&param.ty)?;
            params.push(Param {
                name: format!("arg{}", i + 1),
                is_variadic: signature.variadic && i + 1 == signature.params.len(),
                is_slice: ty.starts_with("[]"),
                ty,
            });
        }

        let mut returns = Vec::with_capacity(signature.results.len());
        for (i, result) in signature.results.iter().enumerate() {
            returns.push(Return {
                name: format!("result{}", i + 1),
                ty: renderer.render(&result.ty)?,
            });
        }

        Ok(Self {
            name: method.name.clone(),
            params,
            returns,
        })
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn has_returns(&self) -> bool {
        !self.returns.is_empty()
    }

    /// Unexported prefix for this method's private fields.
    pub fn field_prefix(&self) -> String {
        unexport(&self.name)
    }

    /// Slice-typed parameters, which are copied before being recorded.
    pub fn slice_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| p.is_slice)
    }

    /// `arg1 string, arg2 ...int`
    pub fn named_params(&self) -> String {
        self.params
            .iter()
            .map(|p| format!("{} {}", p.name, p.signature_type()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `string, ...int`
    pub fn param_types(&self) -> String {
        self.params
            .iter()
            .map(Param::signature_type)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `arg1, arg2Copy`
    pub fn recorded_args(&self) -> String {
        self.params
            .iter()
            .map(Param::recorded)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `arg1, arg2...`
    pub fn forwarded_args(&self) -> String {
        self.params
            .iter()
            .map(Param::forwarded)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Result list following the parameter list: ``, ` string` or ` (string, error)`.
    pub fn results_suffix(&self) -> String {
        let types: Vec<String> = self.returns.iter().map(|r| r.ty.clone()).collect();
        results_suffix(&types)
    }

    /// Result list of the `ArgsForCall` accessor, using stored param types.
    pub fn stored_params_suffix(&self) -> String {
        let types: Vec<String> = self.params.iter().map(|p| p.ty.clone()).collect();
        results_suffix(&types)
    }

    /// `result1 string, result2 error`
    pub fn named_returns(&self) -> String {
        self.returns
            .iter()
            .map(|r| format!("{} {}", r.name, r.ty))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `result1, result2`
    pub fn return_names(&self) -> String {
        self.returns
            .iter()
            .map(|r| r.name.clone())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `prefix.result1, prefix.result2`
    pub fn returns_from(&self, prefix: &str) -> String {
        self.returns
            .iter()
            .map(|r| format!("{}.{}", prefix, r.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Lower-case the first character of an identifier.
pub fn unexport(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::ImportRegistry;
    use phony_core::{PhonyError, TypeDesc};

    fn build(method: &MethodDecl) -> Result<MethodDescriptor> {
        let mut imports = ImportRegistry::new();
        imports.add("io", "io");
        let renderer = TypeRenderer::new(&imports, None);
        MethodDescriptor::build(method, &renderer)
    }

    #[test]
    fn test_positional_names() {
        let method = MethodDecl::new(
            "Copy",
            vec![TypeDesc::named("Writer", "io", "io"), TypeDesc::named("Reader", "io", "io")],
            vec![TypeDesc::basic("int64"), TypeDesc::universe("error")],
        );
        let descriptor = build(&method).unwrap();

        assert_eq!(descriptor.named_params(), "arg1 io.Writer, arg2 io.Reader");
        assert_eq!(descriptor.named_returns(), "result1 int64, result2 error");
        assert_eq!(descriptor.results_suffix(), " (int64, error)");
        assert_eq!(descriptor.field_prefix(), "copy");
    }

    #[test]
    fn test_variadic_last_param() {
        let method = MethodDecl::new(
            "Log",
            vec![
                TypeDesc::basic("string"),
                TypeDesc::slice(TypeDesc::Interface { methods: Vec::new() }),
            ],
            Vec::new(),
        )
        .variadic();
        let descriptor = build(&method).unwrap();

        let last = &descriptor.params[1];
        assert!(last.is_variadic);
        assert!(last.is_slice);
        assert_eq!(last.ty, "[]interface{}");
        assert_eq!(descriptor.named_params(), "arg1 string, arg2 ...interface{}");
        assert_eq!(descriptor.param_types(), "string, ...interface{}");
        assert_eq!(descriptor.recorded_args(), "arg1, arg2Copy");
        assert_eq!(descriptor.forwarded_args(), "arg1, arg2...");
        assert_eq!(descriptor.stored_params_suffix(), " (string, []interface{})");
        assert_eq!(descriptor.results_suffix(), "");
        assert!(!descriptor.params[0].is_variadic);
    }

    #[test]
    fn test_slice_detection() {
        let method = MethodDecl::new(
            "Write",
            vec![TypeDesc::slice(TypeDesc::basic("byte")), TypeDesc::array(2, TypeDesc::basic("int"))],
            vec![TypeDesc::basic("int")],
        );
        let descriptor = build(&method).unwrap();

        let slices: Vec<_> = descriptor.slice_params().map(|p| p.name.as_str()).collect();
        assert_eq!(slices, vec!["arg1"]);
        assert_eq!(descriptor.results_suffix(), " int");
        assert_eq!(descriptor.returns_from("ret"), "ret.result1");
    }

    #[test]
    fn test_unsupported_param_fails() {
        let method = MethodDecl::new(
            "Broken",
            vec![TypeDesc::Unsupported {
                category: "tuple".into(),
            }],
            Vec::new(),
        );
        assert!(matches!(build(&method), Err(PhonyError::Render(_))));
    }

    #[test]
    fn test_unexport() {
        assert_eq!(unexport("Get"), "get");
        assert_eq!(unexport("URL"), "uRL");
        assert_eq!(unexport(""), "");
    }
}
