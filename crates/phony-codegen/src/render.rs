//! Type descriptor rendering and import discovery.
//!
//! Both walks dispatch on the same closed set of shapes. Discovery must run
//! over every parameter and result before rendering, so aliases are final
//! by the time any text is produced.

use phony_core::{devendor, ChanDir, Field, MethodDecl, PhonyError, Result, Signature, TypeDesc};

use crate::imports::ImportRegistry;

/// Registers every externally declared named type reachable from a descriptor.
pub struct ImportCollector<'a> {
    imports: &'a mut ImportRegistry,
    local_path: Option<&'a str>,
}

impl<'a> ImportCollector<'a> {
    /// Types declared in `local_path` are never imported.
    pub fn new(imports: &'a mut ImportRegistry, local_path: Option<&'a str>) -> Self {
        Self {
            imports,
            local_path,
        }
    }

    /// Walk `ty`, adding one import per foreign package.
    pub fn visit(&mut self, ty: &TypeDesc) {
        match ty {
            TypeDesc::Basic { .. } | TypeDesc::Unsupported { .. } => {}
            TypeDesc::Pointer { elem }
            | TypeDesc::Slice { elem }
            | TypeDesc::Array { elem, .. }
            | TypeDesc::Chan { elem, .. } => self.visit(elem),
            TypeDesc::Map { key, value } => {
                self.visit(key);
                self.visit(value);
            }
            TypeDesc::Named { package, .. } => {
                if let Some(package) = package {
                    if self.local_path != Some(devendor(&package.path)) {
                        self.imports.add(&package.name, &package.path);
                    }
                }
            }
            TypeDesc::Func { signature } => self.visit_signature(signature),
            TypeDesc::Interface { methods } => {
                for method in methods {
                    self.visit_signature(&method.signature);
                }
            }
            TypeDesc::Struct { fields } => {
                for field in fields {
                    self.visit(&field.ty);
                }
            }
        }
    }

    /// Walk results then params of a signature.
    pub fn visit_signature(&mut self, signature: &Signature) {
        for result in &signature.results {
            self.visit(&result.ty);
        }
        for param in &signature.params {
            self.visit(&param.ty);
        }
    }
}

/// Renders descriptors as Go type expressions.
pub struct TypeRenderer<'a> {
    imports: &'a ImportRegistry,
    local_path: Option<&'a str>,
}

impl<'a> TypeRenderer<'a> {
    /// Types declared in `local_path` render without a qualifier.
    pub fn new(imports: &'a ImportRegistry, local_path: Option<&'a str>) -> Self {
        Self {
            imports,
            local_path,
        }
    }

    /// Render `ty`. Fails on shapes the generator does not model.
    pub fn render(&self, ty: &TypeDesc) -> Result<String> {
        Ok(match ty {
            TypeDesc::Basic { name } => name.clone(),
            TypeDesc::Pointer { elem } => format!("*{}", self.render(elem)?),
            TypeDesc::Slice { elem } => format!("[]{}", self.render(elem)?),
            TypeDesc::Array { len, elem } => format!("[{}]{}", len, self.render(elem)?),
            TypeDesc::Map { key, value } => {
                format!("map[{}]{}", self.render(key)?, self.render(value)?)
            }
            TypeDesc::Chan { dir, elem } => {
                let inner = self.render(elem)?;
                match dir {
                    // `chan <-chan T` would parse as `chan<- chan T`
                    ChanDir::Both if matches!(**elem, TypeDesc::Chan { dir: ChanDir::Recv, .. }) => {
                        format!("chan ({})", inner)
                    }
                    ChanDir::Both => format!("chan {}", inner),
                    ChanDir::Send => format!("chan<- {}", inner),
                    ChanDir::Recv => format!("<-chan {}", inner),
                }
            }
            TypeDesc::Named { name, package } => self.render_named(name, package.as_ref()),
            TypeDesc::Func { signature } => format!("func{}", self.render_signature(signature)?),
            TypeDesc::Interface { methods } => self.render_interface(methods)?,
            TypeDesc::Struct { fields } => self.render_struct(fields)?,
            TypeDesc::Unsupported { category } => {
                return Err(PhonyError::Render(category.clone()));
            }
        })
    }

    fn render_named(&self, name: &str, package: Option<&phony_core::PackageRef>) -> String {
        let Some(package) = package else {
            return name.to_string();
        };
        if self.local_path == Some(devendor(&package.path)) {
            return name.to_string();
        }
        match self.imports.alias_for(&package.path) {
            Some(alias) => format!("{}.{}", alias, name),
            None => {
                tracing::warn!(name, path = %package.path, "Rendering unregistered named type unqualified");
                name.to_string()
            }
        }
    }

    /// Render `(params) results` as it follows `func` or a method name.
    pub fn render_signature(&self, signature: &Signature) -> Result<String> {
        let mut params = Vec::with_capacity(signature.params.len());
        for (i, param) in signature.params.iter().enumerate() {
            let text = self.render(&param.ty)?;
            if signature.variadic && i + 1 == signature.params.len() {
                params.push(variadic_form(&text));
            } else {
                params.push(text);
            }
        }

        let mut results = Vec::with_capacity(signature.results.len());
        for result in &signature.results {
            results.push(self.render(&result.ty)?);
        }

        Ok(format!("({}){}", params.join(", "), results_suffix(&results)))
    }

    fn render_interface(&self, methods: &[MethodDecl]) -> Result<String> {
        if methods.is_empty() {
            return Ok("interface{}".to_string());
        }
        let mut rendered = Vec::with_capacity(methods.len());
        for method in methods {
            rendered.push(format!(
                "{}{}",
                method.name,
                self.render_signature(&method.signature)?
            ));
        }
        Ok(format!("interface{{ {} }}", rendered.join("; ")))
    }

    fn render_struct(&self, fields: &[Field]) -> Result<String> {
        if fields.is_empty() {
            return Ok("struct{}".to_string());
        }
        let mut rendered = Vec::with_capacity(fields.len());
        for field in fields {
            let mut text = self.render(&field.ty)?;
            if !field.name.is_empty() {
                text = format!("{} {}", field.name, text);
            }
            if let Some(tag) = &field.tag {
                text = format!("{} {}", text, go_string_literal(tag));
            }
            rendered.push(text);
        }
        Ok(format!("struct{{ {} }}", rendered.join("; ")))
    }
}

/// Quote `s` as a Go string literal, raw when it can be.
fn go_string_literal(s: &str) -> String {
    if !s.contains('`') && !s.contains('\r') {
        return format!("`{}`", s);
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Rewrite a rendered `[]T` to `...T`.
pub fn variadic_form(text: &str) -> String {
    match text.strip_prefix("[]") {
        Some(elem) => format!("...{}", elem),
        None => text.to_string(),
    }
}

/// Result list as it follows a parameter list: nothing, ` T` or ` (T1, T2)`.
pub(crate) fn results_suffix(results: &[String]) -> String {
    match results {
        [] => String::new(),
        [single] => format!(" {}", single),
        many => format!(" ({})", many.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phony_core::Var;

    fn registry() -> ImportRegistry {
        let mut imports = ImportRegistry::new();
        imports.add("io", "io");
        imports.add("models", "example.com/app/models");
        imports
    }

    fn render(ty: &TypeDesc) -> String {
        let imports = registry();
        TypeRenderer::new(&imports, None).render(ty).unwrap()
    }

    #[test]
    fn test_render_composites() {
        let user = TypeDesc::named("User", "example.com/app/models", "models");
        assert_eq!(render(&TypeDesc::basic("int")), "int");
        assert_eq!(render(&TypeDesc::pointer(user.clone())), "*models.User");
        assert_eq!(
            render(&TypeDesc::slice(TypeDesc::pointer(user.clone()))),
            "[]*models.User"
        );
        assert_eq!(render(&TypeDesc::array(4, TypeDesc::basic("byte"))), "[4]byte");
        assert_eq!(
            render(&TypeDesc::map(
                TypeDesc::basic("string"),
                TypeDesc::slice(user)
            )),
            "map[string][]models.User"
        );
    }

    #[test]
    fn test_render_channels() {
        let int = TypeDesc::basic("int");
        assert_eq!(render(&TypeDesc::chan(ChanDir::Both, int.clone())), "chan int");
        assert_eq!(render(&TypeDesc::chan(ChanDir::Send, int.clone())), "chan<- int");
        assert_eq!(render(&TypeDesc::chan(ChanDir::Recv, int.clone())), "<-chan int");
        assert_eq!(
            render(&TypeDesc::chan(
                ChanDir::Both,
                TypeDesc::chan(ChanDir::Recv, int)
            )),
            "chan (<-chan int)"
        );
    }

    #[test]
    fn test_render_named_types() {
        assert_eq!(render(&TypeDesc::universe("error")), "error");
        assert_eq!(render(&TypeDesc::named("Reader", "io", "io")), "io.Reader");
        // Discovery always runs first; an unknown package falls back to the bare name.
        assert_eq!(
            render(&TypeDesc::named("Thing", "example.com/unknown", "unknown")),
            "Thing"
        );
    }

    #[test]
    fn test_render_vendored_named_type() {
        let ty = TypeDesc::named("User", "example.com/app/vendor/example.com/app/models", "models");
        assert_eq!(render(&ty), "models.User");
    }

    #[test]
    fn test_render_local_named_type() {
        let imports = registry();
        let renderer = TypeRenderer::new(&imports, Some("example.com/app/models"));
        let ty = TypeDesc::named("User", "example.com/app/models", "models");
        assert_eq!(renderer.render(&ty).unwrap(), "User");
    }

    #[test]
    fn test_render_func_types() {
        let handler = TypeDesc::Func {
            signature: Signature {
                params: vec![
                    Var::new(TypeDesc::named("Writer", "io", "io")),
                    Var::new(TypeDesc::slice(TypeDesc::basic("string"))),
                ],
                results: vec![
                    Var::new(TypeDesc::basic("int")),
                    Var::new(TypeDesc::universe("error")),
                ],
                variadic: true,
            },
        };
        assert_eq!(render(&handler), "func(io.Writer, ...string) (int, error)");

        let callback = TypeDesc::Func {
            signature: Signature::default(),
        };
        assert_eq!(render(&callback), "func()");
    }

    #[test]
    fn test_render_literals() {
        assert_eq!(render(&TypeDesc::Interface { methods: Vec::new() }), "interface{}");
        assert_eq!(render(&TypeDesc::Struct { fields: Vec::new() }), "struct{}");

        let stringer = TypeDesc::Interface {
            methods: vec![MethodDecl::new("String", Vec::new(), vec![TypeDesc::basic("string")])],
        };
        assert_eq!(render(&stringer), "interface{ String() string }");

        let pair = TypeDesc::Struct {
            fields: vec![
                Field::new("", TypeDesc::named("Reader", "io", "io")),
                Field::new("N", TypeDesc::basic("int")),
            ],
        };
        assert_eq!(render(&pair), "struct{ io.Reader; N int }");
    }

    #[test]
    fn test_render_struct_tags() {
        let tagged = TypeDesc::Struct {
            fields: vec![
                Field::new("ID", TypeDesc::basic("int")).tag(r#"json:"id""#),
                Field::new("", TypeDesc::named("Reader", "io", "io")).tag("embedded"),
                Field::new("Raw", TypeDesc::basic("string")).tag("a`b"),
            ],
        };
        assert_eq!(
            render(&tagged),
            r#"struct{ ID int `json:"id"`; io.Reader `embedded`; Raw string "a`b" }"#
        );
    }

    #[test]
    fn test_go_string_literal_escapes() {
        assert_eq!(go_string_literal(r#"json:"id""#), r#"`json:"id"`"#);
        assert_eq!(go_string_literal("x`\"\\\r"), r#""x`\"\\\r""#);
    }

    #[test]
    fn test_render_unsupported_shape() {
        let imports = registry();
        let renderer = TypeRenderer::new(&imports, None);
        let nested = TypeDesc::slice(TypeDesc::Unsupported {
            category: "type parameter".into(),
        });
        let err = renderer.render(&nested).unwrap_err();
        assert!(matches!(err, PhonyError::Render(ref c) if c == "type parameter"));
    }

    #[test]
    fn test_collect_imports_recursively() {
        let mut imports = ImportRegistry::new();
        let ty = TypeDesc::map(
            TypeDesc::named("Key", "example.com/a/keys", "keys"),
            TypeDesc::chan(
                ChanDir::Recv,
                TypeDesc::pointer(TypeDesc::named("Event", "example.com/a/events", "events")),
            ),
        );
        let func = TypeDesc::Func {
            signature: Signature {
                params: vec![Var::new(TypeDesc::named("Context", "context", "context"))],
                results: vec![Var::new(TypeDesc::universe("error"))],
                variadic: false,
            },
        };

        let mut collector = ImportCollector::new(&mut imports, Some("example.com/a/events"));
        collector.visit(&ty);
        collector.visit(&func);
        collector.visit(&TypeDesc::basic("int"));

        let paths: Vec<_> = imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["example.com/a/keys", "context"]);
    }

    #[test]
    fn test_variadic_form() {
        assert_eq!(variadic_form("[]string"), "...string");
        assert_eq!(variadic_form("[][]byte"), "...[]byte");
        assert_eq!(variadic_form("string"), "string");
    }
}
