//! Go source emission for a [`FakeSpec`].
//!
//! Every method gets its own `sync.RWMutex`. A call takes the method lock,
//! records its arguments, records into the shared ledger (ledger lock nested
//! inside the method lock) and releases. `Invocations` takes the same locks
//! in the same order.

use std::collections::BTreeSet;

use phony_core::MethodDecl;

use crate::fake::FakeSpec;
use crate::method::{unexport, MethodDescriptor};

/// Marker recognised by Go tooling as generated code.
pub const GENERATED_MARKER: &str = "// Code generated by phony. DO NOT EDIT.";

const LEDGER_TYPE: &str = "map[string][][]interface{}";

/// Locals, parameters and builtins referenced inside emitted function bodies.
const BODY_IDENTIFIERS: &[&str] = &[
    "i",
    "ret",
    "specificReturn",
    "fakeReturns",
    "stub",
    "argsForCall",
    "copiedInvocations",
    "key",
    "value",
    "calls",
    "args",
    "len",
    "make",
    "copy",
    "append",
    "new",
    "nil",
    "int",
    "string",
];

/// Members every fake declares regardless of its methods.
pub(crate) const FAKE_MEMBERS: &[&str] =
    &["invocations", "invocationsMutex", "Invocations", "recordInvocation"];

/// Fields and methods the fake declares for `method`, excluding the method itself.
pub(crate) fn method_members(method: &MethodDecl) -> Vec<String> {
    let name = &method.name;
    let prefix = unexport(name);
    let mut members = vec![
        format!("{}Stub", name),
        format!("{}Mutex", prefix),
        format!("{}ArgsForCall", prefix),
        format!("{}CallCount", name),
        format!("{}Calls", name),
    ];
    if !method.signature.params.is_empty() {
        members.push(format!("{}ArgsForCall", name));
    }
    if !method.signature.results.is_empty() {
        members.push(format!("{}Returns", prefix));
        members.push(format!("{}ReturnsOnCall", prefix));
        members.push(format!("{}Returns", name));
        members.push(format!("{}ReturnsOnCall", name));
    }
    members
}

/// Names an import alias must not take, because a body would shadow it
/// before a type expression uses it.
pub(crate) fn reserved_identifiers(methods: &[MethodDecl]) -> BTreeSet<String> {
    let mut reserved: BTreeSet<String> = BODY_IDENTIFIERS.iter().map(|s| s.to_string()).collect();
    for method in methods {
        for n in 1..=method.signature.params.len() {
            reserved.insert(format!("arg{}", n));
            reserved.insert(format!("arg{}Copy", n));
        }
        for n in 1..=method.signature.results.len() {
            reserved.insert(format!("result{}", n));
        }
    }
    reserved
}

/// Line-oriented writer with tab indentation.
#[derive(Default)]
struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push('\t');
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `text` and indent what follows.
    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    /// Dedent and write `text`.
    fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Writes the Go source for one fake.
pub struct FakeEmitter<'a> {
    spec: &'a FakeSpec,
    receiver: &'static str,
}

impl<'a> FakeEmitter<'a> {
    pub fn new(spec: &'a FakeSpec) -> Self {
        // The receiver must not shadow an imported package inside method bodies.
        let receiver = ["fake", "fk", "fakeRecv"]
            .into_iter()
            .find(|candidate| spec.imports.iter().all(|i| i.alias != *candidate))
            .unwrap_or("fakeReceiver");
        Self { spec, receiver }
    }

    /// Render the complete file.
    pub fn emit(&self) -> String {
        let mut w = CodeWriter::default();

        self.write_preamble(&mut w);
        self.write_struct(&mut w);
        for method in &self.spec.methods {
            w.blank();
            self.write_method(&mut w, method);
            w.blank();
            self.write_call_count(&mut w, method);
            w.blank();
            self.write_calls(&mut w, method);
            if method.has_params() {
                w.blank();
                self.write_args_for_call(&mut w, method);
            }
            if method.has_returns() {
                w.blank();
                self.write_returns(&mut w, method);
                w.blank();
                self.write_returns_on_call(&mut w, method);
            }
        }
        w.blank();
        self.write_invocations(&mut w);
        w.blank();
        self.write_record_invocation(&mut w);
        w.blank();
        w.line(format!(
            "var _ {} = new({})",
            self.spec.qualified_interface(),
            self.spec.name
        ));

        w.finish()
    }

    fn write_preamble(&self, w: &mut CodeWriter) {
        if let Some(header) = &self.spec.header {
            for line in header.trim_end().lines() {
                if line.trim_start().starts_with("//") {
                    w.line(line);
                } else if line.trim().is_empty() {
                    w.line("//");
                } else {
                    w.line(format!("// {}", line));
                }
            }
            w.blank();
        }
        w.line(GENERATED_MARKER);
        w.line(format!("package {}", self.spec.destination_package));
        w.blank();
        w.open("import (");
        for import in self.spec.imports.iter() {
            w.line(format!("{} \"{}\"", import.alias, import.path));
        }
        w.close(")");
        w.blank();
    }

    fn write_struct(&self, w: &mut CodeWriter) {
        let sync = self.spec.sync_alias();
        w.open(format!("type {} struct {{", self.spec.name));
        for method in &self.spec.methods {
            let prefix = method.field_prefix();
            w.line(format!(
                "{}Stub func({}){}",
                method.name,
                method.param_types(),
                method.results_suffix()
            ));
            w.line(format!("{}Mutex {}.RWMutex", prefix, sync));
            self.write_struct_type(w, &format!("{}ArgsForCall []", prefix), &args_fields(method), "");
            if method.has_returns() {
                self.write_struct_type(w, &format!("{}Returns ", prefix), &return_fields(method), "");
                self.write_struct_type(
                    w,
                    &format!("{}ReturnsOnCall map[int]", prefix),
                    &return_fields(method),
                    "",
                );
            }
        }
        w.line(format!("invocations {}", LEDGER_TYPE));
        w.line(format!("invocationsMutex {}.RWMutex", sync));
        w.close("}");
    }

    /// Write `{lead}struct {{ fields }}{tail}`, collapsing to `struct{}` when empty.
    fn write_struct_type(&self, w: &mut CodeWriter, lead: &str, fields: &[String], tail: &str) {
        if fields.is_empty() {
            w.line(format!("{}struct{{}}{}", lead, tail));
            return;
        }
        w.open(format!("{}struct {{", lead));
        for field in fields {
            w.line(field);
        }
        w.close(format!("}}{}", tail));
    }

    fn write_method(&self, w: &mut CodeWriter, method: &MethodDescriptor) {
        let fake = self.receiver;
        let prefix = method.field_prefix();

        w.open(format!(
            "func ({} *{}) {}({}){} {{",
            fake,
            self.spec.name,
            method.name,
            method.named_params(),
            method.results_suffix()
        ));

        for param in method.slice_params() {
            let copy = param.copy_name();
            w.line(format!("var {} {}", copy, param.ty));
            w.open(format!("if {} != nil {{", param.name));
            w.line(format!("{} = make({}, len({}))", copy, param.ty, param.name));
            w.line(format!("copy({}, {})", copy, param.name));
            w.close("}");
        }

        w.line(format!("{}.{}Mutex.Lock()", fake, prefix));
        self.write_struct_type(
            w,
            &format!(
                "{0}.{1}ArgsForCall = append({0}.{1}ArgsForCall, ",
                fake, prefix
            ),
            &args_fields(method),
            &format!("{{{}}})", method.recorded_args()),
        );
        if method.has_returns() {
            w.line(format!(
                "ret, specificReturn := {0}.{1}ReturnsOnCall[len({0}.{1}ArgsForCall)-1]",
                fake, prefix
            ));
            w.line(format!("fakeReturns := {}.{}Returns", fake, prefix));
        }
        w.line(format!("stub := {}.{}Stub", fake, method.name));
        w.line(format!(
            "{}.recordInvocation(\"{}\", []interface{{}}{{{}}})",
            fake,
            method.name,
            method.recorded_args()
        ));
        w.line(format!("{}.{}Mutex.Unlock()", fake, prefix));

        w.open("if stub != nil {");
        if method.has_returns() {
            w.line(format!("return stub({})", method.forwarded_args()));
        } else {
            w.line(format!("stub({})", method.forwarded_args()));
        }
        w.close("}");

        if method.has_returns() {
            w.open("if specificReturn {");
            w.line(format!("return {}", method.returns_from("ret")));
            w.close("}");
            w.line(format!("return {}", method.returns_from("fakeReturns")));
        }
        w.close("}");
    }

    fn write_call_count(&self, w: &mut CodeWriter, method: &MethodDescriptor) {
        let fake = self.receiver;
        let prefix = method.field_prefix();
        w.open(format!(
            "func ({} *{}) {}CallCount() int {{",
            fake, self.spec.name, method.name
        ));
        w.line(format!("{}.{}Mutex.RLock()", fake, prefix));
        w.line(format!("defer {}.{}Mutex.RUnlock()", fake, prefix));
        w.line(format!("return len({}.{}ArgsForCall)", fake, prefix));
        w.close("}");
    }

    fn write_calls(&self, w: &mut CodeWriter, method: &MethodDescriptor) {
        let fake = self.receiver;
        let prefix = method.field_prefix();
        w.open(format!(
            "func ({} *{}) {}Calls(stub func({}){}) {{",
            fake,
            self.spec.name,
            method.name,
            method.param_types(),
            method.results_suffix()
        ));
        w.line(format!("{}.{}Mutex.Lock()", fake, prefix));
        w.line(format!("defer {}.{}Mutex.Unlock()", fake, prefix));
        w.line(format!("{}.{}Stub = stub", fake, method.name));
        w.close("}");
    }

    fn write_args_for_call(&self, w: &mut CodeWriter, method: &MethodDescriptor) {
        let fake = self.receiver;
        let prefix = method.field_prefix();
        w.open(format!(
            "func ({} *{}) {}ArgsForCall(i int){} {{",
            fake,
            self.spec.name,
            method.name,
            method.stored_params_suffix()
        ));
        w.line(format!("{}.{}Mutex.RLock()", fake, prefix));
        w.line(format!("defer {}.{}Mutex.RUnlock()", fake, prefix));
        w.line(format!("argsForCall := {}.{}ArgsForCall[i]", fake, prefix));
        let fields: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("argsForCall.{}", p.name))
            .collect();
        w.line(format!("return {}", fields.join(", ")));
        w.close("}");
    }

    fn write_returns(&self, w: &mut CodeWriter, method: &MethodDescriptor) {
        let fake = self.receiver;
        let prefix = method.field_prefix();
        w.open(format!(
            "func ({} *{}) {}Returns({}) {{",
            fake,
            self.spec.name,
            method.name,
            method.named_returns()
        ));
        w.line(format!("{}.{}Mutex.Lock()", fake, prefix));
        w.line(format!("defer {}.{}Mutex.Unlock()", fake, prefix));
        w.line(format!("{}.{}Stub = nil", fake, method.name));
        self.write_struct_type(
            w,
            &format!("{}.{}Returns = ", fake, prefix),
            &return_fields(method),
            &format!("{{{}}}", method.return_names()),
        );
        w.close("}");
    }

    fn write_returns_on_call(&self, w: &mut CodeWriter, method: &MethodDescriptor) {
        let fake = self.receiver;
        let prefix = method.field_prefix();
        w.open(format!(
            "func ({} *{}) {}ReturnsOnCall(i int, {}) {{",
            fake,
            self.spec.name,
            method.name,
            method.named_returns()
        ));
        w.line(format!("{}.{}Mutex.Lock()", fake, prefix));
        w.line(format!("defer {}.{}Mutex.Unlock()", fake, prefix));
        w.line(format!("{}.{}Stub = nil", fake, method.name));
        w.open(format!("if {}.{}ReturnsOnCall == nil {{", fake, prefix));
        self.write_struct_type(
            w,
            &format!("{}.{}ReturnsOnCall = make(map[int]", fake, prefix),
            &return_fields(method),
            ")",
        );
        w.close("}");
        self.write_struct_type(
            w,
            &format!("{}.{}ReturnsOnCall[i] = ", fake, prefix),
            &return_fields(method),
            &format!("{{{}}}", method.return_names()),
        );
        w.close("}");
    }

    fn write_invocations(&self, w: &mut CodeWriter) {
        let fake = self.receiver;
        w.open(format!(
            "func ({} *{}) Invocations() {} {{",
            fake, self.spec.name, LEDGER_TYPE
        ));
        for method in &self.spec.methods {
            let prefix = method.field_prefix();
            w.line(format!("{}.{}Mutex.RLock()", fake, prefix));
            w.line(format!("defer {}.{}Mutex.RUnlock()", fake, prefix));
        }
        w.line(format!("{}.invocationsMutex.RLock()", fake));
        w.line(format!("defer {}.invocationsMutex.RUnlock()", fake));
        w.line(format!("copiedInvocations := {}{{}}", LEDGER_TYPE));
        w.open(format!("for key, value := range {}.invocations {{", fake));
        w.line("calls := make([][]interface{}, len(value))");
        w.open("for i, args := range value {");
        w.line("calls[i] = make([]interface{}, len(args))");
        w.line("copy(calls[i], args)");
        w.close("}");
        w.line("copiedInvocations[key] = calls");
        w.close("}");
        w.line("return copiedInvocations");
        w.close("}");
    }

    fn write_record_invocation(&self, w: &mut CodeWriter) {
        let fake = self.receiver;
        w.open(format!(
            "func ({} *{}) recordInvocation(key string, args []interface{{}}) {{",
            fake, self.spec.name
        ));
        w.line(format!("{}.invocationsMutex.Lock()", fake));
        w.line(format!("defer {}.invocationsMutex.Unlock()", fake));
        w.open(format!("if {}.invocations == nil {{", fake));
        w.line(format!("{}.invocations = {}{{}}", fake, LEDGER_TYPE));
        w.close("}");
        w.open(format!("if {}.invocations[key] == nil {{", fake));
        w.line(format!("{}.invocations[key] = [][]interface{{}}{{}}", fake));
        w.close("}");
        w.line(format!(
            "{0}.invocations[key] = append({0}.invocations[key], args)",
            fake
        ));
        w.close("}");
    }
}

/// Fields of the recorded-arguments struct, slice form for variadics.
fn args_fields(method: &MethodDescriptor) -> Vec<String> {
    method
        .params
        .iter()
        .map(|p| format!("{} {}", p.name, p.ty))
        .collect()
}

fn return_fields(method: &MethodDescriptor) -> Vec<String> {
    method
        .returns
        .iter()
        .map(|r| format!("{} {}", r.name, r.ty))
        .collect()
}
