//! Go fake generator.
//!
//! Resolves an interface through a [`phony_core::SymbolResolver`], builds a
//! [`FakeSpec`] describing every method and import, and emits Go source for
//! a concurrency-safe fake implementing the interface.

pub mod emit;
pub mod fake;
pub mod imports;
pub mod locator;
pub mod method;
pub mod render;

pub use emit::FakeEmitter;
pub use fake::{generate, FakeSpec, GenerateRequest};
pub use imports::{Import, ImportRegistry};
pub use locator::{locate_interface, method_set, LocatedInterface};
pub use method::{MethodDescriptor, Param, Return};
pub use render::{ImportCollector, TypeRenderer};
