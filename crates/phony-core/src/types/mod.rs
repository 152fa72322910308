//! Type graph model shared between the symbol resolver and the generator.
//!
//! Descriptors mirror the shapes a Go type checker reports for parameter and
//! result types. They are plain data so that resolvers can produce them from
//! any source (JSON manifests, a live type checker, test fixtures).

mod decl;
mod desc;

pub use decl::{MethodDecl, TypeDecl};
pub use desc::{ChanDir, Field, PackageRef, Signature, TypeDesc, Var};
