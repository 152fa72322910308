pub mod config;
pub mod error;
pub mod resolver;
pub mod types;

pub use config::PhonyConfig;
pub use error::{PhonyError, Result};
pub use resolver::{devendor, ManifestResolver, Package, PackageManifest, Scope, SymbolResolver};
pub use types::{ChanDir, Field, MethodDecl, PackageRef, Signature, TypeDecl, TypeDesc, Var};
