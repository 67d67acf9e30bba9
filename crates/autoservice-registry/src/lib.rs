//! Registry of the classes and type aliases visible to name resolution.
//!
//! The [`SymbolRegistry`] stores classes in a package tree and their direct
//! supertypes in a separate graph. It is filled from built-in platform types,
//! classpath entries and the source declarations of the current run.

pub mod classpath;
pub mod entry;
pub mod error;
pub mod package_tree;
mod platform;
pub mod registry;
pub mod supertype_graph;

pub use classpath::{ClassFileEntry, collect_class_files};
pub use entry::{ClassEntry, ClassKind, Origin, TypeAliasEntry};
pub use error::{ClasspathError, RegistrationError};
pub use package_tree::{PackageData, PackageEdge, PackageTree};
pub use registry::SymbolRegistry;
pub use supertype_graph::SupertypeGraph;
