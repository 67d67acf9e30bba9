//! Annotation-driven service provider registration.
//!
//! Classes annotated with `@AutoService(Iface::class)` are collected from
//! Kotlin sources or compiled class files, and a
//! `META-INF/services/<Iface>` manifest is generated for every interface.
//!
//! # Example
//!
//! ```
//! use autoservice::prelude::*;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let mut sources = SourceSet::new();
//! sources.add_source(&arena, "Task.kt", r#"
//!     package com.example
//!
//!     import com.google.auto.service.AutoService
//!
//!     @AutoService(Runnable::class)
//!     class Task : Runnable {
//!         override fun run() {}
//!     }
//! "#)?;
//!
//! let mapping = analyze(&sources, &SymbolRegistry::with_platform_types())?;
//! let providers = mapping.get("java.lang.Runnable").unwrap();
//! assert!(providers.contains("com.example.Task"));
//! # Ok::<(), AnalysisError>(())
//! ```

pub mod cli;
pub mod error;

pub use autoservice_classfile as classfile;
pub use autoservice_compiler as compiler;
pub use autoservice_core as core;
pub use autoservice_parser as parser;
pub use autoservice_registry as registry;

pub use error::CliError;

pub mod prelude {
    pub use autoservice_compiler::{
        AnalysisError, BinaryExtractor, CommandLineProcessor, ManifestWriter, PluginConfiguration,
        PluginOptions, ProviderExtractor, ProviderMapping, RunOutcome, SourceExtractor, SourceSet,
        analyze, run,
    };
    pub use autoservice_core::{ClassId, Diagnostic, Diagnostics, FqName};
    pub use autoservice_registry::SymbolRegistry;
}
