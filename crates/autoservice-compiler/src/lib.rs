//! Service provider analysis.
//!
//! Collects classes annotated with `@AutoService(Iface::class)` and writes
//! `META-INF/services/<Iface>` manifests listing their binary names.
//!
//! ## Architecture
//!
//! - **Pass 1 (Registration)**: Register every source class and type alias
//! - **Pass 2 (Linking)**: Resolve alias targets and supertypes
//! - **Scan**: Find annotated declarations syntactically
//! - **Index**: Resolve annotation arguments into the [`ProviderMapping`]
//!
//! [`analyze`] runs these over a [`SourceSet`]. [`run`] wraps an extractor
//! with the output directory handling of one plugin invocation.
//!
//! ## Modules
//!
//! - [`scanner`]: Annotation detection without semantic information
//! - [`resolver`]: Type reference to fully qualified name resolution
//! - [`passes`]: Registration and linking into the symbol registry
//! - [`provider_index`]: Interface to implementer mapping
//! - [`manifest`]: Manifest file output
//! - [`extractor`]: Source and class file extractors
//! - [`options`]: Plugin options and command line processing

pub mod analysis;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod manifest;
pub mod options;
pub mod passes;
pub mod provider_index;
pub mod resolver;
pub mod scanner;
pub mod source_set;

pub use analysis::analyze;
pub use driver::{RunOutcome, run};
pub use error::AnalysisError;
pub use extractor::{AUTO_SERVICE_DESCRIPTOR, BinaryExtractor, ProviderExtractor, SourceExtractor};
pub use manifest::{ManifestWriter, SERVICES_DIR};
pub use options::{
    CommandLineProcessor, OptionError, PLUGIN_ID, PluginConfiguration, PluginOptions, src_gen_dir,
};
pub use passes::{LinkingOutput, LinkingPass, RegistrationOutput, RegistrationPass};
pub use provider_index::{ProviderIndexBuilder, ProviderMapping};
pub use resolver::{NameResolver, ResolutionContext, ResolutionMode, TypeReference};
pub use scanner::{AUTO_SERVICE, AnnotationScanner, ScannedDeclaration, find_annotation};
pub use source_set::{SourceFile, SourceSet, read_source_files};
