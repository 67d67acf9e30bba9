//! Symbol passes over the source set.
//!
//! - [`registration`]: Pass 1 - register every source class and type alias
//! - [`linking`]: Pass 2 - resolve alias targets and supertypes into the registry
//!
//! Registration records what linking needs in [`PendingLinks`], so a
//! supertype may name a class declared later or in another file.

pub mod linking;
pub mod registration;

pub use linking::{LinkingOutput, LinkingPass};
pub use registration::{RegistrationOutput, RegistrationPass};

use autoservice_core::{ClassId, FqName};
use autoservice_parser::ast::{KtFile, TypeRef};

/// Direct supertypes of a source class, not yet resolved.
#[derive(Debug, Clone)]
pub struct PendingSupertypes<'ast> {
    pub file: KtFile<'ast>,
    pub class: ClassId,
    /// Enclosing classes, innermost first.
    pub scopes: Vec<ClassId>,
    pub supertypes: &'ast [TypeRef<'ast>],
}

/// A source type alias whose target is not yet resolved.
#[derive(Debug, Clone)]
pub struct PendingAlias<'ast> {
    pub file: KtFile<'ast>,
    pub name: FqName,
    pub target: &'ast TypeRef<'ast>,
}

#[derive(Debug, Clone, Default)]
pub struct PendingLinks<'ast> {
    pub classes: Vec<PendingSupertypes<'ast>>,
    pub aliases: Vec<PendingAlias<'ast>>,
}
