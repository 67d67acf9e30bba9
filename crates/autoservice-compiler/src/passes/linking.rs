//! Linking Pass (Pass 2) - Resolve type alias targets and supertypes.
//!
//! Runs after every source declaration is registered, so forward references
//! and references across files resolve.
//!
//! ## Order
//!
//! 1. Alias targets, so a supertype written through an alias can expand.
//! 2. Supertypes, each expanded to the class it names.
//!
//! Each step resolves against an unchanged registry first and applies the
//! results afterwards. The first supertype round uses
//! [`ResolutionMode::Linking`], which never consults the supertype graph.
//! Supertypes still unresolved are retried in [`ResolutionMode::Full`]
//! until a round adds no edge, so a nested name inherited through an
//! enclosing class's supertypes links once that supertype is known. What
//! never resolves is logged and skipped: an incomplete supertype graph only
//! narrows later lookups.

use autoservice_core::{ClassId, FqName};
use autoservice_parser::ast::TypeRef;
use autoservice_registry::SymbolRegistry;
use tracing::debug;

use crate::passes::{PendingLinks, PendingSupertypes};
use crate::resolver::{NameResolver, ResolutionContext, ResolutionMode, TypeReference};

/// Output of the linking pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkingOutput {
    pub aliases_linked: usize,
    pub supertypes_linked: usize,
    /// References that could not be resolved and were skipped.
    pub unresolved: usize,
}

/// Pass 2: Link aliases and supertypes.
pub struct LinkingPass<'a> {
    registry: &'a mut SymbolRegistry,
}

impl<'a> LinkingPass<'a> {
    pub fn new(registry: &'a mut SymbolRegistry) -> Self {
        Self { registry }
    }

    /// Run the linking pass.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(self, pending: &PendingLinks<'_>) -> LinkingOutput {
        let mut output = LinkingOutput::default();

        let targets: Vec<(FqName, FqName)> = {
            let resolver = NameResolver::with_mode(self.registry, ResolutionMode::Linking);
            pending
                .aliases
                .iter()
                .filter_map(|alias| {
                    let context = ResolutionContext::new(&alias.file, &[]);
                    match resolve(&resolver, alias.target, &context) {
                        Some(target) => Some((alias.name.clone(), target)),
                        None => {
                            debug!(alias = %alias.name, target = alias.target.text, "unresolved alias target");
                            output.unresolved += 1;
                            None
                        }
                    }
                })
                .collect()
        };
        for (name, target) in targets {
            if self.registry.link_type_alias(&name, target) {
                output.aliases_linked += 1;
            }
        }

        let mut remaining: Vec<(&PendingSupertypes<'_>, &TypeRef<'_>)> = pending
            .classes
            .iter()
            .flat_map(|class| class.supertypes.iter().map(move |supertype| (class, supertype)))
            .collect();
        let mut mode = ResolutionMode::Linking;
        loop {
            let (edges, unresolved) = self.resolve_supertypes(&remaining, mode);
            for (subtype, supertype) in &edges {
                self.registry.add_supertype(subtype, supertype);
            }
            output.supertypes_linked += edges.len();
            remaining = unresolved;
            if remaining.is_empty() || (edges.is_empty() && mode == ResolutionMode::Full) {
                break;
            }
            mode = ResolutionMode::Full;
        }
        for (class, supertype) in &remaining {
            debug!(class = %class.class, supertype = supertype.text, "unresolved supertype");
        }
        output.unresolved += remaining.len();

        debug!(
            aliases = output.aliases_linked,
            supertypes = output.supertypes_linked,
            unresolved = output.unresolved,
            "linking complete"
        );
        output
    }

    /// Resolve one round of supertypes against the current registry.
    fn resolve_supertypes<'p, 'ast>(
        &self,
        pending: &[(&'p PendingSupertypes<'ast>, &'ast TypeRef<'ast>)],
        mode: ResolutionMode,
    ) -> (
        Vec<(ClassId, ClassId)>,
        Vec<(&'p PendingSupertypes<'ast>, &'ast TypeRef<'ast>)>,
    ) {
        let resolver = NameResolver::with_mode(&*self.registry, mode);
        let mut edges = Vec::new();
        let mut unresolved = Vec::new();
        for &(class, supertype) in pending {
            let context = ResolutionContext::new(&class.file, &class.scopes);
            let resolved = resolve(&resolver, supertype, &context)
                .and_then(|name| self.registry.resolve_classifier(&name))
                .map(|entry| entry.id.clone());
            match resolved {
                Some(id) => edges.push((class.class.clone(), id)),
                None => unresolved.push((class, supertype)),
            }
        }
        (edges, unresolved)
    }
}

fn resolve(
    resolver: &NameResolver<'_>,
    type_ref: &TypeRef<'_>,
    context: &ResolutionContext<'_, '_>,
) -> Option<FqName> {
    resolver
        .resolve(&TypeReference::TypeRef(type_ref), context)
        .ok()
}
