//! The ordered lookup chain for a single reference text.
//!
//! Each step is a pure function of the lookup and the registry. The first
//! step returning a name wins.

use autoservice_core::{ClassId, FqName};
use autoservice_parser::ast::{ImportDirective, KtFile};

use super::{NameResolver, ResolutionMode};

/// Packages visible in every file without an import, in lookup order.
pub const IMPLICIT_PACKAGES: &[&str] = &["kotlin", "kotlin.collections", "kotlin.jvm", "java.lang"];

/// One reference text in its lexical context.
pub(crate) struct Lookup<'l> {
    pub reference: &'l str,
    pub file: &'l KtFile<'l>,
    pub package: &'l FqName,
    /// Enclosing classes, innermost first.
    pub scopes: &'l [ClassId],
}

pub(crate) type Step = fn(&NameResolver<'_>, &Lookup<'_>) -> Option<FqName>;

pub(crate) const STEPS: &[(&str, Step)] = &[
    ("exact import", exact_import),
    ("outer segment import", outer_segment_import),
    ("same package", same_package),
    ("implicit package", implicit_package),
    ("enclosing scope", enclosing_scope),
    ("wildcard import", wildcard_import),
    ("named import", named_import),
];

fn plain_imports<'l>(lookup: &Lookup<'l>) -> impl Iterator<Item = &'l ImportDirective<'l>> {
    lookup
        .file
        .imports
        .iter()
        .filter(|import| !import.is_all_under && import.alias.is_none())
}

/// Accept a lone candidate as is; with several, take the first that exists.
fn pick(resolver: &NameResolver<'_>, candidates: Vec<FqName>) -> Option<FqName> {
    if candidates.len() == 1 {
        return candidates.into_iter().next();
    }
    candidates
        .into_iter()
        .find(|candidate| resolver.classifier_exists(candidate))
}

fn exact_import(resolver: &NameResolver<'_>, lookup: &Lookup<'_>) -> Option<FqName> {
    let candidates = plain_imports(lookup)
        .filter(|import| import.path.short_name() == lookup.reference)
        .map(ImportDirective::fq_name)
        .collect();
    pick(resolver, candidates)
}

fn outer_segment_import(resolver: &NameResolver<'_>, lookup: &Lookup<'_>) -> Option<FqName> {
    let (outer, _) = lookup.reference.split_once('.')?;
    let candidates = plain_imports(lookup)
        .filter(|import| import.path.short_name() == outer)
        .map(|import| import.fq_name().parent().join(lookup.reference))
        .collect();
    pick(resolver, candidates)
}

fn same_package(resolver: &NameResolver<'_>, lookup: &Lookup<'_>) -> Option<FqName> {
    let candidate = lookup.package.join(lookup.reference);
    resolver.classifier_exists(&candidate).then_some(candidate)
}

fn implicit_package(resolver: &NameResolver<'_>, lookup: &Lookup<'_>) -> Option<FqName> {
    IMPLICIT_PACKAGES.iter().find_map(|package| {
        let candidate = FqName::from_dotted(package).join(lookup.reference);
        resolver.class_exists(&candidate).then_some(candidate)
    })
}

/// Nested classes of each enclosing class, then of its supertypes.
fn enclosing_scope(resolver: &NameResolver<'_>, lookup: &Lookup<'_>) -> Option<FqName> {
    let nested_in = |outer: &ClassId| {
        let candidate = ClassId::new(outer.package().clone(), outer.relative().join(lookup.reference));
        resolver
            .registry
            .get_class(&candidate)
            .map(|_| candidate.as_fq_name())
    };

    for scope in lookup.scopes {
        if let Some(found) = nested_in(scope) {
            return Some(found);
        }
        if resolver.mode == ResolutionMode::Linking {
            continue;
        }
        let closure = resolver.registry.supertype_closure(scope);
        if let Some(found) = closure.iter().skip(1).find_map(&nested_in) {
            return Some(found);
        }
    }
    None
}

fn wildcard_import(resolver: &NameResolver<'_>, lookup: &Lookup<'_>) -> Option<FqName> {
    lookup
        .file
        .imports
        .iter()
        .filter(|import| import.is_all_under)
        .map(|import| import.fq_name().join(lookup.reference))
        .find(|candidate| resolver.classifier_exists(candidate))
}

fn named_import(_: &NameResolver<'_>, lookup: &Lookup<'_>) -> Option<FqName> {
    lookup
        .file
        .imports
        .iter()
        .find(|import| import.imported_name() == Some(lookup.reference))
        .map(ImportDirective::fq_name)
}
