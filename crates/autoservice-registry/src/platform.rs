//! Built-in platform types.
//!
//! The implicit-import packages of the language are always visible to the
//! resolver. Registering their most common members keeps resolution of
//! `Runnable::class` or `Comparable::class` working when no standard
//! library is on the classpath. Classpath entries replace these.

use autoservice_core::{ClassId, FqName};

use crate::entry::{ClassEntry, ClassKind, Origin};
use crate::registry::SymbolRegistry;

use ClassKind::{AnnotationClass, Class, Interface};

/// `(package, simple name, kind, direct supertypes)`
type PlatformType = (&'static str, &'static str, ClassKind, &'static [&'static str]);

const PLATFORM_TYPES: &[PlatformType] = &[
    ("kotlin", "Any", Class, &[]),
    ("kotlin", "Nothing", Class, &[]),
    ("kotlin", "Unit", Class, &["kotlin.Any"]),
    ("kotlin", "Annotation", Interface, &[]),
    ("kotlin", "CharSequence", Interface, &[]),
    ("kotlin", "Comparable", Interface, &[]),
    ("kotlin", "Function", Interface, &[]),
    ("kotlin", "Lazy", Interface, &[]),
    ("kotlin", "Number", Class, &["kotlin.Any"]),
    ("kotlin", "String", Class, &["kotlin.Comparable", "kotlin.CharSequence"]),
    ("kotlin", "Int", Class, &["kotlin.Number", "kotlin.Comparable"]),
    ("kotlin", "Long", Class, &["kotlin.Number", "kotlin.Comparable"]),
    ("kotlin", "Boolean", Class, &["kotlin.Comparable"]),
    ("kotlin", "Enum", Class, &["kotlin.Comparable"]),
    ("kotlin", "Throwable", Class, &["kotlin.Any"]),
    ("kotlin", "PublishedApi", AnnotationClass, &["kotlin.Annotation"]),
    ("kotlin.collections", "Iterator", Interface, &[]),
    ("kotlin.collections", "Iterable", Interface, &[]),
    ("kotlin.collections", "MutableIterable", Interface, &["kotlin.collections.Iterable"]),
    ("kotlin.collections", "Collection", Interface, &["kotlin.collections.Iterable"]),
    (
        "kotlin.collections",
        "MutableCollection",
        Interface,
        &["kotlin.collections.Collection", "kotlin.collections.MutableIterable"],
    ),
    ("kotlin.collections", "List", Interface, &["kotlin.collections.Collection"]),
    (
        "kotlin.collections",
        "MutableList",
        Interface,
        &["kotlin.collections.List", "kotlin.collections.MutableCollection"],
    ),
    ("kotlin.collections", "Set", Interface, &["kotlin.collections.Collection"]),
    (
        "kotlin.collections",
        "MutableSet",
        Interface,
        &["kotlin.collections.Set", "kotlin.collections.MutableCollection"],
    ),
    ("kotlin.collections", "Map", Interface, &[]),
    ("kotlin.collections", "MutableMap", Interface, &["kotlin.collections.Map"]),
    ("kotlin.jvm", "JvmStatic", AnnotationClass, &["kotlin.Annotation"]),
    ("kotlin.jvm", "JvmField", AnnotationClass, &["kotlin.Annotation"]),
    ("kotlin.jvm", "JvmSuppressWildcards", AnnotationClass, &["kotlin.Annotation"]),
    ("java.lang", "Object", Class, &[]),
    ("java.lang", "AutoCloseable", Interface, &[]),
    ("java.lang", "Cloneable", Interface, &[]),
    ("java.lang", "Runnable", Interface, &[]),
    ("java.lang", "Comparable", Interface, &[]),
    ("java.lang", "Iterable", Interface, &[]),
    ("java.lang", "CharSequence", Interface, &[]),
    ("java.lang", "Thread", Class, &["java.lang.Object", "java.lang.Runnable"]),
    ("java.lang", "Throwable", Class, &["java.lang.Object"]),
    ("java.lang", "Exception", Class, &["java.lang.Throwable"]),
    ("java.lang", "RuntimeException", Class, &["java.lang.Exception"]),
];

fn top_level(fq_name: &str) -> ClassId {
    let name = FqName::from_dotted(fq_name);
    ClassId::top_level(name.parent(), name.short_name())
}

pub(crate) fn register_platform_types(registry: &mut SymbolRegistry) {
    for (package, name, kind, supertypes) in PLATFORM_TYPES {
        let id = ClassId::top_level(FqName::from_dotted(package), *name);
        for supertype in *supertypes {
            registry.add_supertype(&id, &top_level(supertype));
        }
        // Platform names are unique, so registration cannot collide.
        let _ = registry.register_class(ClassEntry::new(id, *kind, Origin::Platform));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_packages_are_populated() {
        let registry = SymbolRegistry::with_platform_types();
        for name in [
            "kotlin.Any",
            "kotlin.collections.List",
            "kotlin.jvm.JvmSuppressWildcards",
            "java.lang.Runnable",
        ] {
            assert!(registry.contains_class(&FqName::from_dotted(name)), "{name}");
        }
        assert_eq!(registry.class_count(), PLATFORM_TYPES.len());
    }

    #[test]
    fn platform_supertypes() {
        let registry = SymbolRegistry::with_platform_types();
        let closure: Vec<String> = registry
            .supertype_closure(&top_level("kotlin.collections.MutableList"))
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            closure,
            [
                "kotlin.collections.MutableList",
                "kotlin.collections.List",
                "kotlin.collections.MutableCollection",
                "kotlin.collections.Collection",
                "kotlin.collections.MutableIterable",
                "kotlin.collections.Iterable",
            ]
        );
    }
}
