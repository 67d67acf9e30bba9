//! SymbolRegistry - every class and type alias the resolver can see.
//!
//! The registry answers existence questions by fully qualified name and
//! exposes supertype information. It is populated in layers:
//!
//! - **Platform**: a handful of `kotlin.*` and `java.lang.*` types, so
//!   implicit-import resolution works without a standard library jar.
//! - **Classpath**: classes read from directories, jars and class files.
//! - **Source**: classes and type aliases declared in the compiled sources,
//!   added by the registration pass and linked afterwards.
//!
//! Source declarations shadow classpath and platform entries of the same
//! name. Two source declarations of the same name are an error.
//!
//! # Example
//!
//! ```
//! use autoservice_core::{ClassId, FqName};
//! use autoservice_registry::{ClassEntry, ClassKind, Origin, SymbolRegistry};
//!
//! let mut registry = SymbolRegistry::new();
//! let outer = ClassId::top_level(FqName::from_dotted("com.example"), "Outer");
//! registry
//!     .register_class(ClassEntry::new(outer.nested("Inner"), ClassKind::Class, Origin::Source))
//!     .unwrap();
//!
//! let found = registry.find_class(&FqName::from_dotted("com.example.Outer.Inner")).unwrap();
//! assert_eq!(found.id.binary_name(), "com.example.Outer$Inner");
//! ```

use std::rc::Rc;

use autoservice_classfile::{AccessFlags, ClassFile};
use autoservice_core::{ClassId, FqName};
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::entry::{ClassEntry, ClassKind, Origin, TypeAliasEntry};
use crate::error::RegistrationError;
use crate::package_tree::PackageTree;
use crate::supertype_graph::SupertypeGraph;

/// Longest alias chain followed before giving up.
const MAX_ALIAS_DEPTH: usize = 16;

#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    packages: PackageTree,
    supertypes: SupertypeGraph,
    class_count: usize,
}

impl SymbolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in platform types pre-registered.
    pub fn with_platform_types() -> Self {
        let mut registry = Self::new();
        crate::platform::register_platform_types(&mut registry);
        registry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class.
    ///
    /// A source declaration replaces classpath and platform entries. Two
    /// source declarations of one name are an error, and between classpath
    /// entries the first one registered stays, as on the JVM.
    pub fn register_class(&mut self, entry: ClassEntry) -> Result<(), RegistrationError> {
        let node = self
            .packages
            .get_or_create_path(entry.id.package().segments());
        let key = entry.id.relative().to_string();

        let Some(package) = self.packages.package_mut(node) else {
            return Ok(());
        };
        if let Some(existing) = package.classes.get(&key) {
            if existing.origin == Origin::Source && entry.origin == Origin::Source {
                return Err(RegistrationError::DuplicateClass(entry.id.to_string()));
            }
            if existing.origin == Origin::Classpath && entry.origin == Origin::Classpath {
                return Ok(());
            }
        } else {
            self.class_count += 1;
        }
        package.classes.insert(key, entry);
        Ok(())
    }

    /// Register a type alias, optionally with an already known target.
    pub fn register_type_alias(
        &mut self,
        name: FqName,
        target: Option<FqName>,
        origin: Origin,
    ) -> Result<(), RegistrationError> {
        let node = self
            .packages
            .get_or_create_path(name.parent().segments());
        let Some(package) = self.packages.package_mut(node) else {
            return Ok(());
        };
        let key = name.short_name().to_string();
        if let Some(existing) = package.type_aliases.get(&key)
            && existing.origin == Origin::Source
            && origin == Origin::Source
        {
            return Err(RegistrationError::DuplicateTypeAlias(name.to_string()));
        }
        package
            .type_aliases
            .insert(key, TypeAliasEntry { name, target, origin });
        Ok(())
    }

    /// Set the target of a registered alias. Returns `false` if no such alias exists.
    pub fn link_type_alias(&mut self, name: &FqName, target: FqName) -> bool {
        let Some(node) = self.packages.get_path(name.parent().segments()) else {
            return false;
        };
        match self
            .packages
            .package_mut(node)
            .and_then(|package| package.type_aliases.get_mut(name.short_name()))
        {
            Some(alias) => {
                alias.target = Some(target);
                true
            }
            None => false,
        }
    }

    /// Record that `subtype` directly extends or implements `supertype`.
    pub fn add_supertype(&mut self, subtype: &ClassId, supertype: &ClassId) {
        self.supertypes.add_edge(subtype, supertype);
    }

    /// Register a class read from a class file, with its direct supertypes.
    ///
    /// Module descriptors and anonymous or local classes are skipped; returns
    /// whether the class was registered.
    pub fn register_class_file(&mut self, class: &ClassFile) -> bool {
        if class.is_module() {
            return false;
        }
        let Some(id) = class.class_id() else {
            return false;
        };
        if self
            .get_class(&id)
            .is_some_and(|existing| existing.origin == Origin::Classpath)
        {
            trace!(class = %id, "shadowed by an earlier classpath entry");
            return false;
        }

        let kind = if class.is_annotation() {
            ClassKind::AnnotationClass
        } else if class.is_interface() {
            ClassKind::Interface
        } else if class.access.contains(AccessFlags::ENUM) {
            ClassKind::EnumClass
        } else {
            ClassKind::Class
        };

        for supertype in class.supertypes().filter_map(ClassId::from_internal_name) {
            self.add_supertype(&id, &supertype);
        }

        self.register_class(ClassEntry::new(id, kind, Origin::Classpath))
            .is_ok()
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Find a class by its dotted fully qualified name.
    ///
    /// The package/class boundary is not visible in a dotted name, so every
    /// split is tried, longest package first.
    pub fn find_class(&self, name: &FqName) -> Option<&ClassEntry> {
        let segments = name.segments();
        (0..segments.len()).rev().find_map(|split| {
            let node = self.packages.get_path(&segments[..split])?;
            let relative = segments[split..].join(".");
            self.packages.package(node)?.classes.get(&relative)
        })
    }

    pub fn contains_class(&self, name: &FqName) -> bool {
        self.find_class(name).is_some()
    }

    pub fn get_class(&self, id: &ClassId) -> Option<&ClassEntry> {
        let node = self.packages.get_path(id.package().segments())?;
        self.packages
            .package(node)?
            .classes
            .get(&id.relative().to_string())
    }

    pub fn find_type_alias(&self, name: &FqName) -> Option<&TypeAliasEntry> {
        let node = self.packages.get_path(name.parent().segments())?;
        self.packages
            .package(node)?
            .type_aliases
            .get(name.short_name())
    }

    /// Follow a type alias (and aliases of aliases) to the class it names.
    ///
    /// Unlinked aliases, cycles and chains longer than 16 expand to nothing.
    pub fn expand_type_alias(&self, name: &FqName) -> Option<&ClassEntry> {
        let mut visited = FxHashSet::default();
        let mut current = self.find_type_alias(name)?;
        for _ in 0..MAX_ALIAS_DEPTH {
            if !visited.insert(&current.name) {
                return None;
            }
            let target = current.target.as_ref()?;
            if let Some(class) = self.find_class(target) {
                return Some(class);
            }
            current = self.find_type_alias(target)?;
        }
        None
    }

    /// A class by name, or the class an alias of that name expands to.
    pub fn resolve_classifier(&self, name: &FqName) -> Option<&ClassEntry> {
        self.find_class(name)
            .or_else(|| self.expand_type_alias(name))
    }

    /// Direct supertypes in declaration order.
    pub fn supertypes(&self, id: &ClassId) -> Vec<ClassId> {
        self.supertypes.direct(id)
    }

    /// The class itself followed by all its supertypes, breadth-first.
    pub fn supertype_closure(&self, id: &ClassId) -> Rc<[ClassId]> {
        self.supertypes.closure(id)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.packages
            .packages()
            .flat_map(|(_, package)| package.classes.values())
    }

    pub fn type_aliases(&self) -> impl Iterator<Item = &TypeAliasEntry> {
        self.packages
            .packages()
            .flat_map(|(_, package)| package.type_aliases.values())
    }

    pub fn class_count(&self) -> usize {
        self.class_count
    }

    pub fn has_package(&self, name: &FqName) -> bool {
        self.packages.get_path(name.segments()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fq(name: &str) -> FqName {
        FqName::from_dotted(name)
    }

    fn source_class(package: &str, relative: &str) -> ClassEntry {
        ClassEntry::new(
            ClassId::new(fq(package), fq(relative)),
            ClassKind::Class,
            Origin::Source,
        )
    }

    #[test]
    fn find_nested_class_by_dotted_name() {
        let mut registry = SymbolRegistry::new();
        registry
            .register_class(source_class("a.b", "Outer.Inner"))
            .unwrap();

        let entry = registry.find_class(&fq("a.b.Outer.Inner")).unwrap();
        assert_eq!(entry.id.package().to_string(), "a.b");
        assert!(registry.find_class(&fq("a.b.Inner")).is_none());
        assert!(registry.find_class(&fq("a.b")).is_none());
        assert!(registry.has_package(&fq("a.b")));
    }

    #[test]
    fn root_package_classes() {
        let mut registry = SymbolRegistry::new();
        registry.register_class(source_class("", "Main")).unwrap();
        assert!(registry.contains_class(&fq("Main")));
        assert!(!registry.contains_class(&FqName::root()));
    }

    #[test]
    fn source_redeclaration_is_an_error() {
        let mut registry = SymbolRegistry::new();
        registry.register_class(source_class("p", "Dup")).unwrap();
        assert_eq!(
            registry.register_class(source_class("p", "Dup")),
            Err(RegistrationError::DuplicateClass("p.Dup".into()))
        );
        assert_eq!(registry.class_count(), 1);
    }

    #[test]
    fn source_shadows_platform() {
        let mut registry = SymbolRegistry::with_platform_types();
        let before = registry.class_count();
        let any = registry.find_class(&fq("kotlin.Any")).unwrap();
        assert_eq!(any.origin, Origin::Platform);

        registry.register_class(source_class("kotlin", "Any")).unwrap();
        assert_eq!(
            registry.find_class(&fq("kotlin.Any")).unwrap().origin,
            Origin::Source
        );
        assert_eq!(registry.class_count(), before);
    }

    #[test]
    fn alias_expansion() {
        let mut registry = SymbolRegistry::new();
        registry.register_class(source_class("p", "Real")).unwrap();
        registry
            .register_type_alias(fq("p.First"), None, Origin::Source)
            .unwrap();
        registry
            .register_type_alias(fq("q.Second"), Some(fq("p.First")), Origin::Source)
            .unwrap();

        assert!(registry.expand_type_alias(&fq("q.Second")).is_none());
        assert!(registry.link_type_alias(&fq("p.First"), fq("p.Real")));

        let expanded = registry.resolve_classifier(&fq("q.Second")).unwrap();
        assert_eq!(expanded.id.to_string(), "p.Real");
        assert!(!registry.link_type_alias(&fq("p.Missing"), fq("p.Real")));
    }

    #[test]
    fn alias_cycle_expands_to_nothing() {
        let mut registry = SymbolRegistry::new();
        registry
            .register_type_alias(fq("p.A"), Some(fq("p.B")), Origin::Source)
            .unwrap();
        registry
            .register_type_alias(fq("p.B"), Some(fq("p.A")), Origin::Source)
            .unwrap();
        assert!(registry.expand_type_alias(&fq("p.A")).is_none());
        assert_eq!(registry.type_aliases().count(), 2);
    }

    #[test]
    fn class_file_registration() {
        use autoservice_classfile::ClassFileBuilder;

        let mut registry = SymbolRegistry::new();
        let bytes = ClassFileBuilder::new("lib/Impl")
            .super_class("lib/Base")
            .interface("lib/Service")
            .build();
        assert!(registry.register_class_file(&ClassFile::parse(&bytes).unwrap()));

        let service = ClassFileBuilder::new("lib/Service")
            .access(AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
            .build();
        assert!(registry.register_class_file(&ClassFile::parse(&service).unwrap()));

        let anonymous = ClassFileBuilder::new("lib/Impl$1").build();
        assert!(!registry.register_class_file(&ClassFile::parse(&anonymous).unwrap()));

        let impl_id = registry.find_class(&fq("lib.Impl")).unwrap().id.clone();
        let closure: Vec<String> = registry
            .supertype_closure(&impl_id)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            closure,
            ["lib.Impl", "lib.Base", "lib.Service", "java.lang.Object"]
        );
        assert_eq!(
            registry.find_class(&fq("lib.Service")).unwrap().kind,
            ClassKind::Interface
        );
    }

    #[test]
    fn first_classpath_entry_wins() {
        use autoservice_classfile::ClassFileBuilder;

        let mut registry = SymbolRegistry::new();
        let first = ClassFileBuilder::new("lib/Impl").interface("lib/First").build();
        let second = ClassFileBuilder::new("lib/Impl").interface("lib/Second").build();
        assert!(registry.register_class_file(&ClassFile::parse(&first).unwrap()));
        assert!(!registry.register_class_file(&ClassFile::parse(&second).unwrap()));

        let impl_id = registry.find_class(&fq("lib.Impl")).unwrap().id.clone();
        let direct: Vec<String> = registry
            .supertypes(&impl_id)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(direct, ["java.lang.Object", "lib.First"]);
        assert_eq!(registry.class_count(), 1);
    }
}
