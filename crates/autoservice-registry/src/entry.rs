use autoservice_core::{ClassId, FqName};

/// Kind of a registered class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    EnumClass,
    AnnotationClass,
}

/// Where a registry entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Declared in the sources being compiled.
    Source,
    /// Read from a classpath directory, jar or class file.
    Classpath,
    /// Built-in platform type available without a classpath.
    Platform,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub id: ClassId,
    pub kind: ClassKind,
    pub origin: Origin,
}

impl ClassEntry {
    pub fn new(id: ClassId, kind: ClassKind, origin: Origin) -> Self {
        Self { id, kind, origin }
    }

    pub fn fq_name(&self) -> FqName {
        self.id.as_fq_name()
    }
}

/// A `typealias` declaration. The target stays unset until linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasEntry {
    pub name: FqName,
    pub target: Option<FqName>,
    pub origin: Origin,
}
