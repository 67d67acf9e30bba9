//! Qualified names and class identities.
//!
//! [`FqName`] is the dotted name used as the primary key during resolution.
//! [`ClassId`] additionally knows where the package ends and the class
//! nesting begins, which is what the binary-name transform needs:
//!
//! ```
//! use autoservice_core::{ClassId, FqName};
//!
//! let id = ClassId::new(FqName::from_dotted("com.example"), FqName::from_dotted("Outer.Inner"));
//! assert_eq!(id.as_fq_name().to_string(), "com.example.Outer.Inner");
//! assert_eq!(id.binary_name(), "com.example.Outer$Inner");
//! assert_eq!(id.internal_name(), "com/example/Outer$Inner");
//! ```

use std::fmt;

/// Dot-separated fully qualified name.
///
/// The root name has no segments and displays as the empty string, so it can
/// be used as the package of files without a `package` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FqName {
    segments: Vec<String>,
}

impl FqName {
    /// The root (empty) name.
    pub fn root() -> Self {
        Self::default()
    }

    /// Create from already split segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Create from a dotted string (e.g. `"kotlin.collections.List"`).
    ///
    /// Empty segments are dropped, so `""` is the root and `"a..b"` is `a.b`.
    pub fn from_dotted(s: &str) -> Self {
        Self {
            segments: s
                .split('.')
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The name segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, or `""` for the root.
    pub fn short_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// All but the last segment. The parent of the root is the root.
    pub fn parent(&self) -> Self {
        match self.segments.split_last() {
            Some((_, rest)) => Self::new(rest.to_vec()),
            None => Self::root(),
        }
    }

    /// Append a single segment.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Append a dotted suffix (e.g. package `a.b` joined with `Outer.Inner`).
    pub fn join(&self, dotted: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(
            dotted
                .split('.')
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        );
        Self { segments }
    }

    /// Whether `prefix` is a leading run of segments of this name.
    pub fn starts_with(&self, prefix: &FqName) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Same as [`is_root`](Self::is_root).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for FqName {
    fn from(s: &str) -> Self {
        Self::from_dotted(s)
    }
}

/// Identity of a class: its package plus its nesting path inside the package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId {
    package: FqName,
    relative: FqName,
}

impl ClassId {
    /// Create from a package and a relative (possibly nested) class name.
    pub fn new(package: FqName, relative: FqName) -> Self {
        Self { package, relative }
    }

    /// A top-level class in `package`.
    pub fn top_level(package: FqName, name: impl Into<String>) -> Self {
        Self {
            package,
            relative: FqName::new(vec![name.into()]),
        }
    }

    /// A class nested directly inside this one.
    pub fn nested(&self, name: impl Into<String>) -> Self {
        Self {
            package: self.package.clone(),
            relative: self.relative.child(name),
        }
    }

    /// The directly enclosing class, if this class is nested.
    pub fn outer(&self) -> Option<Self> {
        if self.relative.len() > 1 {
            Some(Self {
                package: self.package.clone(),
                relative: self.relative.parent(),
            })
        } else {
            None
        }
    }

    pub fn package(&self) -> &FqName {
        &self.package
    }

    pub fn relative(&self) -> &FqName {
        &self.relative
    }

    pub fn short_name(&self) -> &str {
        self.relative.short_name()
    }

    pub fn is_nested(&self) -> bool {
        self.relative.len() > 1
    }

    /// The dotted fully qualified name (`pkg.Outer.Inner`).
    pub fn as_fq_name(&self) -> FqName {
        let mut segments = self.package.segments().to_vec();
        segments.extend(self.relative.segments().iter().cloned());
        FqName::new(segments)
    }

    /// The manifest form: packages joined by `.`, nesting joined by `$`.
    pub fn binary_name(&self) -> String {
        self.render('.')
    }

    /// The class file form: packages joined by `/`, nesting joined by `$`.
    pub fn internal_name(&self) -> String {
        self.render('/')
    }

    fn render(&self, package_separator: char) -> String {
        let nested = self.relative.segments().join("$");
        if self.package.is_root() {
            nested
        } else {
            let package = self.package.segments().join(&package_separator.to_string());
            format!("{package}{package_separator}{nested}")
        }
    }

    /// Parse a class file internal name (`com/example/Outer$Inner`).
    ///
    /// Returns `None` for names that cannot be referenced from source: empty
    /// names and anonymous or local classes (`Outer$1`, `Outer$1Local`).
    pub fn from_internal_name(internal: &str) -> Option<Self> {
        let (package, simple) = match internal.rsplit_once('/') {
            Some((package, simple)) => (FqName::from_dotted(&package.replace('/', ".")), simple),
            None => (FqName::root(), internal),
        };

        let mut relative = Vec::new();
        for segment in simple.split('$') {
            if segment.is_empty() || segment.starts_with(|c: char| c.is_ascii_digit()) {
                return None;
            }
            relative.push(segment.to_string());
        }

        Some(Self::new(package, FqName::new(relative)))
    }

    /// Parse a field descriptor naming a class (`Lcom/example/Foo;`).
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        descriptor
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
            .and_then(Self::from_internal_name)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_fq_name())
    }
}
