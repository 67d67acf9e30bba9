use autoservice_core::{ClassId, FqName};
use autoservice_parser::Parser;
use autoservice_parser::ast::KtFile;
use autoservice_registry::{ClassEntry, ClassKind, Origin, SymbolRegistry};
use bumpalo::Bump;

use super::*;

fn class_id(package: &str, relative: &str) -> ClassId {
    ClassId::new(FqName::from_dotted(package), FqName::from_dotted(relative))
}

fn registry_with(classes: &[(&str, &str)]) -> SymbolRegistry {
    let mut registry = SymbolRegistry::with_platform_types();
    for (package, relative) in classes {
        registry
            .register_class(ClassEntry::new(
                class_id(package, relative),
                ClassKind::Interface,
                Origin::Classpath,
            ))
            .unwrap();
    }
    registry
}

fn parse<'ast>(source: &str, arena: &'ast Bump) -> KtFile<'ast> {
    Parser::parse_file("Test.kt", source, arena).unwrap()
}

/// Resolve the first argument of the first annotation on the last
/// top-level declaration.
fn resolve_in(
    registry: &SymbolRegistry,
    mode: ResolutionMode,
    source: &str,
    scopes: &[ClassId],
) -> Result<String, AnalysisError> {
    let arena = Bump::new();
    let file = parse(source, &arena);
    let decl = file.declarations.last().unwrap();
    let argument = &decl.annotations[0].arguments[0].value;
    let reference = TypeReference::from_argument(argument).unwrap();

    let resolver = NameResolver::with_mode(registry, mode);
    resolver
        .resolve(&reference, &ResolutionContext::new(&file, scopes))
        .map(|name| name.to_string())
}

fn resolve(registry: &SymbolRegistry, source: &str) -> Result<String, AnalysisError> {
    resolve_in(registry, ResolutionMode::Full, source, &[])
}

#[test]
fn fully_qualified_literal() {
    let registry = registry_with(&[("com.example", "Service")]);
    let name = resolve(&registry, "@A(com.example.Service::class) class C").unwrap();
    assert_eq!(name, "com.example.Service");
}

#[test]
fn exact_import() {
    let registry = registry_with(&[]);
    let name = resolve(
        &registry,
        "package a\nimport lib.Service\n@A(Service::class) class C",
    )
    .unwrap();
    assert_eq!(name, "lib.Service");
}

#[test]
fn ambiguous_imports_resolve_to_existing_class() {
    let registry = registry_with(&[("jvm", "Service")]);
    let name = resolve(
        &registry,
        "package a\nimport js.Service\nimport jvm.Service\n@A(Service::class) class C",
    )
    .unwrap();
    assert_eq!(name, "jvm.Service");
}

#[test]
fn outer_segment_import_reaches_nested_class() {
    let registry = registry_with(&[("lib", "Outer.Inner")]);
    let name = resolve(
        &registry,
        "package a\nimport lib.Outer\n@A(Outer.Inner::class) class C",
    )
    .unwrap();
    assert_eq!(name, "lib.Outer.Inner");
}

#[test]
fn same_package_class_and_alias() {
    let mut registry = registry_with(&[("a", "Local")]);
    registry
        .register_type_alias(FqName::from_dotted("a.Shortcut"), None, Origin::Source)
        .unwrap();

    assert_eq!(
        resolve(&registry, "package a\n@A(Local::class) class C").unwrap(),
        "a.Local"
    );
    assert_eq!(
        resolve(&registry, "package a\n@A(Shortcut::class) class C").unwrap(),
        "a.Shortcut"
    );
}

#[test]
fn implicit_packages_in_order() {
    let registry = registry_with(&[]);
    assert_eq!(
        resolve(&registry, "package a\n@A(Runnable::class) class C").unwrap(),
        "java.lang.Runnable"
    );
    assert_eq!(
        resolve(&registry, "package a\n@A(Comparable::class) class C").unwrap(),
        "kotlin.Comparable"
    );
    assert_eq!(
        resolve(&registry, "package a\n@A(List::class) class C").unwrap(),
        "kotlin.collections.List"
    );
}

#[test]
fn generic_receiver_strips_type_arguments() {
    let registry = registry_with(&[("lib", "Provider")]);
    let name = resolve(
        &registry,
        "package a\nimport lib.Provider\n@A(Provider<*>::class) class C",
    )
    .unwrap();
    assert_eq!(name, "lib.Provider");

    let qualified = resolve(&registry, "package a\n@A(lib.Provider<String>::class) class C").unwrap();
    assert_eq!(qualified, "lib.Provider");
}

#[test]
fn enclosing_class_nested_type() {
    let registry = registry_with(&[("a", "Outer"), ("a", "Outer.Service")]);
    let scopes = [class_id("a", "Outer.Impl"), class_id("a", "Outer")];
    let name = resolve_in(
        &registry,
        ResolutionMode::Full,
        "package a\n@A(Service::class) class C",
        &scopes,
    )
    .unwrap();
    assert_eq!(name, "a.Outer.Service");
}

#[test]
fn nested_type_inherited_from_supertype() {
    let mut registry = registry_with(&[("lib", "Base"), ("lib", "Base.Plugin"), ("a", "Impl")]);
    registry.add_supertype(&class_id("a", "Impl"), &class_id("lib", "Base"));
    let scopes = [class_id("a", "Impl")];

    let full = resolve_in(
        &registry,
        ResolutionMode::Full,
        "package a\n@A(Plugin::class) class C",
        &scopes,
    );
    assert_eq!(full.unwrap(), "lib.Base.Plugin");

    let linking = resolve_in(
        &registry,
        ResolutionMode::Linking,
        "package a\n@A(Plugin::class) class C",
        &scopes,
    );
    assert!(matches!(linking, Err(AnalysisError::UnresolvableReference { .. })));
}

#[test]
fn wildcard_import() {
    let registry = registry_with(&[("lib.api", "Service")]);
    let name = resolve(
        &registry,
        "package a\nimport other.*\nimport lib.api.*\n@A(Service::class) class C",
    )
    .unwrap();
    assert_eq!(name, "lib.api.Service");
}

#[test]
fn aliased_import_taken_at_face_value() {
    let registry = registry_with(&[]);
    let name = resolve(
        &registry,
        "package a\nimport lib.LongServiceName as Svc\n@A(Svc::class) class C",
    )
    .unwrap();
    assert_eq!(name, "lib.LongServiceName");
}

#[test]
fn unresolvable_reference_reports_text_and_location() {
    let registry = registry_with(&[]);
    let err = resolve(&registry, "package a\n@A(Missing::class) class C").unwrap_err();
    match err {
        AnalysisError::UnresolvableReference {
            reference,
            file,
            span,
        } => {
            assert_eq!(reference, "Missing");
            assert_eq!(file, "Test.kt");
            assert_eq!(span.line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn collection_is_not_a_single_reference() {
    let registry = registry_with(&[]);
    let err = resolve(&registry, "package a\n@A([Runnable::class]) class C").unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedSyntax { .. }));
}
