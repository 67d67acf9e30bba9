//! End-to-end tests of the source pipeline.


use std::fs;

use autoservice::compiler::{AnalysisError, RunOutcome, SourceFile};
use test_harness::{TestHarness, count_files};

const PACKAGE: &str = "dev.zacsweers.autoservice.compiler.test";

#[test]
fn nested_class_registration() {
    let harness = TestHarness::new();
    let result = harness.generate(&["nested_service.kt"]);
    result.assert_written();

    assert_eq!(result.manifest_names(), [format!("{PACKAGE}.TestService")]);
    assert_eq!(
        result.manifest(&format!("{PACKAGE}.TestService")).unwrap(),
        format!("{PACKAGE}.TestClass\n{PACKAGE}.TestClass$NestedClass\n")
    );
}

#[test]
fn array_argument_writes_one_file_per_interface() {
    let harness = TestHarness::new();
    let result = harness.generate(&["multiple_interfaces.kt"]);
    result.assert_written();

    assert_eq!(
        result.manifest_names(),
        [format!("{PACKAGE}.TestService"), format!("{PACKAGE}.TestService2")]
    );
    for name in result.manifest_names() {
        assert_eq!(result.manifest(&name).unwrap(), format!("{PACKAGE}.TestClass\n"));
    }
    assert_eq!(result.file_count(), 2);
}

#[test]
fn cross_file_imports_aliases_and_wildcards() {
    let harness = TestHarness::new();
    let result = harness.generate(&["plugin_api.kt", "plugin_impls.kt"]);
    result.assert_written();

    assert_eq!(
        result.manifest_names(),
        [
            "com.example.api.Plugin",
            "com.example.api.Plugin$Factory",
            "java.lang.Runnable",
        ]
    );
    assert_eq!(
        result.manifest("com.example.api.Plugin").unwrap(),
        "com.example.impl.AlphaPlugin\ncom.example.impl.Both\ncom.example.impl.ZebraPlugin\n"
    );
    assert_eq!(
        result.manifest("com.example.api.Plugin$Factory").unwrap(),
        "com.example.impl.AlphaPlugin$Factory\ncom.example.impl.Both\n"
    );
    assert_eq!(
        result.manifest("java.lang.Runnable").unwrap(),
        "com.example.impl.Task\n"
    );
}

#[test]
fn one_file_per_distinct_interface() {
    let harness = TestHarness::new();
    let result = harness.generate(&["plugin_api.kt", "plugin_impls.kt", "nested_service.kt"]);
    let written = result.assert_written();

    assert_eq!(written.len(), 4);
    assert_eq!(result.file_count(), written.len());
}

#[test]
fn lines_are_sorted_and_newline_terminated() {
    let harness = TestHarness::new();
    let result = harness.generate(&["plugin_api.kt", "plugin_impls.kt"]);
    for path in result.assert_written() {
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with('\n'), "{}", path.display());

        let lines: Vec<&str> = contents.lines().collect();
        let mut sorted = lines.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(lines, sorted, "{}", path.display());
    }
}

#[test]
fn regeneration_is_idempotent() {
    let harness = TestHarness::new();
    let sources: Vec<SourceFile> = ["plugin_api.kt", "plugin_impls.kt"]
        .iter()
        .map(|name| harness.load(name))
        .collect();
    let output = tempfile::tempdir().unwrap();

    let (first, _) = harness.generate_into(output.path(), &sources);
    let snapshot = |paths: &[std::path::PathBuf]| {
        paths
            .iter()
            .map(|path| fs::read(path).unwrap())
            .collect::<Vec<_>>()
    };
    let Ok(RunOutcome::Written(first)) = first else {
        panic!("first run failed");
    };
    let first_bytes = snapshot(&first);

    let (second, _) = harness.generate_into(output.path(), &sources);
    let Ok(RunOutcome::Written(second)) = second else {
        panic!("second run failed");
    };
    assert_eq!(first, second);
    assert_eq!(first_bytes, snapshot(&second));
    assert_eq!(count_files(output.path()), second.len());
}

#[test]
fn stale_manifests_are_removed() {
    let harness = TestHarness::new();
    let output = tempfile::tempdir().unwrap();
    let stale = output.path().join("META-INF/services/old.RemovedService");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old.Impl\n").unwrap();

    let (outcome, _) = harness.generate_into(output.path(), &[harness.load("nested_service.kt")]);
    assert!(matches!(outcome, Ok(RunOutcome::Written(_))));
    assert!(!stale.exists());
    assert_eq!(count_files(output.path()), 1);
}

#[test]
fn unresolvable_reference_writes_nothing() {
    let harness = TestHarness::new();
    let result = harness.generate(&["unresolvable.kt"]);

    match &result.outcome {
        Err(AnalysisError::UnresolvableReference {
            reference, file, ..
        }) => {
            assert_eq!(reference, "DoesNotExist");
            assert_eq!(file, "unresolvable.kt");
        }
        other => panic!("expected unresolvable reference, got {other:?}"),
    }
    assert_eq!(result.file_count(), 0);
}

#[test]
fn parse_errors_skip_generation() {
    let harness = TestHarness::new();
    let result = harness.generate(&["nested_service.kt", "broken.kt"]);

    assert!(matches!(result.outcome, Ok(RunOutcome::Skipped)));
    assert!(result.diagnostics.has_errors());
    assert_eq!(result.file_count(), 0);
}

#[test]
fn no_annotations_writes_no_manifests() {
    let harness = TestHarness::new();
    let result = harness.generate(&["plugin_api.kt"]);
    assert!(result.assert_written().is_empty());
    assert_eq!(result.file_count(), 0);
}
