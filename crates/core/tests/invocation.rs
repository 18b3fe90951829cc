mod common;

use bugex_core::host::InMemoryHost;
use bugex_core::random::SequenceRandom;
use bugex_core::resolve::LocalResolver;
use bugex_core::synth::FactSynthesizer;
use bugex_core::{BugExMock, BugexError};
use common::*;
use tempfile::TempDir;

fn program_jar(dir: &TempDir) -> std::path::PathBuf {
    let jar = dir.path().join("failing-program.jar");
    write_jar(
        &jar,
        &[(TEST_CLASS, test_class()), (TARGET_CLASS, target_class())],
    );
    jar
}

#[test]
fn test_archive_invocation_explains_failure() {
    let dir = TempDir::new().unwrap();
    let jar = program_jar(&dir);
    let (host, defined) = RecordingHost::new(InMemoryHost::new());

    let mut mock = BugExMock::from_archive(
        &jar,
        FAILING_TEST,
        Box::new(host),
        FactSynthesizer::with_random(SequenceRandom::constant(0.999)),
    )
    .unwrap();
    assert_eq!(mock.test().method_name, "testGetMin");
    assert!(mock.loader().facts().is_empty());

    let mut runner = ScriptedRunner::failing(&[TARGET_CLASS, "org.junit.Assert"]);
    let result = mock.explain_failure(&mut runner);
    // org.junit.Assert is delegated, and the in-memory host has no copy of it
    assert!(matches!(result, Err(BugexError::ClassNotFound(name)) if name == "org.junit.Assert"));
    assert_eq!(
        *defined.borrow(),
        vec![TEST_CLASS.to_string(), TARGET_CLASS.to_string()]
    );
}

#[test]
fn test_archive_invocation_returns_fact_prefix() {
    let dir = TempDir::new().unwrap();
    let jar = program_jar(&dir);
    let host = InMemoryHost::new().with_system_class("org.junit.Assert", vec![1, 2, 3]);

    let mut mock = BugExMock::from_archive(
        &jar,
        FAILING_TEST,
        Box::new(host),
        FactSynthesizer::with_random(SequenceRandom::constant(0.999)),
    )
    .unwrap();

    let mut runner = ScriptedRunner::failing(&[TARGET_CLASS, "org.junit.Assert"]);
    let facts = mock.explain_failure(&mut runner).unwrap();

    assert_eq!(facts.len(), 2);
    assert!(facts.iter().all(|fact| fact.class_name == TARGET_CLASS));
    assert_eq!(facts[0].line_number, Some(20));
    assert_eq!(facts[1].line_number, Some(5));
}

#[test]
fn test_prefix_selection_keeps_at_least_one_fact() {
    let dir = TempDir::new().unwrap();
    let jar = program_jar(&dir);

    let mut mock = BugExMock::from_archive(
        &jar,
        FAILING_TEST,
        Box::new(InMemoryHost::new()),
        FactSynthesizer::with_random(SequenceRandom::constant(0.0)),
    )
    .unwrap();

    let facts = mock
        .explain_failure(&mut ScriptedRunner::failing(&[TARGET_CLASS]))
        .unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].method_name.as_deref(), Some("getMin"));
    assert_eq!(facts[0].line_number, Some(10));
}

#[test]
fn test_unsupported_archive_fails_before_reading() {
    let dir = TempDir::new().unwrap();
    let (host, defined) = RecordingHost::new(InMemoryHost::new());

    // The file does not even exist; the extension alone decides.
    let result = BugExMock::from_archive(
        &dir.path().join("lib.tar"),
        FAILING_TEST,
        Box::new(host),
        FactSynthesizer::default(),
    );

    assert!(matches!(result, Err(BugexError::InvalidArchive { .. })));
    assert!(defined.borrow().is_empty());
}

#[test]
fn test_passing_test_is_rejected() {
    let dir = TempDir::new().unwrap();
    let jar = program_jar(&dir);
    let (host, defined) = RecordingHost::new(InMemoryHost::new());

    let mut mock =
        BugExMock::from_archive(&jar, FAILING_TEST, Box::new(host), FactSynthesizer::default())
            .unwrap();
    let result = mock.explain_failure(&mut ScriptedRunner::passing(&[TARGET_CLASS]));

    assert!(matches!(result, Err(BugexError::NoFailingTest)));
    assert_eq!(defined.borrow().len(), 2);
    assert_eq!(mock.loader().facts().len(), 2);
}

#[test]
fn test_only_sibling_method_failing_is_rejected() {
    let dir = TempDir::new().unwrap();
    let jar = program_jar(&dir);

    let mut mock = BugExMock::from_archive(
        &jar,
        FAILING_TEST,
        Box::new(InMemoryHost::new()),
        FactSynthesizer::default(),
    )
    .unwrap();
    let mut runner =
        ScriptedRunner::failing_with(&[TARGET_CLASS], &["testGetMax(de.mypackage.TestMyClass)"]);

    assert!(matches!(
        mock.explain_failure(&mut runner),
        Err(BugexError::NoFailingTest)
    ));
}

#[test]
fn test_designated_failure_found_among_others() {
    let dir = TempDir::new().unwrap();
    let jar = program_jar(&dir);

    let mut mock = BugExMock::from_archive(
        &jar,
        FAILING_TEST,
        Box::new(InMemoryHost::new()),
        FactSynthesizer::with_random(SequenceRandom::constant(0.0)),
    )
    .unwrap();
    let mut runner = ScriptedRunner::failing_with(
        &[TARGET_CLASS],
        &[
            "testGetMax(de.mypackage.TestMyClass)",
            "testGetMin(de.mypackage.TestMyClass)",
        ],
    );

    let facts = mock.explain_failure(&mut runner).unwrap();
    assert_eq!(facts.len(), 1);
}

#[test]
fn test_no_line_information_is_reported() {
    let dir = TempDir::new().unwrap();
    let stripped = ClassImageBuilder::new(TARGET_CLASS)
        .method("getMin", &[])
        .method("tiny", &[])
        .build();
    write_class_file(dir.path(), TEST_CLASS, &test_class());
    write_class_file(dir.path(), TARGET_CLASS, &stripped);

    let mut mock = BugExMock::local(
        FAILING_TEST,
        LocalResolver::new(vec![dir.path().to_path_buf()]),
        Box::new(InMemoryHost::new()),
        FactSynthesizer::default(),
    )
    .unwrap();
    let result = mock.explain_failure(&mut ScriptedRunner::failing(&[TARGET_CLASS]));

    assert!(matches!(result, Err(BugexError::NoFactsExtracted)));
}

#[test]
fn test_missing_test_class() {
    let dir = TempDir::new().unwrap();
    let result = BugExMock::local(
        FAILING_TEST,
        LocalResolver::new(vec![dir.path().to_path_buf()]),
        Box::new(InMemoryHost::new()),
        FactSynthesizer::default(),
    );
    assert!(matches!(result, Err(BugexError::ClassNotFound(name)) if name == TEST_CLASS));
}

#[test]
fn test_identifier_without_method() {
    let dir = TempDir::new().unwrap();
    let jar = program_jar(&dir);
    let result = BugExMock::from_archive(
        &jar,
        TEST_CLASS,
        Box::new(InMemoryHost::new()),
        FactSynthesizer::default(),
    );
    assert!(matches!(result, Err(BugexError::InvalidTestIdentifier(_))));
}
