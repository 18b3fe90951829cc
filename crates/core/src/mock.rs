//! Drives one mock invocation: load the failing test, run it, collect facts.

use crate::error::{BugexError, Result};
use crate::fact::Fact;
use crate::host::ClassHost;
use crate::loader::FactExtractingLoader;
use crate::random::pick_number;
use crate::resolve::{ArchiveResolver, ByteResolver, LocalResolver};
use crate::synth::FactSynthesizer;
use std::fmt;
use std::path::Path;
use tracing::info;

/// A failing test given as `package.Class#method`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub class_name: String,
    pub method_name: String,
}

impl TestCase {
    pub fn parse(identifier: &str) -> Result<Self> {
        let invalid = || BugexError::InvalidTestIdentifier(identifier.to_string());
        let (class_name, method_name) = identifier.split_once('#').ok_or_else(invalid)?;
        if class_name.is_empty() || method_name.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
        })
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.method_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    pub description: String,
    pub message: String,
}

impl TestFailure {
    /// JUnit describes a failure as `method(package.Class)`; `package.Class#method`
    /// is accepted as well.
    pub fn is_for(&self, test: &TestCase) -> bool {
        let Some(rest) = self.description.strip_prefix(test.method_name.as_str()) else {
            return self.description == test.to_string();
        };
        match rest.strip_prefix('(').and_then(|inner| inner.strip_suffix(')')) {
            Some(class_name) => class_name.is_empty() || class_name == test.class_name,
            None => self.description == test.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestOutcome {
    pub run_count: usize,
    pub failures: Vec<TestFailure>,
}

impl TestOutcome {
    pub fn passed(run_count: usize) -> Self {
        Self {
            run_count,
            failures: Vec::new(),
        }
    }

    pub fn failed(run_count: usize, failures: Vec<TestFailure>) -> Self {
        Self {
            run_count,
            failures,
        }
    }
}

/// Executes the failing test; every class the run touches goes through
/// `loader`.
pub trait TestRunner {
    fn run(&mut self, test: &TestCase, loader: &mut FactExtractingLoader) -> Result<TestOutcome>;
}

pub struct BugExMock {
    test: TestCase,
    loader: FactExtractingLoader,
}

impl BugExMock {
    /// Parses the test identifier and loads the test class through `resolver`.
    pub fn new(
        failing_test: &str,
        resolver: Box<dyn ByteResolver>,
        host: Box<dyn ClassHost>,
        synthesizer: FactSynthesizer,
    ) -> Result<Self> {
        info!("Analysing test '{}'.", failing_test);
        let test = TestCase::parse(failing_test)?;
        let mut loader = FactExtractingLoader::new(resolver, host, synthesizer, &test.class_name);
        loader.load_class(&test.class_name)?;
        Ok(Self { test, loader })
    }

    pub fn local(
        failing_test: &str,
        resolver: LocalResolver,
        host: Box<dyn ClassHost>,
        synthesizer: FactSynthesizer,
    ) -> Result<Self> {
        info!("Resolving classes from {}.", resolver.describe());
        Self::new(failing_test, Box::new(resolver), host, synthesizer)
    }

    /// Fails with `InvalidArchive` before anything is read when the archive
    /// kind is not supported.
    pub fn from_archive(
        archive: &Path,
        failing_test: &str,
        host: Box<dyn ClassHost>,
        synthesizer: FactSynthesizer,
    ) -> Result<Self> {
        info!("Analysing input archive '{}'.", archive.display());
        let resolver = ArchiveResolver::new(archive)?;
        Self::new(failing_test, Box::new(resolver), host, synthesizer)
    }

    pub fn test(&self) -> &TestCase {
        &self.test
    }

    pub fn loader(&self) -> &FactExtractingLoader {
        &self.loader
    }

    /// Runs the test and returns a non-empty prefix of the collected facts.
    ///
    /// Failures of other methods in the run do not count: the designated
    /// test itself has to fail.
    pub fn explain_failure(&mut self, runner: &mut dyn TestRunner) -> Result<Vec<Fact>> {
        let outcome = runner.run(&self.test, &mut self.loader)?;
        let failure = outcome
            .failures
            .iter()
            .find(|failure| failure.is_for(&self.test))
            .ok_or(BugexError::NoFailingTest)?;
        info!(
            "Analyzing failure '{}' in '{}'.",
            failure.message, failure.description
        );

        let mut facts = self.loader.take_facts();
        if facts.is_empty() {
            return Err(BugexError::NoFactsExtracted);
        }
        let keep = pick_number(
            self.loader.synthesizer_mut().random_mut(),
            1,
            facts.len() as i64,
        ) as usize;
        facts.truncate(keep);
        Ok(facts)
    }
}
