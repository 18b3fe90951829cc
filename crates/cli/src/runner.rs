use bugex_core::mock::{TestCase, TestFailure, TestOutcome, TestRunner};
use bugex_core::resolve::is_system_class;
use bugex_core::{BugexError, FactExtractingLoader, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

const JUNIT_MAIN: &str = "org.junit.runner.JUnitCore";

static FAILURE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\) (.+)$").expect("Failed to compile failure header pattern"));
static OK_SUMMARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^OK \((\d+) tests?\)").expect("Failed to compile OK pattern"));
static FAILED_SUMMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Tests run: (\d+),\s+Failures: (\d+)").expect("Failed to compile summary pattern")
});
// `[Loaded a.B from ...]` up to Java 8, `[0.012s][info][class,load] a.B source: ...` after.
static CLASS_LOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[Loaded (\S+) from |^(?:\[[^\]]*\])+\s*(\S+) source: ")
        .expect("Failed to compile class load pattern")
});

/// Runs the test class with JUnit in a child JVM.
///
/// Instrumentable classes are staged before the JVM starts; the staging
/// directory precedes `classpath` on the child's classpath. The child logs
/// its class loads, and only classes it actually loaded keep their facts,
/// in load order.
pub struct JUnitProcessRunner {
    java: PathBuf,
    staging: PathBuf,
    classpath: Vec<PathBuf>,
}

impl JUnitProcessRunner {
    pub fn new(java: PathBuf, staging: &Path, classpath: Vec<PathBuf>) -> Self {
        Self {
            java,
            staging: staging.to_path_buf(),
            classpath,
        }
    }

    fn process_classpath(&self) -> Result<OsString> {
        let entries = std::iter::once(self.staging.clone()).chain(self.classpath.iter().cloned());
        std::env::join_paths(entries).map_err(|e| {
            BugexError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })
    }
}

impl TestRunner for JUnitProcessRunner {
    fn run(&mut self, test: &TestCase, loader: &mut FactExtractingLoader) -> Result<TestOutcome> {
        let available = loader.available_classes()?;
        let staged = stage_classes(loader, &available);
        info!("Staged {} of {} classes for '{}'.", staged, available.len(), test);

        let output = Command::new(&self.java)
            .arg("-verbose:class")
            .arg("-cp")
            .arg(self.process_classpath()?)
            .arg(JUNIT_MAIN)
            .arg(&test.class_name)
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("JUnit exited with {}", output.status);

        let Some(outcome) = parse_junit_output(&stdout) else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let head = stderr
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("no JUnit report on stdout");
            return Err(BugexError::TestRun(format!(
                "{} exited with {}: {}",
                self.java.display(),
                output.status,
                head
            )));
        };

        let touched = program_classes_loaded(&stdout, &available);
        debug!("Test run loaded {} program classes", touched.len());
        settle_touched(loader, &touched)?;
        Ok(outcome)
    }
}

/// Loads every instrumentable class through `loader`. A class that cannot be
/// instrumented stays unstaged; it only matters if the test loads it.
fn stage_classes(loader: &mut FactExtractingLoader, available: &[String]) -> usize {
    let mut staged = 0;
    for class_name in available.iter().filter(|name| !is_system_class(name)) {
        match loader.load_class(class_name) {
            Ok(_) => staged += 1,
            Err(e) => warn!("Leaving '{}' unstaged: {}", class_name, e),
        }
    }
    staged
}

/// Fails for a touched class that could not be staged, then narrows the
/// collected facts to the touched classes in load order.
fn settle_touched(loader: &mut FactExtractingLoader, touched: &[String]) -> Result<()> {
    for class_name in touched {
        loader.load_class(class_name)?;
    }
    loader.retain_facts_for(touched);
    Ok(())
}

/// Reads the text report of `JUnitCore`. `None` when the output carries no
/// summary line, i.e. no test ran.
pub fn parse_junit_output(output: &str) -> Option<TestOutcome> {
    let mut failures = Vec::new();
    let mut run_count = None;
    let mut lines = output
        .lines()
        .filter(|line| !CLASS_LOAD.is_match(line))
        .peekable();

    while let Some(line) = lines.next() {
        if let Some(caps) = FAILURE_HEADER.captures(line) {
            let message = lines.peek().map(|next| next.trim().to_string()).unwrap_or_default();
            failures.push(TestFailure {
                description: caps[1].to_string(),
                message,
            });
        } else if let Some(caps) = OK_SUMMARY.captures(line) {
            run_count = caps[1].parse().ok();
        } else if let Some(caps) = FAILED_SUMMARY.captures(line) {
            run_count = caps[1].parse().ok();
        }
    }

    run_count.map(|run_count| TestOutcome::failed(run_count, failures))
}

/// Classes named in the JVM's class-load log, first load first.
pub fn parse_loaded_classes(output: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    output
        .lines()
        .filter_map(|line| CLASS_LOAD.captures(line))
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|name| name.as_str().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn program_classes_loaded(output: &str, available: &[String]) -> Vec<String> {
    let program: HashSet<&str> = available.iter().map(String::as_str).collect();
    parse_loaded_classes(output)
        .into_iter()
        .filter(|name| !is_system_class(name) && program.contains(name.as_str()))
        .collect()
}
