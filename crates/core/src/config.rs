use crate::error::{BugexError, Result};
use crate::mock::TestCase;
use crate::resolve::is_supported_archive;
use std::path::PathBuf;
use std::time::Duration;

/// Where the program under analysis is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Local { classpath: Vec<PathBuf> },
    Archive(PathBuf),
}

/// Validated settings of one mock invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub resolution: Resolution,
    pub failing_test: String,
    /// Prefix for the result file: empty or ending with `/`.
    pub output_dir: String,
    /// Applied after all facts were collected.
    pub delay: Duration,
}

impl MockConfig {
    pub fn new(resolution: Resolution, failing_test: impl Into<String>) -> Self {
        Self {
            resolution,
            failing_test: failing_test.into(),
            output_dir: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<String>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Non-positive values mean no delay.
    pub fn with_delay_seconds(mut self, seconds: i64) -> Self {
        self.delay = Duration::from_secs(seconds.max(0) as u64);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Resolution::Archive(archive) = &self.resolution {
            if !is_supported_archive(archive) {
                return Err(BugexError::InvalidArchive {
                    path: archive.display().to_string(),
                    reason: "Archive not supported!".to_string(),
                });
            }
        }
        if !self.output_dir.is_empty() && !self.output_dir.ends_with('/') {
            return Err(BugexError::InvalidOutputPath(self.output_dir.clone()));
        }
        TestCase::parse(&self.failing_test)?;
        Ok(())
    }
}
