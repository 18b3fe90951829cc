pub mod classfile;
pub mod config;
pub mod error;
pub mod explain;
pub mod export;
pub mod fact;
pub mod host;
pub mod loader;
pub mod logging;
pub mod mock;
pub mod random;
pub mod resolve;
pub mod synth;

pub use error::{BugexError, Result};
pub use fact::{Fact, FactType};
pub use loader::FactExtractingLoader;
pub use mock::{BugExMock, TestCase, TestFailure, TestOutcome, TestRunner};
