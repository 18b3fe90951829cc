use thiserror::Error;

#[derive(Error, Debug)]
pub enum BugexError {
    #[error("Class '{0}' could not be found!")]
    ClassNotFound(String),
    #[error("Malformed class image: {0}")]
    MalformedInput(String),
    #[error("Input archive path is not valid: '{path}' ({reason})")]
    InvalidArchive { path: String, reason: String },
    #[error("Class '{class}' rejected by host: {reason}")]
    Verification { class: String, reason: String },
    #[error(
        "Something went wrong analysing the class file: Got no code locations! \
         Was the code compiled with the -g option?"
    )]
    NoFactsExtracted,
    #[error("Need a failing test to explain!")]
    NoFailingTest,
    #[error("Need to specify test method: '{0}' (expected 'package.Class#method')")]
    InvalidTestIdentifier(String),
    #[error("Output path is not valid: '{0}' (No trailing '/')")]
    InvalidOutputPath(String),
    #[error("Test run did not complete: {0}")]
    TestRun(String),
    #[error("Invalid arguments: {0}")]
    Usage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BugexError>;
