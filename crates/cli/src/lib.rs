mod host;
mod jdk;
mod runner;

pub use host::StagingHost;
pub use runner::{parse_junit_output, JUnitProcessRunner};

use bugex_core::config::{MockConfig, Resolution};
use bugex_core::export::export_to_xml;
use bugex_core::resolve::{LocalResolver, CLASSPATH_ENV};
use bugex_core::synth::FactSynthesizer;
use bugex_core::{BugExMock, BugexError};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

const USAGE_HINT: &str = "Specify archive and failing test case that BugEx should analyse.";
const FAILURE_EXIT: u8 = 255;

#[derive(Parser, Debug)]
#[command(
    name = "bugex-mock",
    version,
    about = "Explains a failing JUnit test with synthetic facts",
    long_about = "Loads the program under instrumentation, runs the failing test and \
                  writes the collected facts to bugex-results.xml."
)]
pub struct Cli {
    /// Resolve classes from these classpath roots instead of an archive
    #[arg(long, value_name = "CLASSPATH", env = CLASSPATH_ENV)]
    pub classpath: Option<std::ffi::OsString>,

    /// Extra entries for the test JVM only, e.g. the JUnit jar
    #[arg(long, value_name = "CLASSPATH")]
    pub runner_classpath: Option<std::ffi::OsString>,

    /// Java launcher used to run the test (defaults to $JAVA_HOME/bin/java)
    #[arg(long, value_name = "PATH")]
    pub java: Option<PathBuf>,

    /// Also print the selected facts as JSON
    #[arg(long)]
    pub json: bool,

    /// Mirror log output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// [ARCHIVE] FAILING_TEST [OUTPUT_DIR] [DELAY_SECONDS]; ARCHIVE is
    /// omitted when --classpath is given
    #[arg(value_name = "ARGS", num_args = 1..=4, required = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Interprets the positional arguments.
    pub fn config(&self) -> Result<MockConfig, BugexError> {
        let mut args = self.args.iter();
        let resolution = match &self.classpath {
            Some(classpath) => Resolution::Local {
                classpath: LocalResolver::from_classpath(classpath).roots().to_vec(),
            },
            None => {
                let archive = args.next().ok_or_else(|| usage_error("missing archive"))?;
                Resolution::Archive(PathBuf::from(archive))
            }
        };
        let failing_test = args.next().ok_or_else(|| usage_error("missing failing test"))?;

        let mut config = MockConfig::new(resolution, failing_test.as_str());
        if let Some(output_dir) = args.next() {
            config = config.with_output_dir(output_dir.as_str());
        }
        if let Some(delay) = args.next() {
            let seconds = delay
                .parse::<i64>()
                .map_err(|_| usage_error(&format!("invalid delay '{delay}'")))?;
            config = config.with_delay_seconds(seconds);
        }
        if args.next().is_some() {
            return Err(usage_error("too many arguments"));
        }

        config.validate()?;
        Ok(config)
    }
}

fn usage_error(reason: &str) -> BugexError {
    BugexError::Usage(reason.to_string())
}

pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            println!("{USAGE_HINT}");
            let _ = e.print();
            return ExitCode::from(FAILURE_EXIT);
        }
    };

    let _guard = bugex_core::logging::init_logging("cli", cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Mock invocation failed: {}", e);
            eprintln!("Error: {e}");
            ExitCode::from(FAILURE_EXIT)
        }
    }
}

fn execute(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config()?;
    let staging = tempfile::Builder::new().prefix("bugex-staging").tempdir()?;
    let host = Box::new(StagingHost::new(staging.path()));
    let synthesizer = FactSynthesizer::default();

    let (mut mock, mut classpath) = match &config.resolution {
        Resolution::Archive(archive) => (
            BugExMock::from_archive(archive, &config.failing_test, host, synthesizer)?,
            vec![archive.clone()],
        ),
        Resolution::Local { classpath } => (
            BugExMock::local(
                &config.failing_test,
                LocalResolver::new(classpath.clone()),
                host,
                synthesizer,
            )?,
            classpath.clone(),
        ),
    };

    if let Some(extra) = &cli.runner_classpath {
        classpath.extend(std::env::split_paths(extra));
    }
    let java = cli.java.clone().unwrap_or_else(jdk::find_java_binary);
    let mut runner = JUnitProcessRunner::new(java, staging.path(), classpath);
    let facts = mock.explain_failure(&mut runner)?;
    info!("Selected {} facts.", facts.len());

    if !config.delay.is_zero() {
        println!("Delaying process for {} seconds..", config.delay.as_secs());
        std::thread::sleep(config.delay);
        println!("Waking up..");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&facts)?);
    }

    let path = export_to_xml(&facts, &config.output_dir)?;
    println!("Results written to {}", path.display());
    Ok(())
}
