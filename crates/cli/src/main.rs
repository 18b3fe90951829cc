use std::process::ExitCode;

fn main() -> ExitCode {
    bugex_cli::run()
}
