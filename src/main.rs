//! babcheck - Resolver and validator for bab task-runner configuration files

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = babcheck::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
