//! gitbridge command-line entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    match gitbridge::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            gitbridge::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
