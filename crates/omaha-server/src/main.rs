//! Command-line entry point serving the Omaha protocol with a stub updater.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match omaha_server::process::run(std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "omaha_server::process", error = %error, "omaha server failed");
            // Telemetry may not be installed yet, so also report on stderr.
            drop(writeln!(io::stderr(), "omaha-server: {error}"));
            ExitCode::FAILURE
        }
    }
}
