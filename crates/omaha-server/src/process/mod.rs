//! Process entry point for the `omaha-server` binary.
//!
//! The binary serves [`UpdaterStub`], which answers every update check with
//! `noupdate`. It exists so the protocol surface can be exercised end to end;
//! hosts with real decision logic embed [`Server`] directly.

mod shutdown;

use std::ffi::OsString;
use std::sync::mpsc;
use std::thread;

use omaha_config::{Config, LoadError};
use thiserror::Error;
use tracing::{error, info};

pub use self::shutdown::{
    ShutdownCause, ShutdownError, ShutdownSignal, SystemShutdownSignal, TERMINATION_SIGNALS,
};

use crate::server::{ServeError, Server};
use crate::telemetry::{self, TelemetryError};
use crate::transport::BindError;
use crate::updater::{Updater, UpdaterStub};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Errors that end the server process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] LoadError),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The listener could not be bound.
    #[error(transparent)]
    Bind(#[from] BindError),
    /// Serving failed.
    #[error(transparent)]
    Serve(#[from] ServeError),
    /// The shutdown signal listener failed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

/// Loads configuration from `args` and the environment, then serves until a
/// termination signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] describing the first failure.
pub fn run<I, T>(args: I) -> Result<(), LaunchError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config = Config::load_validated(args)?;
    telemetry::initialise(&config)?;
    serve_until_signalled(&config, UpdaterStub, SystemShutdownSignal::new())
}

/// Serves `updater` until `signal` fires, then stops gracefully.
///
/// # Errors
///
/// Returns [`LaunchError::Bind`] or [`LaunchError::Serve`] when the server
/// cannot run, and [`LaunchError::Shutdown`] when `signal` fails. A failing
/// signal still stops the server.
pub fn serve_until_signalled(
    config: &Config,
    updater: impl Updater,
    signal: impl ShutdownSignal + 'static,
) -> Result<(), LaunchError> {
    let server = Server::from_config(config, updater)?;
    info!(
        target: PROCESS_TARGET,
        addr = %server.local_addr(),
        update_path = config.update_path(),
        "omaha server starting"
    );

    let handle = server.handle();
    let drain_budget_ms = config
        .exchange_timeout()
        .map(|budget| u64::try_from(budget.as_millis()).unwrap_or(u64::MAX));
    let (outcome_tx, outcome_rx) = mpsc::channel();
    thread::Builder::new()
        .name("omaha-shutdown".to_owned())
        .spawn(move || {
            let outcome = signal.wait();
            if let Ok(cause) = &outcome {
                info!(
                    target: PROCESS_TARGET,
                    cause = %cause,
                    addr = %handle.local_addr(),
                    drain_budget_ms,
                    "stopping omaha server"
                );
            }
            if let Err(error) = &outcome {
                error!(target: PROCESS_TARGET, error = %error, "shutdown listener failed");
            }
            if let Err(error) = handle.stop() {
                error!(target: PROCESS_TARGET, error = %error, "server stop failed");
            }
            // The receiver is gone only if serving already failed.
            drop(outcome_tx.send(outcome));
        })
        .map_err(|source| ServeError::Runtime { source })?;

    server.serve()?;
    // Serving only ends cleanly through the watcher's stop, so it has reported.
    let cause = outcome_rx.recv().ok().transpose()?;
    info!(target: PROCESS_TARGET, cause = ?cause, "omaha server stopped");
    Ok(())
}
