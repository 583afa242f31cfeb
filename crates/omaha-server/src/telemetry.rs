//! Structured telemetry initialisation for the server.
//!
//! Events carry their module target (`omaha_server::service`,
//! `omaha_server::lifecycle`, ...) and the name of the runtime thread that
//! emitted them, so exchange handling can be told apart from lifecycle work.

use std::io::{self, IsTerminal};

use omaha_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, info, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Handle returned once telemetry is installed.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format of the installed subscriber.
    ///
    /// After a repeated [`initialise`] call this is the format chosen by the
    /// first call, not the one requested by the later configuration.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression did not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another subscriber was already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global `tracing` subscriber described by `config` and
/// announces the server name it logs for.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] when a foreign subscriber is already
/// installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let format = *INSTALLED_FORMAT.get_or_try_init(|| {
        install_subscriber(config)?;
        info!(
            target: TELEMETRY_TARGET,
            server_name = config.server_name(),
            log_format = %config.log_format(),
            log_filter = config.log_filter(),
            "telemetry initialised"
        );
        Ok::<_, TelemetryError>(config.log_format())
    })?;
    Ok(TelemetryHandle { format })
}

/// Colour codes only make sense for human-readable output on a terminal.
const fn wants_ansi(format: LogFormat, stderr_is_terminal: bool) -> bool {
    match format {
        LogFormat::Json => false,
        LogFormat::Compact => stderr_is_terminal,
    }
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let format = config.log_format();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(wants_ansi(format, io::stderr().is_terminal()))
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
