//! Layered configuration for the Omaha update server.
//!
//! Values resolve from built-in defaults, an `omaha.toml` file, `OMAHA_*`
//! environment variables and command-line flags, in ascending precedence.
//! [`Config::load_validated`] layers the sources and then rejects values the
//! server cannot run with.

mod defaults;
mod errors;
mod logging;

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BIND_ADDRESS, DEFAULT_EXCHANGE_TIMEOUT_MS, DEFAULT_LOG_FILTER, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_SERVER_NAME, DEFAULT_UPDATE_PATH, default_bind_address, default_exchange_timeout_ms,
    default_log_filter, default_log_filter_string, default_log_format, default_max_body_bytes,
    default_server_name, default_update_path,
};
pub use errors::{ConfigError, LoadError};
pub use logging::{LogFormat, LogFormatParseError};

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "OMAHA")]
pub struct Config {
    /// Address the listener binds, as `host:port`. Port `0` picks an
    /// ephemeral port.
    #[serde(default = "default_bind_address")]
    #[ortho_config(default = default_bind_address())]
    pub bind_address: String,
    /// Path that accepts update requests.
    #[serde(default = "default_update_path")]
    #[ortho_config(default = default_update_path())]
    pub update_path: String,
    /// Largest request body accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    #[ortho_config(default = default_max_body_bytes())]
    pub max_body_bytes: usize,
    /// Upper bound on a single exchange, in milliseconds. Zero disables it.
    #[serde(default = "default_exchange_timeout_ms")]
    #[ortho_config(default = default_exchange_timeout_ms())]
    pub exchange_timeout_ms: u64,
    /// Name reported in the `server` attribute of every response.
    #[serde(default = "default_server_name")]
    #[ortho_config(default = default_server_name())]
    pub server_name: String,
    /// `tracing` filter directive applied at start-up.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            update_path: default_update_path(),
            max_body_bytes: default_max_body_bytes(),
            exchange_timeout_ms: default_exchange_timeout_ms(),
            server_name: default_server_name(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Layers every configuration source over `args` and validates the
    /// result.
    ///
    /// The first element of `args` is the program name, as with
    /// [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Layering`] when a source cannot be read or parsed
    /// and [`LoadError::Invalid`] when the merged values fail
    /// [`Config::validate`].
    pub fn load_validated<I, T>(args: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let config = <Self as OrthoConfig>::load_from_iter(args).map_err(LoadError::Layering)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse cleanly but cannot be served with.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_path.is_empty() {
            return Err(ConfigError::EmptyUpdatePath);
        }
        if !self.update_path.starts_with('/') {
            return Err(ConfigError::RelativeUpdatePath {
                path: self.update_path.clone(),
            });
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        Ok(())
    }

    /// Address the listener binds.
    #[must_use]
    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    /// Path that accepts update requests.
    #[must_use]
    pub fn update_path(&self) -> &str {
        &self.update_path
    }

    /// Largest request body accepted, in bytes.
    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Exchange timeout, or `None` when disabled.
    #[must_use]
    pub const fn exchange_timeout(&self) -> Option<Duration> {
        match self.exchange_timeout_ms {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    /// Name reported in responses.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Filter directive for the log subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for log records.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
