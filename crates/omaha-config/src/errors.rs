use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

/// A configuration value that loaded cleanly but cannot be served with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The update path was empty.
    #[error("update path must not be empty")]
    EmptyUpdatePath,
    /// The update path did not start with `/`.
    #[error("update path '{path}' must start with '/'")]
    RelativeUpdatePath {
        /// Offending path.
        path: String,
    },
    /// The request body ceiling was zero.
    #[error("max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Errors surfaced by [`crate::Config::load_validated`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// Layering defaults, files, environment and CLI failed.
    #[error("failed to load configuration: {0}")]
    Layering(#[source] Arc<OrthoError>),
    /// The merged configuration failed validation.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}
