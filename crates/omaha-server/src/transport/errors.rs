//! Error types for listener binding.

use std::io;
use std::net::SocketAddr;

use omaha_config::ConfigError;
use thiserror::Error;

/// Errors surfaced while binding the server's listener.
#[derive(Debug, Error)]
pub enum BindError {
    /// The bind address could not be resolved.
    #[error("failed to resolve bind address {address}: {source}")]
    Resolve {
        /// Address as supplied.
        address: String,
        /// Resolver failure.
        #[source]
        source: io::Error,
    },
    /// The bind address resolved to nothing.
    #[error("no socket addresses resolved for {address}")]
    ResolveEmpty {
        /// Address as supplied.
        address: String,
    },
    /// Binding the resolved address failed, typically because it is in use.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    Bind {
        /// Resolved address.
        addr: SocketAddr,
        /// Operating system failure.
        #[source]
        source: io::Error,
    },
    /// The bound socket could not be switched to non-blocking mode.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        /// Operating system failure.
        #[source]
        source: io::Error,
    },
    /// The bound socket did not report its local address.
    #[error("failed to read listener address: {source}")]
    LocalAddr {
        /// Operating system failure.
        #[source]
        source: io::Error,
    },
    /// The supplied configuration cannot be served with.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
