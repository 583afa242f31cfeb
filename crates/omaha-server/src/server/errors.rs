//! Error types for the server lifecycle.

use std::io;

use thiserror::Error;

/// Errors returned by [`Server::serve`](crate::Server::serve).
#[derive(Debug, Error)]
pub enum ServeError {
    /// Another call to `serve` is already running.
    #[error("server is already serving")]
    AlreadyServing,
    /// The async runtime backing the server could not be built.
    #[error("failed to start server runtime: {source}")]
    Runtime {
        /// Operating system failure.
        #[source]
        source: io::Error,
    },
    /// The listener failed while serving.
    #[error("listener failed: {source}")]
    Listener {
        /// Operating system failure.
        #[source]
        source: io::Error,
    },
}

/// Errors returned by [`Server::stop`](crate::Server::stop).
#[derive(Debug, Error)]
pub enum StopError {
    /// `stop` ran on one of the server's own threads, where waiting for the
    /// drain would never finish. The stop has still been requested.
    #[error("stop requested from a server thread; shutdown proceeds without waiting")]
    FromServerThread,
}
