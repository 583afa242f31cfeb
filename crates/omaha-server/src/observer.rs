//! Structured reporting of server lifecycle transitions.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::server::ServeError;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Observer notified as a [`Server`](crate::Server) moves through its
/// lifecycle.
pub trait LifecycleObserver: Send + Sync {
    /// Invoked once the listener is bound.
    fn bound(&self, addr: SocketAddr);

    /// Invoked when the server starts accepting exchanges.
    fn serving(&self, addr: SocketAddr);

    /// Invoked when a stop has been requested.
    fn stopping(&self, addr: SocketAddr);

    /// Invoked after the listener has been released.
    fn stopped(&self, addr: SocketAddr);

    /// Invoked when serving ends because of a failure.
    fn serve_failed(&self, addr: SocketAddr, error: &ServeError);
}

impl<T> LifecycleObserver for Arc<T>
where
    T: LifecycleObserver,
{
    fn bound(&self, addr: SocketAddr) {
        (**self).bound(addr);
    }

    fn serving(&self, addr: SocketAddr) {
        (**self).serving(addr);
    }

    fn stopping(&self, addr: SocketAddr) {
        (**self).stopping(addr);
    }

    fn stopped(&self, addr: SocketAddr) {
        (**self).stopped(addr);
    }

    fn serve_failed(&self, addr: SocketAddr, error: &ServeError) {
        (**self).serve_failed(addr, error);
    }
}

/// Default observer that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleObserver;

impl StructuredLifecycleObserver {
    /// Builds a new observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleObserver for StructuredLifecycleObserver {
    fn bound(&self, addr: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bound",
            addr = %addr,
            "server listener bound"
        );
    }

    fn serving(&self, addr: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "serving",
            addr = %addr,
            "server accepting update requests"
        );
    }

    fn stopping(&self, addr: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "stopping",
            addr = %addr,
            "server stop requested"
        );
    }

    fn stopped(&self, addr: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "stopped",
            addr = %addr,
            "server stopped"
        );
    }

    fn serve_failed(&self, addr: SocketAddr, error: &ServeError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "serve_failed",
            addr = %addr,
            error = %error,
            "server failed while serving"
        );
    }
}
