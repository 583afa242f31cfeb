//! TCP listener binding.

use std::net::{SocketAddr, TcpListener, ToSocketAddrs};

use tracing::info;

use super::{BindError, LISTENER_TARGET};

/// A listener bound eagerly, before any serving begins.
#[derive(Debug)]
pub(crate) struct BoundListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl BoundListener {
    /// Resolves `address` (`host:port`) and binds the first usable result.
    ///
    /// Port `0` asks the operating system for an ephemeral port; the chosen
    /// port is available through [`BoundListener::local_addr`].
    pub(crate) fn bind(address: &str) -> Result<Self, BindError> {
        let listener = bind_tcp(address)?;
        listener
            .set_nonblocking(true)
            .map_err(|source| BindError::NonBlocking { source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| BindError::LocalAddr { source })?;

        info!(
            target: LISTENER_TARGET,
            requested = address,
            local_addr = %local_addr,
            "listener bound"
        );
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub(crate) fn into_std(self) -> TcpListener {
        self.listener
    }
}

fn bind_tcp(address: &str) -> Result<TcpListener, BindError> {
    let mut addrs = address
        .to_socket_addrs()
        .map_err(|source| BindError::Resolve {
            address: address.to_owned(),
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| BindError::ResolveEmpty {
            address: address.to_owned(),
        })?;
    TcpListener::bind(addr).map_err(|source| BindError::Bind { addr, source })
}
