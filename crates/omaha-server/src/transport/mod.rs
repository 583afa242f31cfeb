//! Listener binding for the protocol server.
//!
//! The listener is bound when the server is constructed so that address
//! conflicts surface immediately and port `0` resolves before serving.

mod errors;
mod listener;

pub use self::errors::BindError;
pub(crate) use self::listener::BoundListener;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
