//! Server side of the Omaha v3 update-check protocol.
//!
//! Clients `POST` an XML `<request>` naming one or more applications; the
//! server answers each application in order using a host-supplied
//! [`Updater`] and replies with an XML `<response>`.
//!
//! ```no_run
//! use omaha_server::{Server, UpdaterStub};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Server::bind("127.0.0.1:0", UpdaterStub)?;
//! let handle = server.handle();
//! std::thread::spawn(move || {
//!     // ... later, from any thread:
//!     handle.stop()
//! });
//! server.serve()?;
//! # Ok(())
//! # }
//! ```

mod dispatch;
mod observer;
pub mod process;
mod server;
mod service;
pub mod telemetry;
mod transport;
mod updater;

#[cfg(test)]
mod tests;

pub use dispatch::Dispatcher;
pub use observer::{LifecycleObserver, StructuredLifecycleObserver};
pub use server::{ServeError, Server, ServerHandle, StopError};
pub use service::{ServiceSettings, router};
pub use transport::BindError;
pub use updater::{DecisionError, Updater, UpdaterStub};
