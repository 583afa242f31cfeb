//! Lifecycle of the protocol server.
//!
//! A [`Server`] binds its listener on construction, serves on a dedicated
//! multi-threaded runtime while [`Server::serve`] blocks, and shuts down
//! gracefully when [`Server::stop`] (or [`ServerHandle::stop`] from another
//! thread) is called. The lifecycle only moves forward:
//! `Created -> Serving -> Stopped`, or `Created -> Stopped` for a server that
//! never served.

mod errors;

use std::cell::Cell;
use std::fmt;
use std::mem;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use axum::Router;
use omaha_config::Config;
use tokio::net::TcpListener;
use tokio::runtime;
use tokio::sync::watch;

pub use self::errors::{ServeError, StopError};

use crate::dispatch::Dispatcher;
use crate::observer::{LifecycleObserver, StructuredLifecycleObserver};
use crate::service::{self, ServiceSettings};
use crate::transport::{BindError, BoundListener};
use crate::updater::Updater;

const RUNTIME_THREAD_NAME: &str = "omaha-exchange";

/// Source of per-server identities; zero marks threads owned by no server.
static NEXT_SERVER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Identity of the server whose runtime owns the current thread.
    static RUNTIME_OWNER: Cell<u64> = const { Cell::new(0) };
}

/// An Omaha protocol server bound to a local address.
///
/// Dropping a server requests a stop without waiting for it.
pub struct Server {
    shared: Arc<Shared>,
}

/// Cloneable handle used to stop a [`Server`] from other threads.
#[derive(Clone)]
pub struct ServerHandle {
    shared: Arc<Shared>,
}

struct Shared {
    id: u64,
    local_addr: SocketAddr,
    state: Mutex<State>,
    state_changed: Condvar,
    shutdown: watch::Sender<bool>,
    observer: Arc<dyn LifecycleObserver>,
}

enum State {
    Created(Pending),
    Serving,
    Stopped,
}

struct Pending {
    listener: BoundListener,
    router: Router,
}

impl Server {
    /// Binds `address` (`host:port`) with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] when the address cannot be resolved or bound.
    pub fn bind(address: &str, updater: impl Updater) -> Result<Self, BindError> {
        let config = Config {
            bind_address: address.to_owned(),
            ..Config::default()
        };
        Self::from_config(&config, updater)
    }

    /// Binds the configured address and applies the configured limits.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Config`] when the configuration fails validation
    /// and [`BindError`]'s other variants when binding fails.
    pub fn from_config(config: &Config, updater: impl Updater) -> Result<Self, BindError> {
        Self::from_config_with_observer(config, updater, StructuredLifecycleObserver::new())
    }

    /// Like [`Server::from_config`], reporting lifecycle transitions to
    /// `observer`.
    ///
    /// # Errors
    ///
    /// As for [`Server::from_config`].
    pub fn from_config_with_observer(
        config: &Config,
        updater: impl Updater,
        observer: impl LifecycleObserver + 'static,
    ) -> Result<Self, BindError> {
        config.validate()?;
        let listener = BoundListener::bind(config.bind_address())?;
        let local_addr = listener.local_addr();

        let dispatcher = Dispatcher::new(updater, config.server_name());
        let router = service::router(dispatcher, &ServiceSettings::from_config(config));

        observer.bound(local_addr);
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            shared: Arc::new(Shared {
                id: NEXT_SERVER_ID.fetch_add(1, Ordering::Relaxed),
                local_addr,
                state: Mutex::new(State::Created(Pending { listener, router })),
                state_changed: Condvar::new(),
                shutdown,
                observer: Arc::new(observer),
            }),
        })
    }

    /// Address the listener is bound to, with any ephemeral port resolved.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.shared.local_addr
    }

    /// Serves exchanges until the server is stopped.
    ///
    /// Returns `Ok(())` immediately when the server was stopped before
    /// serving began.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::AlreadyServing`] when another call is serving,
    /// and [`ServeError::Runtime`] or [`ServeError::Listener`] when serving
    /// cannot start or the listener fails.
    pub fn serve(&self) -> Result<(), ServeError> {
        self.shared.serve()
    }

    /// Stops accepting, waits for in-flight exchanges to finish and releases
    /// the listener. Calling `stop` again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StopError::FromServerThread`] when called from within one of
    /// this server's own exchanges, where waiting would deadlock. The stop
    /// still proceeds. Exchanges of other servers may stop this one and wait.
    pub fn stop(&self) -> Result<(), StopError> {
        self.shared.stop()
    }

    /// Returns a handle that can stop the server from another thread.
    #[must_use]
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shared.request_stop();
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("local_addr", &self.shared.local_addr)
            .finish_non_exhaustive()
    }
}

impl ServerHandle {
    /// Address the server's listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.shared.local_addr
    }

    /// Stops the server. See [`Server::stop`].
    ///
    /// # Errors
    ///
    /// As for [`Server::stop`].
    pub fn stop(&self) -> Result<(), StopError> {
        self.shared.stop()
    }
}

impl fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHandle")
            .field("local_addr", &self.shared.local_addr)
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn serve(&self) -> Result<(), ServeError> {
        let pending = {
            let mut state = self.lock_state();
            match mem::replace(&mut *state, State::Serving) {
                State::Created(pending) => pending,
                State::Serving => return Err(ServeError::AlreadyServing),
                State::Stopped => {
                    *state = State::Stopped;
                    return Ok(());
                }
            }
        };

        let result = self.run(pending);
        if let Err(error) = &result {
            self.observer.serve_failed(self.local_addr, error);
        }
        self.finish();
        result
    }

    fn run(&self, pending: Pending) -> Result<(), ServeError> {
        let id = self.id;
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name(RUNTIME_THREAD_NAME)
            .on_thread_start(move || RUNTIME_OWNER.with(|owner| owner.set(id)))
            .build()
            .map_err(|source| ServeError::Runtime { source })?;

        let Pending {
            listener: bound,
            router,
        } = pending;
        let shutdown = self.shutdown.subscribe();
        let addr = self.local_addr;
        let observer = Arc::clone(&self.observer);

        let result = runtime.block_on(async move {
            let listener = TcpListener::from_std(bound.into_std())
                .map_err(|source| ServeError::Listener { source })?;
            observer.serving(addr);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_requested(shutdown))
                .await
                .map_err(|source| ServeError::Listener { source })
        });

        // Exchanges have drained; only timed-out workers can remain.
        runtime.shutdown_background();
        result
    }

    fn finish(&self) {
        *self.lock_state() = State::Stopped;
        self.state_changed.notify_all();
        self.observer.stopped(self.local_addr);
    }

    fn stop(&self) -> Result<(), StopError> {
        let mut state = self.lock_state();
        let serving = match *state {
            State::Stopped => return Ok(()),
            State::Created(_) => false,
            State::Serving => true,
        };

        if !serving {
            self.observer.stopping(self.local_addr);
            self.release(state);
            return Ok(());
        }

        if !self.shutdown.send_replace(true) {
            self.observer.stopping(self.local_addr);
        }
        if self.runs_current_thread() {
            return Err(StopError::FromServerThread);
        }
        while matches!(*state, State::Serving) {
            state = self
                .state_changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        Ok(())
    }

    fn request_stop(&self) {
        let state = self.lock_state();
        let serving = match *state {
            State::Stopped => return,
            State::Created(_) => false,
            State::Serving => true,
        };

        if serving {
            if !self.shutdown.send_replace(true) {
                self.observer.stopping(self.local_addr);
            }
        } else {
            self.observer.stopping(self.local_addr);
            self.release(state);
        }
    }

    /// Whether the caller is one of this server's own runtime threads, where
    /// waiting for the drain would deadlock.
    fn runs_current_thread(&self) -> bool {
        RUNTIME_OWNER.with(Cell::get) == self.id
    }

    /// Drops a listener that never served.
    fn release(&self, mut state: MutexGuard<'_, State>) {
        *state = State::Stopped;
        drop(state);
        self.state_changed.notify_all();
        self.observer.stopped(self.local_addr);
    }
}

async fn shutdown_requested(mut signal: watch::Receiver<bool>) {
    // A closed channel means the server is gone; stop either way.
    drop(signal.wait_for(|stop| *stop).await);
}
