//! Per-application dispatch of a decoded request.
//!
//! The dispatcher walks the request's application entries in order, asks the
//! [`Updater`] about each one and assembles the matching response entry. A
//! failed decision only affects its own entry; the rest of the batch is
//! answered normally.


use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use omaha_protocol::{
    AppRequest, AppResponse, AppStatus, Request, Response, UpdateResponse, UpdateStatus,
};
use tracing::{debug, warn};

use crate::updater::Updater;

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
const SECONDS_PER_DAY: u64 = 86_400;

/// Turns decoded requests into responses using an [`Updater`].
///
/// Cloning is cheap: clones share the same updater.
#[derive(Clone)]
pub struct Dispatcher {
    updater: Arc<dyn Updater>,
    server_name: Arc<str>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Builds a dispatcher that reports `server_name` in every response.
    #[must_use]
    pub fn new(updater: impl Updater, server_name: &str) -> Self {
        Self {
            updater: Arc::new(updater),
            server_name: Arc::from(server_name),
        }
    }

    /// Answers every application entry of `request`, in request order.
    #[must_use]
    pub fn handle(&self, request: &Request) -> Response {
        let mut response = Response::new(self.server_name.as_ref());
        response.day_start.elapsed_seconds = seconds_since_midnight(SystemTime::now());
        response.apps = request
            .apps
            .iter()
            .map(|app| self.handle_app(request, app))
            .collect();

        debug!(
            target: DISPATCH_TARGET,
            apps = response.apps.len(),
            session_id = request.session_id.as_deref().unwrap_or_default(),
            "request dispatched"
        );
        response
    }

    fn handle_app(&self, request: &Request, app: &AppRequest) -> AppResponse {
        let mut response = AppResponse::new(app.id.clone(), AppStatus::Ok);

        if let Err(error) = self.updater.check_app(request, app) {
            warn!(
                target: DISPATCH_TARGET,
                app_id = %app.id,
                error = %error,
                "application check failed"
            );
            response.status = error.into_app_status();
            return response;
        }

        if app.wants_update_check() {
            response.update_check = Some(self.check_update(request, app));
        }

        for event in &app.events {
            self.updater.event(request, app, event);
            response.add_event();
        }

        if app.ping.is_some() {
            self.updater.ping(request, app);
            response.add_ping();
        }

        response
    }

    fn check_update(&self, request: &Request, app: &AppRequest) -> UpdateResponse {
        match self.updater.check_update(request, app) {
            Ok(Some(update)) => UpdateResponse::from(update),
            Ok(None) => UpdateResponse::with_status(UpdateStatus::NoUpdate),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    app_id = %app.id,
                    error = %error,
                    "update check failed"
                );
                UpdateResponse::with_status(error.into_update_status())
            }
        }
    }
}

/// Seconds elapsed between the last UTC midnight and `now`.
fn seconds_since_midnight(now: SystemTime) -> u64 {
    now.duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs().rem_euclid(SECONDS_PER_DAY))
}
