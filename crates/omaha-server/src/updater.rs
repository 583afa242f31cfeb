//! Update decision capability supplied by the host.
//!
//! The server owns the protocol exchange; deciding whether an application
//! gets an update belongs to the host. Every method has a default, so a host
//! implements only the questions it cares about. The defaults accept every
//! application and answer every update check with `noupdate`.

use std::error::Error;
use std::sync::Arc;

use omaha_protocol::{AppRequest, AppStatus, EventRequest, Request, Update, UpdateStatus};
use thiserror::Error;

/// Decision logic consulted once per application entry.
///
/// Implementations are shared across concurrent exchanges and must tolerate
/// being called from several threads at once. The server never serialises
/// calls.
pub trait Updater: Send + Sync + 'static {
    /// Gates an application as a whole.
    ///
    /// An error stops processing of this entry: no update check runs and no
    /// events or pings are acknowledged.
    ///
    /// # Errors
    ///
    /// [`DecisionError::App`] rejects the application with the given status.
    /// Any other variant is reported as `error-internal`.
    fn check_app(&self, _request: &Request, _app: &AppRequest) -> Result<(), DecisionError> {
        Ok(())
    }

    /// Answers an update check. Only consulted when the entry carries
    /// `<updatecheck>`.
    ///
    /// # Errors
    ///
    /// [`DecisionError::Update`] answers the check with the given status.
    /// Any other variant is reported as `error-internal`.
    fn check_update(
        &self,
        _request: &Request,
        _app: &AppRequest,
    ) -> Result<Option<Update>, DecisionError> {
        Ok(None)
    }

    /// Observes an event reported by the client.
    fn event(&self, _request: &Request, _app: &AppRequest, _event: &EventRequest) {}

    /// Observes a ping reported by the client.
    fn ping(&self, _request: &Request, _app: &AppRequest) {}
}

impl<T> Updater for Arc<T>
where
    T: Updater,
{
    fn check_app(&self, request: &Request, app: &AppRequest) -> Result<(), DecisionError> {
        (**self).check_app(request, app)
    }

    fn check_update(
        &self,
        request: &Request,
        app: &AppRequest,
    ) -> Result<Option<Update>, DecisionError> {
        (**self).check_update(request, app)
    }

    fn event(&self, request: &Request, app: &AppRequest, event: &EventRequest) {
        (**self).event(request, app, event);
    }

    fn ping(&self, request: &Request, app: &AppRequest) {
        (**self).ping(request, app);
    }
}

/// Updater that never offers an update.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdaterStub;

impl Updater for UpdaterStub {}

/// Failure returned by an [`Updater`] decision.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// Rejects the application with a protocol status.
    #[error("application rejected with status '{0}'")]
    App(AppStatus),

    /// Answers the update check with a protocol status.
    #[error("update check answered with status '{0}'")]
    Update(UpdateStatus),

    /// The decision could not be made.
    #[error("update decision failed: {0}")]
    Failed(#[source] Box<dyn Error + Send + Sync>),
}

impl DecisionError {
    /// Wraps an arbitrary failure.
    #[must_use]
    pub fn failed(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Failed(error.into())
    }

    /// Status written to `<app status="...">` when `check_app` fails.
    pub(crate) fn into_app_status(self) -> AppStatus {
        match self {
            Self::App(status) => status,
            Self::Update(_) | Self::Failed(_) => AppStatus::InternalError,
        }
    }

    /// Status written to `<updatecheck status="...">` when `check_update`
    /// fails.
    pub(crate) fn into_update_status(self) -> UpdateStatus {
        match self {
            Self::Update(status) => status,
            Self::App(_) | Self::Failed(_) => UpdateStatus::InternalError,
        }
    }
}
