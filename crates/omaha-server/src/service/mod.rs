//! HTTP surface of the protocol server.
//!
//! One route accepts `POST` bodies on the configured update path. Bodies are
//! decoded before any decision logic runs, so malformed input never reaches
//! the [`Updater`](crate::Updater). Dispatch runs on a blocking worker; a
//! panic there is contained to the exchange and answered with 500.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use omaha_config::Config;
use omaha_protocol::codec::{decode_request, encode_response};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::error::Elapsed;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::dispatch::Dispatcher;

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");
const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Routing and limits applied to each exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    update_path: String,
    max_body_bytes: usize,
    exchange_timeout: Option<Duration>,
}

impl ServiceSettings {
    /// Extracts the settings from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            update_path: config.update_path().to_owned(),
            max_body_bytes: config.max_body_bytes(),
            exchange_timeout: config.exchange_timeout(),
        }
    }

    /// Path that accepts update requests.
    #[must_use]
    pub fn update_path(&self) -> &str {
        &self.update_path
    }

    /// Largest request body accepted, in bytes.
    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Upper bound on a single exchange, if any.
    #[must_use]
    pub const fn exchange_timeout(&self) -> Option<Duration> {
        self.exchange_timeout
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug)]
struct ExchangeState {
    dispatcher: Dispatcher,
    exchange_timeout: Option<Duration>,
}

/// Builds the router serving update requests.
#[must_use]
pub fn router(dispatcher: Dispatcher, settings: &ServiceSettings) -> Router {
    let state = Arc::new(ExchangeState {
        dispatcher,
        exchange_timeout: settings.exchange_timeout,
    });

    Router::new()
        .route(&settings.update_path, post(handle_update))
        .with_state(state)
        .layer(DefaultBodyLimit::max(settings.max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

async fn handle_update(State(state): State<Arc<ExchangeState>>, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(decode_error) => {
            warn!(
                target: SERVICE_TARGET,
                error = %decode_error,
                body_bytes = body.len(),
                "rejected undecodable request"
            );
            return (StatusCode::BAD_REQUEST, decode_error.to_string()).into_response();
        }
    };

    let dispatcher = state.dispatcher.clone();
    let worker = tokio::task::spawn_blocking(move || {
        let response = dispatcher.handle(&request);
        encode_response(&response)
    });

    let Ok(joined) = within_budget(worker, state.exchange_timeout).await else {
        warn!(
            target: SERVICE_TARGET,
            timeout = ?state.exchange_timeout,
            "exchange timed out"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "exchange timed out").into_response();
    };

    match joined {
        Ok(Ok(document)) => ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], document).into_response(),
        Ok(Err(encode_error)) => {
            error!(
                target: SERVICE_TARGET,
                error = %encode_error,
                "failed to encode response"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(join_error) => {
            error!(
                target: SERVICE_TARGET,
                error = %join_error,
                "dispatch worker failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Awaits `worker`, giving up once `budget` elapses. No budget waits forever.
async fn within_budget<T>(
    worker: JoinHandle<T>,
    budget: Option<Duration>,
) -> Result<Result<T, JoinError>, Elapsed> {
    let Some(limit) = budget else {
        return Ok(worker.await);
    };
    tokio::time::timeout(limit, worker).await
}
