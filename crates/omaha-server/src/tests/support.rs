//! Shared fixtures for the behavioural suites: a scriptable updater, a
//! server running on a background thread and a blocking HTTP client.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use omaha_config::Config;
use omaha_protocol::codec::encode_request;
use omaha_protocol::{AppRequest, AppStatus, Request, Update};

use crate::{DecisionError, ServeError, Server, StopError, Updater};

/// Behaviour scripted for one application id.
#[derive(Debug, Clone)]
pub(super) enum Rule {
    Offer(String),
    Reject(AppStatus),
    Fail,
    Delay(Duration),
}

/// Updater whose answers are scripted per application id.
#[derive(Debug, Default)]
pub(super) struct ScriptedUpdater {
    rules: Mutex<HashMap<String, Rule>>,
    consulted: AtomicUsize,
}

impl ScriptedUpdater {
    pub(super) fn script(&self, app_id: &str, rule: Rule) {
        self.rules
            .lock()
            .expect("rules lock")
            .insert(app_id.to_owned(), rule);
    }

    pub(super) fn consulted(&self) -> usize {
        self.consulted.load(Ordering::SeqCst)
    }

    fn rule(&self, app_id: &str) -> Option<Rule> {
        self.rules.lock().expect("rules lock").get(app_id).cloned()
    }
}

impl Updater for ScriptedUpdater {
    fn check_app(&self, _request: &Request, app: &AppRequest) -> Result<(), DecisionError> {
        self.consulted.fetch_add(1, Ordering::SeqCst);
        match self.rule(&app.id) {
            Some(Rule::Reject(status)) => Err(DecisionError::App(status)),
            Some(Rule::Fail) => Err(DecisionError::failed("scripted failure")),
            Some(Rule::Delay(delay)) => {
                thread::sleep(delay);
                Ok(())
            }
            Some(Rule::Offer(_)) | None => Ok(()),
        }
    }

    fn check_update(
        &self,
        _request: &Request,
        app: &AppRequest,
    ) -> Result<Option<Update>, DecisionError> {
        match self.rule(&app.id) {
            Some(Rule::Offer(version)) => Ok(Some(Update::new(
                version,
                "https://updates.example.com/stable/",
            ))),
            _ => Ok(None),
        }
    }
}

/// A server serving on a background thread.
pub(super) struct RunningServer {
    server: Arc<Server>,
    serving: Option<JoinHandle<Result<(), ServeError>>>,
}

impl RunningServer {
    pub(super) fn start(config: &Config, updater: Arc<ScriptedUpdater>) -> Self {
        let server = Arc::new(Server::from_config(config, updater).expect("server binds"));
        let serving = {
            let background = Arc::clone(&server);
            thread::spawn(move || background.serve())
        };
        Self {
            server,
            serving: Some(serving),
        }
    }

    pub(super) fn addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub(super) fn stop(&self) -> Result<(), StopError> {
        self.server.stop()
    }

    /// Waits for `serve` to return. Returns `None` if it was already joined.
    pub(super) fn join(&mut self) -> Option<Result<(), ServeError>> {
        self.serving
            .take()
            .map(|handle| handle.join().expect("serve thread panicked"))
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        drop(self.server.stop());
        if let Some(handle) = self.serving.take() {
            drop(handle.join());
        }
    }
}

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub(super) struct Exchange {
    pub(super) status: u16,
    pub(super) body: String,
}

pub(super) fn ephemeral_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_owned(),
        ..Config::default()
    }
}

/// Builds an update-check request for `(app id, version)` pairs.
pub(super) fn update_request(apps: &[(&str, &str)]) -> String {
    let request = Request::new(
        apps.iter()
            .map(|(id, version)| AppRequest::new(*id, *version).with_update_check())
            .collect(),
    );
    encode_request(&request).expect("request encodes")
}

pub(super) fn post(addr: SocketAddr, path: &str, body: &str) -> Exchange {
    let url = format!("http://{addr}{path}");
    finish(
        ureq::post(&url)
            .set("Content-Type", "text/xml")
            .send_string(body),
    )
}

pub(super) fn get(addr: SocketAddr, path: &str) -> Exchange {
    let url = format!("http://{addr}{path}");
    finish(ureq::get(&url).call())
}

fn finish(outcome: Result<ureq::Response, ureq::Error>) -> Exchange {
    let response = match outcome {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(error) => panic!("HTTP exchange failed: {error}"),
    };
    let status = response.status();
    let body = response.into_string().expect("response body reads");
    Exchange { status, body }
}
