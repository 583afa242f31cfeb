//! Behavioural tests for update exchanges over HTTP.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use omaha_config::Config;
use omaha_protocol::codec::decode_response;
use omaha_protocol::{AppResponse, AppStatus, Response};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{
    Exchange, Rule, RunningServer, ScriptedUpdater, ephemeral_config, get, post, update_request,
};

const UPDATE_PATH: &str = "/v1/update/";

struct ExchangeWorld {
    config: Config,
    updater: Arc<ScriptedUpdater>,
    server: Option<RunningServer>,
    exchange: Option<Exchange>,
    completion_order: Vec<String>,
}

impl ExchangeWorld {
    fn new() -> Self {
        Self {
            config: ephemeral_config(),
            updater: Arc::new(ScriptedUpdater::default()),
            server: None,
            exchange: None,
            completion_order: Vec::new(),
        }
    }

    fn start(&mut self) {
        self.server = Some(RunningServer::start(
            &self.config,
            Arc::clone(&self.updater),
        ));
    }

    fn server(&self) -> &RunningServer {
        self.server.as_ref().expect("server should be running")
    }

    fn exchange(&self) -> &Exchange {
        self.exchange.as_ref().expect("an exchange should have run")
    }

    fn response(&self) -> Response {
        decode_response(self.exchange().body.as_bytes()).expect("response decodes")
    }

    fn app(&self, id: &str) -> AppResponse {
        self.response()
            .apps
            .into_iter()
            .find(|app| app.id == id)
            .unwrap_or_else(|| panic!("no application {id} in response"))
    }
}

#[fixture]
fn world() -> RefCell<ExchangeWorld> {
    RefCell::new(ExchangeWorld::new())
}

#[given("a running server with no updates available")]
fn given_running_server(world: &RefCell<ExchangeWorld>) {
    world.borrow_mut().start();
}

#[given("a running server whose updater fails for \"{app}\"")]
fn given_failing_updater(world: &RefCell<ExchangeWorld>, app: String) {
    world.borrow().updater.script(&app, Rule::Fail);
    world.borrow_mut().start();
}

#[given("a running server offering version \"{version}\" of \"{app}\"")]
fn given_offering_server(world: &RefCell<ExchangeWorld>, version: String, app: String) {
    world.borrow().updater.script(&app, Rule::Offer(version));
    world.borrow_mut().start();
}

#[given("the updater rejects \"{app}\" as \"{status}\"")]
fn given_rejection(world: &RefCell<ExchangeWorld>, app: String, status: String) {
    world
        .borrow()
        .updater
        .script(&app, Rule::Reject(AppStatus::from(status)));
}

#[given("a running server whose updater takes {millis} milliseconds for \"{app}\"")]
fn given_slow_updater(world: &RefCell<ExchangeWorld>, millis: u64, app: String) {
    world
        .borrow()
        .updater
        .script(&app, Rule::Delay(Duration::from_millis(millis)));
    world.borrow_mut().start();
}

#[given("a running server accepting at most {limit} bytes")]
fn given_limited_server(world: &RefCell<ExchangeWorld>, limit: usize) {
    world.borrow_mut().config.max_body_bytes = limit;
    world.borrow_mut().start();
}

#[when("a client checks for updates to \"{app}\" version \"{version}\"")]
fn when_single_check(world: &RefCell<ExchangeWorld>, app: String, version: String) {
    let addr = world.borrow().server().addr();
    let exchange = post(addr, UPDATE_PATH, &update_request(&[(app.as_str(), version.as_str())]));
    world.borrow_mut().exchange = Some(exchange);
}

#[when("a client checks for updates to \"{first}\", \"{second}\" and \"{third}\"")]
fn when_batch_check(world: &RefCell<ExchangeWorld>, first: String, second: String, third: String) {
    let addr = world.borrow().server().addr();
    let body = update_request(&[
        (first.as_str(), "1.0"),
        (second.as_str(), "1.0"),
        (third.as_str(), "1.0"),
    ]);
    let exchange = post(addr, UPDATE_PATH, &body);
    world.borrow_mut().exchange = Some(exchange);
}

#[when("a client posts the body \"{body}\"")]
fn when_raw_post(world: &RefCell<ExchangeWorld>, body: String) {
    let addr = world.borrow().server().addr();
    let exchange = post(addr, UPDATE_PATH, &body);
    world.borrow_mut().exchange = Some(exchange);
}

#[when("a client posts a request padded to {size} bytes")]
fn when_padded_post(world: &RefCell<ExchangeWorld>, size: usize) {
    let addr = world.borrow().server().addr();
    let mut body = update_request(&[("foo", "1.0")]);
    let padding = size.saturating_sub(body.len());
    body.push_str(&" ".repeat(padding));
    let exchange = post(addr, UPDATE_PATH, &body);
    world.borrow_mut().exchange = Some(exchange);
}

#[when("a client sends GET to the update path")]
fn when_get(world: &RefCell<ExchangeWorld>) {
    let addr = world.borrow().server().addr();
    let exchange = get(addr, UPDATE_PATH);
    world.borrow_mut().exchange = Some(exchange);
}

#[when("a client posts an update request to \"{path}\"")]
fn when_post_elsewhere(world: &RefCell<ExchangeWorld>, path: String) {
    let addr = world.borrow().server().addr();
    let exchange = post(addr, &path, &update_request(&[("foo", "1.0")]));
    world.borrow_mut().exchange = Some(exchange);
}

#[when("a request for \"{slow}\" is followed shortly by a request for \"{fast}\"")]
fn when_overlapping_requests(world: &RefCell<ExchangeWorld>, slow: String, fast: String) {
    let addr = world.borrow().server().addr();
    let (done_tx, done_rx) = mpsc::channel();

    let handles: Vec<_> = [slow, fast]
        .into_iter()
        .enumerate()
        .map(|(index, app)| {
            let done_tx = done_tx.clone();
            // Stagger the second request so the first is already in dispatch.
            let delay = Duration::from_millis(100 * u64::try_from(index).expect("small index"));
            thread::spawn(move || {
                thread::sleep(delay);
                let exchange = post(addr, UPDATE_PATH, &update_request(&[(app.as_str(), "1.0")]));
                assert_eq!(exchange.status, 200, "request for {app} failed");
                done_tx.send(app).expect("completion recorded");
            })
        })
        .collect();
    drop(done_tx);

    for handle in handles {
        handle.join().expect("client thread completes");
    }
    world.borrow_mut().completion_order = done_rx.iter().collect();
}

#[then("the response status is {status}")]
fn then_status(world: &RefCell<ExchangeWorld>, status: u16) {
    let world = world.borrow();
    let exchange = world.exchange();
    assert_eq!(
        exchange.status, status,
        "unexpected status, body: {}",
        exchange.body
    );
}

#[then("the response lists {count} application")]
fn then_app_count(world: &RefCell<ExchangeWorld>, count: usize) {
    assert_eq!(world.borrow().response().apps.len(), count);
}

#[then("the response is attributed to \"{server}\" with protocol \"{protocol}\"")]
fn then_attribution(world: &RefCell<ExchangeWorld>, server: String, protocol: String) {
    let response = world.borrow().response();
    assert_eq!(response.server, server);
    assert_eq!(response.protocol, protocol);
}

#[then("application \"{app}\" has status \"{status}\"")]
fn then_app_status(world: &RefCell<ExchangeWorld>, app: String, status: String) {
    let answer = world.borrow().app(&app);
    assert_eq!(answer.status.as_str(), status);
}

#[then("application \"{app}\" is answered with update status \"{status}\"")]
fn then_update_status(world: &RefCell<ExchangeWorld>, app: String, status: String) {
    let answer = world.borrow().app(&app);
    let check = answer
        .update_check
        .unwrap_or_else(|| panic!("application {app} has no update check"));
    assert_eq!(check.status.as_str(), status);
}

#[then("application \"{app}\" is offered version \"{version}\"")]
fn then_offered_version(world: &RefCell<ExchangeWorld>, app: String, version: String) {
    let answer = world.borrow().app(&app);
    let manifest = answer
        .update_check
        .and_then(|check| check.manifest)
        .unwrap_or_else(|| panic!("application {app} was offered nothing"));
    assert_eq!(manifest.version, version);
}

#[then("the applications are answered in the order \"{order}\"")]
fn then_order(world: &RefCell<ExchangeWorld>, order: String) {
    let ids: Vec<String> = world
        .borrow()
        .response()
        .apps
        .into_iter()
        .map(|app| app.id)
        .collect();
    let expected: Vec<&str> = order.split(',').collect();
    assert_eq!(ids, expected);
}

#[then("the updater was consulted {count} times")]
fn then_consulted(world: &RefCell<ExchangeWorld>, count: usize) {
    assert_eq!(world.borrow().updater.consulted(), count);
}

#[then("the request for \"{app}\" completes first")]
fn then_completes_first(world: &RefCell<ExchangeWorld>, app: String) {
    let world = world.borrow();
    assert_eq!(
        world.completion_order.first(),
        Some(&app),
        "completion order: {:?}",
        world.completion_order
    );
}

#[scenario(
    path = "tests/features/update_exchange.feature",
    name = "A single application without an update"
)]
fn single_application_without_update(#[from(world)] world: RefCell<ExchangeWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/update_exchange.feature",
    name = "Malformed requests never reach the updater"
)]
fn malformed_requests_never_reach_updater(#[from(world)] world: RefCell<ExchangeWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/update_exchange.feature",
    name = "A failing decision yields an error entry"
)]
fn failing_decision_yields_error_entry(#[from(world)] world: RefCell<ExchangeWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/update_exchange.feature",
    name = "Entries keep their order when some fail"
)]
fn entries_keep_order_when_some_fail(#[from(world)] world: RefCell<ExchangeWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/update_exchange.feature",
    name = "Slow decisions do not hold up other exchanges"
)]
fn slow_decisions_do_not_hold_up_others(#[from(world)] world: RefCell<ExchangeWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/update_exchange.feature",
    name = "Oversized requests are refused"
)]
fn oversized_requests_are_refused(#[from(world)] world: RefCell<ExchangeWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/update_exchange.feature",
    name = "Other methods on the update path are refused"
)]
fn other_methods_are_refused(#[from(world)] world: RefCell<ExchangeWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/update_exchange.feature",
    name = "Unknown paths are not found"
)]
fn unknown_paths_are_not_found(#[from(world)] world: RefCell<ExchangeWorld>) {
    drop(world);
}
