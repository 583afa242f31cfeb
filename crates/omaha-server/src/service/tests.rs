//! Unit tests for the HTTP service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request as HttpRequest, StatusCode, header};
use omaha_protocol::codec::decode_response;
use omaha_protocol::{AppRequest, Request, UpdateStatus};
use rstest::{fixture, rstest};
use tower::ServiceExt;

use super::*;
use crate::updater::{DecisionError, Updater, UpdaterStub};

const NOUPDATE_REQUEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<request protocol="3.0">
    <app appid="foo" version="1.0">
        <updatecheck/>
    </app>
</request>
"#;

/// Counts how often the dispatcher reached the updater.
#[derive(Debug, Default)]
struct CountingUpdater {
    checks: AtomicUsize,
}

impl Updater for CountingUpdater {
    fn check_app(&self, _request: &Request, _app: &AppRequest) -> Result<(), DecisionError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct PanickingUpdater;

impl Updater for PanickingUpdater {
    fn check_app(&self, _request: &Request, _app: &AppRequest) -> Result<(), DecisionError> {
        panic!("decision logic exploded");
    }
}

struct SlowUpdater(Duration);

impl Updater for SlowUpdater {
    fn check_app(&self, _request: &Request, _app: &AppRequest) -> Result<(), DecisionError> {
        thread::sleep(self.0);
        Ok(())
    }
}

#[fixture]
fn settings() -> ServiceSettings {
    ServiceSettings::default()
}

fn post(path: &str, body: impl Into<Body>) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "text/xml")
        .body(body.into())
        .expect("request builds")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    String::from_utf8(bytes.to_vec()).expect("body is UTF-8")
}

#[rstest]
#[tokio::test]
async fn answers_update_checks_with_xml(settings: ServiceSettings) {
    let app = router(Dispatcher::new(UpdaterStub, "omaha-rs"), &settings);

    let response = app
        .oneshot(post("/v1/update/", NOUPDATE_REQUEST))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some(XML_CONTENT_TYPE)
    );
    let document = decode_response(body_text(response).await.as_bytes()).expect("response decodes");
    assert_eq!(document.server, "omaha-rs");
    assert_eq!(document.apps.len(), 1);
    assert_eq!(
        document.apps[0].update_check.as_ref().map(|check| &check.status),
        Some(&UpdateStatus::NoUpdate)
    );
}

#[rstest]
#[case::not_xml("definitely not xml")]
#[case::wrong_root(r#"<response protocol="3.0"/>"#)]
#[case::old_protocol(r#"<request protocol="2.0"><app appid="foo"/></request>"#)]
#[tokio::test]
async fn rejects_undecodable_bodies_without_consulting_the_updater(
    settings: ServiceSettings,
    #[case] body: &'static str,
) {
    let updater = Arc::new(CountingUpdater::default());
    let app = router(Dispatcher::new(Arc::clone(&updater), "omaha-rs"), &settings);

    let response = app
        .oneshot(post("/v1/update/", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!body_text(response).await.is_empty(), "400 carries a reason");
    assert_eq!(updater.checks.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn rejects_other_methods_on_the_update_path(settings: ServiceSettings) {
    let app = router(Dispatcher::new(UpdaterStub, "omaha-rs"), &settings);

    let request = HttpRequest::builder()
        .method(Method::GET)
        .uri("/v1/update/")
        .body(Body::empty())
        .expect("request builds");
    let response = app.oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[rstest]
#[tokio::test]
async fn unknown_paths_are_not_found(settings: ServiceSettings) {
    let app = router(Dispatcher::new(UpdaterStub, "omaha-rs"), &settings);

    let response = app
        .oneshot(post("/v2/update/", NOUPDATE_REQUEST))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_bodies_are_refused() {
    let settings = ServiceSettings {
        max_body_bytes: 64,
        ..ServiceSettings::default()
    };
    let updater = Arc::new(CountingUpdater::default());
    let app = router(Dispatcher::new(Arc::clone(&updater), "omaha-rs"), &settings);

    let response = app
        .oneshot(post("/v1/update/", NOUPDATE_REQUEST))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(updater.checks.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn dispatch_panics_become_server_errors(settings: ServiceSettings) {
    let app = router(Dispatcher::new(PanickingUpdater, "omaha-rs"), &settings);

    let response = app
        .oneshot(post("/v1/update/", NOUPDATE_REQUEST))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn slow_exchanges_time_out_when_limited() {
    let settings = ServiceSettings {
        exchange_timeout: Some(Duration::from_millis(20)),
        ..ServiceSettings::default()
    };
    let app = router(
        Dispatcher::new(SlowUpdater(Duration::from_millis(500)), "omaha-rs"),
        &settings,
    );

    let response = app
        .oneshot(post("/v1/update/", NOUPDATE_REQUEST))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn settings_follow_configuration() {
    let config = Config {
        update_path: "/service/update2".to_owned(),
        max_body_bytes: 4_096,
        exchange_timeout_ms: 1_500,
        ..Config::default()
    };

    let settings = ServiceSettings::from_config(&config);

    assert_eq!(settings.update_path(), "/service/update2");
    assert_eq!(settings.max_body_bytes(), 4_096);
    assert_eq!(
        settings.exchange_timeout(),
        Some(Duration::from_millis(1_500))
    );
}
