//! `/metrics` and `/healthz` served through the router.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use meterline_core::{MetricOptions, Registry, SampleValue};
use meterline_http::{app_state::AppState, config, obs, router};

fn app(yaml: &str, registry: Arc<Registry>) -> Router {
    let cfg = config::load_from_str(yaml).unwrap();
    router::build_router(AppState::new(cfg, registry).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn metrics_endpoint_renders_registry() {
    let registry = Arc::new(Registry::new());
    registry
        .counter("x", MetricOptions::with_help("h").labels(["label"]))
        .unwrap()
        .with_labels(&["v"])
        .unwrap()
        .inc();

    let (status, content_type, body) = get(app("version: 1\n", registry), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        content_type.as_deref(),
        Some("text/plain; version=0.0.4; charset=utf-8")
    );
    assert_eq!(body, "# HELP x h\n# TYPE x counter\nx{label=\"v\"} 1\n\n");
}

#[tokio::test]
async fn metrics_path_is_configurable() {
    let registry = Arc::new(Registry::new());
    registry
        .gauge("up", MetricOptions::default())
        .unwrap()
        .set(1.0)
        .unwrap();

    let yaml = "version: 1\nserver:\n  metrics_path: \"/stats\"\n";
    let (status, _, body) = get(app(yaml, Arc::clone(&registry)), "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "# TYPE up gauge\nup 1\n\n");

    let (status, _, _) = get(app(yaml, registry), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn healthz_is_ok() {
    let (status, _, body) = get(app("version: 1\n", Arc::new(Registry::new())), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn empty_registry_scrapes_empty_body() {
    let (status, _, body) = get(app("version: 1\n", Arc::new(Registry::new())), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[test]
fn process_start_time_is_registered() {
    let registry = Registry::new();
    obs::register_process_metrics(&registry).unwrap();

    let family = registry.get("process_start_time_seconds").unwrap();
    let snapshot = family.as_gauge().unwrap().snapshot();
    match snapshot.instances[0].value {
        SampleValue::Gauge(v) => assert!(v > 1_600_000_000.0, "start={v}"),
        ref other => panic!("unexpected sample {other:?}"),
    }
}
