//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `<metrics_path>` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use meterline_core::error::MetricsError;
use meterline_core::exposition::CONTENT_TYPE;
use meterline_core::{render_bytes, CancelToken};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Cancels the export when the scrape future is dropped (client went away).
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let registry = state.registry();
    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());

    // Rendering walks every family and takes summary locks; keep it off the executor.
    let rendered = tokio::task::spawn_blocking(move || {
        let res = render_bytes(&registry, &cancel);
        if let Err(MetricsError::Cancelled) = &res {
            tracing::warn!("metrics scrape cancelled before completion");
        }
        res
    })
    .await;

    match rendered {
        Ok(Ok(body)) => {
            tracing::debug!(bytes = body.len(), "metrics rendered");
            (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, code = e.code().as_str(), "metrics render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "metrics render task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
