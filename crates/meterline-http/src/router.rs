//! Axum router wiring.
//!
//! Exposes the metrics endpoint at the configured path plus `/healthz`, with
//! request instrumentation layered over both.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, obs, ops};

pub fn build_router(state: AppState) -> Router {
    let metrics_path = state.cfg().server.metrics_path.clone();

    Router::new()
        .route(&metrics_path, get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::track_requests,
        ))
        .with_state(state)
}
