//! Request duration instrumentation.
//!
//! Every request whose lowercased path escapes the ignore rules is timed
//! around the inner handler and recorded in seconds on one summary family.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

use meterline_core::error::Result;
use meterline_core::{Registry, SummaryFamily};

use crate::app_state::AppState;
use crate::config::RequestMetricsSection;

pub struct RequestMetrics {
    durations: Arc<SummaryFamily>,
    include_status_code: bool,
    include_method: bool,
    include_path: bool,
    custom_values: Vec<String>,
    ignore_concrete: Vec<String>,
    ignore_contains: Vec<String>,
    ignore_starts_with: Vec<String>,
}

impl RequestMetrics {
    /// Get or create the duration summary in `registry`.
    pub fn new(registry: &Registry, cfg: &RequestMetricsSection) -> Result<Self> {
        let durations = registry.summary(&cfg.metric_name, cfg.summary_options())?;

        Ok(Self {
            durations,
            include_status_code: cfg.include_status_code,
            include_method: cfg.include_method,
            include_path: cfg.include_path,
            custom_values: cfg.custom_labels.values().cloned().collect(),
            ignore_concrete: cfg.ignore_routes_concrete.clone(),
            ignore_contains: cfg.ignore_routes_contains.clone(),
            ignore_starts_with: cfg.ignore_routes_starts_with.clone(),
        })
    }

    pub fn family(&self) -> &Arc<SummaryFamily> {
        &self.durations
    }

    /// `route` is the lowercased request path.
    pub fn is_ignored(&self, route: &str) -> bool {
        self.ignore_starts_with.iter().any(|p| route.starts_with(p.as_str()))
            || self.ignore_contains.iter().any(|p| route.contains(p.as_str()))
            || self.ignore_concrete.iter().any(|p| route == p)
    }

    /// Values in the order of the family's label names.
    pub fn label_values(&self, status: StatusCode, method: &Method, route: &str) -> Vec<String> {
        let mut values = Vec::with_capacity(self.durations.label_names().len());
        if self.include_status_code {
            values.push(status.as_u16().to_string());
        }
        if self.include_method {
            values.push(method.as_str().to_string());
        }
        if self.include_path {
            values.push(route.to_string());
        }
        values.extend(self.custom_values.iter().cloned());
        values
    }

    pub fn record(&self, values: &[String], elapsed: Duration) -> Result<()> {
        self.durations
            .with_labels(values)?
            .observe(elapsed.as_secs_f64());
        Ok(())
    }
}

/// Middleware timing the inner handler. A no-op when request metrics are off.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(metrics) = state.request_metrics() else {
        return next.run(request).await;
    };

    let route = request.uri().path().to_lowercase();
    if metrics.is_ignored(&route) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    let values = metrics.label_values(response.status(), &method, &route);
    if let Err(e) = metrics.record(&values, elapsed) {
        tracing::warn!(error = %e, %route, "request duration not recorded");
    }
    response
}
