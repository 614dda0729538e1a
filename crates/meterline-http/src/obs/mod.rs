//! Metrics the exporter records about itself.
//!
//! - `request_metrics`: per-request duration summary (axum middleware).
//! - `process_start_time_seconds`: set once at startup.

pub mod request_metrics;

use std::time::{SystemTime, UNIX_EPOCH};

use meterline_core::error::Result;
use meterline_core::{MetricOptions, Registry};

pub use request_metrics::{track_requests, RequestMetrics};

/// Register `process_start_time_seconds` with the current wall-clock time.
pub fn register_process_metrics(registry: &Registry) -> Result<()> {
    let started = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();

    registry
        .gauge(
            "process_start_time_seconds",
            MetricOptions::with_help("Start time of the process since unix epoch in seconds."),
        )?
        .set(started)
}
