//! meterline HTTP exporter library entry.
//!
//! Serves a registry in the Prometheus text format and instruments incoming
//! requests with a duration summary. Consumed by the `meterline-exporter`
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
