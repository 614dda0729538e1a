//! Shared application state for the exporter.

use std::sync::Arc;

use meterline_core::error::Result;
use meterline_core::Registry;

use crate::config::ExporterConfig;
use crate::obs::RequestMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    registry: Arc<Registry>,
    request_metrics: Option<RequestMetrics>,
}

impl AppState {
    /// Build application state over `registry`.
    ///
    /// Fails when the request summary cannot be registered, e.g. because the
    /// configured name is already taken by another metric kind.
    pub fn new(cfg: ExporterConfig, registry: Arc<Registry>) -> Result<Self> {
        let request_metrics = if cfg.request_metrics.enabled {
            Some(RequestMetrics::new(&registry, &cfg.request_metrics)?)
        } else {
            None
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                request_metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn request_metrics(&self) -> Option<&RequestMetrics> {
        self.inner.request_metrics.as_ref()
    }
}
