use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Deserialize;

use meterline_core::error::{MetricsError, Result};
use meterline_core::labels::{is_valid_name, validate_metric_name};
use meterline_core::{MetricOptions, Objective, SummaryOptions};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub request_metrics: RequestMetricsSection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.request_metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            MetricsError::Config(format!("server.listen must be a socket address: {e}"))
        })?;
        if !self.metrics_path.starts_with('/') {
            return Err(MetricsError::Config(
                "server.metrics_path must start with '/'".into(),
            ));
        }
        if self.metrics_path == "/healthz" {
            return Err(MetricsError::Config(
                "server.metrics_path must not shadow /healthz".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:9184".into()
}

fn default_metrics_path() -> String {
    "/metrics".into()
}

/// Request duration instrumentation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestMetricsSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_metric_name")]
    pub metric_name: String,

    #[serde(default = "default_true")]
    pub include_status_code: bool,

    #[serde(default)]
    pub include_method: bool,

    #[serde(default)]
    pub include_path: bool,

    /// Paths (lowercased) that are never measured.
    #[serde(default)]
    pub ignore_routes_concrete: Vec<String>,

    #[serde(default)]
    pub ignore_routes_contains: Vec<String>,

    #[serde(default)]
    pub ignore_routes_starts_with: Vec<String>,

    /// Constant labels appended after the request labels, ordered by name.
    #[serde(default)]
    pub custom_labels: BTreeMap<String, String>,

    /// Summary objectives; the summary defaults apply when absent.
    #[serde(default)]
    pub objectives: Option<Vec<Objective>>,
}

impl Default for RequestMetricsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            metric_name: default_metric_name(),
            include_status_code: true,
            include_method: false,
            include_path: false,
            ignore_routes_concrete: Vec::new(),
            ignore_routes_contains: Vec::new(),
            ignore_routes_starts_with: Vec::new(),
            custom_labels: BTreeMap::new(),
            objectives: None,
        }
    }
}

impl RequestMetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_metric_name(&self.metric_name)
            .map_err(|e| MetricsError::Config(format!("request_metrics.metric_name: {e}")))?;

        for name in self.custom_labels.keys() {
            if !is_valid_name(name) || name.starts_with("__") {
                return Err(MetricsError::Config(format!(
                    "request_metrics.custom_labels: invalid label name '{name}'"
                )));
            }
            if ["status_code", "method", "path", "quantile"].contains(&name.as_str()) {
                return Err(MetricsError::Config(format!(
                    "request_metrics.custom_labels: '{name}' is reserved"
                )));
            }
        }

        self.summary_options()
            .validate()
            .map_err(|e| MetricsError::Config(format!("request_metrics.objectives: {e}")))
    }

    /// Label names in recording order.
    pub fn label_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(3 + self.custom_labels.len());
        if self.include_status_code {
            names.push("status_code".to_string());
        }
        if self.include_method {
            names.push("method".to_string());
        }
        if self.include_path {
            names.push("path".to_string());
        }
        names.extend(self.custom_labels.keys().cloned());
        names
    }

    pub fn summary_options(&self) -> SummaryOptions {
        let names = self.label_names();
        let help = format!(
            "duration summary of http responses labeled with: {}",
            names.join(", ")
        );

        let mut options = SummaryOptions::from(MetricOptions::with_help(help).labels(names));
        if let Some(objectives) = &self.objectives {
            options.objectives = objectives.clone();
        }
        options
    }
}

fn default_metric_name() -> String {
    "http_request_duration_seconds".into()
}

fn default_true() -> bool {
    true
}
