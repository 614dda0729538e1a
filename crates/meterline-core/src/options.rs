//! Construction options for metric families.
//!
//! Options are plain structs with public fields and documented defaults, so
//! call sites read as `HistogramOptions { buckets, ..Default::default() }`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{MetricsError, Result};

/// Options shared by every metric kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricOptions {
    /// `# HELP` text. Empty help omits the line.
    pub help: String,
    /// Declared label names, fixed for the lifetime of the family.
    pub label_names: Vec<String>,
    /// Do not materialise the unlabeled instance on export.
    pub suppress_initial_value: bool,
}

impl MetricOptions {
    pub fn with_help(help: impl Into<String>) -> Self {
        Self {
            help: help.into(),
            ..Self::default()
        }
    }

    pub fn labels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn suppress_initial_value(mut self) -> Self {
        self.suppress_initial_value = true;
        self
    }
}

/// `.005, .01, .025, .05, .075, .1, .25, .5, .75, 1, 2.5, 5, 7.5, 10`
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramOptions {
    pub metric: MetricOptions,
    /// Ascending upper bounds; `+Inf` is appended when missing.
    pub buckets: Vec<f64>,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            metric: MetricOptions::default(),
            buckets: DEFAULT_BUCKETS.to_vec(),
        }
    }
}

impl From<MetricOptions> for HistogramOptions {
    fn from(metric: MetricOptions) -> Self {
        Self {
            metric,
            ..Self::default()
        }
    }
}

/// Arithmetic sequence `start, start + width, ...` of `count` bounds.
pub fn linear_buckets(start: f64, width: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * width).collect()
}

/// Geometric sequence `start, start * factor, ...` of `count` bounds.
pub fn exponential_buckets(start: f64, factor: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| start * factor.powi(i as i32))
        .collect()
}

/// Target quantile with its allowed rank error.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Objective {
    pub quantile: f64,
    pub epsilon: f64,
}

impl Objective {
    pub const fn new(quantile: f64, epsilon: f64) -> Self {
        Self { quantile, epsilon }
    }
}

/// `0.5 ± 0.05`, `0.9 ± 0.01`, `0.99 ± 0.001`
pub const DEFAULT_OBJECTIVES: [Objective; 3] = [
    Objective::new(0.5, 0.05),
    Objective::new(0.9, 0.01),
    Objective::new(0.99, 0.001),
];

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(600);
pub const DEFAULT_AGE_BUCKETS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    pub metric: MetricOptions,
    /// Quantiles to estimate. Empty disables quantile tracking entirely.
    pub objectives: Vec<Objective>,
    /// Observations older than this no longer influence quantiles.
    pub max_age: Duration,
    /// Number of sketches in the aging ring.
    pub age_buckets: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            metric: MetricOptions::default(),
            objectives: DEFAULT_OBJECTIVES.to_vec(),
            max_age: DEFAULT_MAX_AGE,
            age_buckets: DEFAULT_AGE_BUCKETS,
        }
    }
}

impl From<MetricOptions> for SummaryOptions {
    fn from(metric: MetricOptions) -> Self {
        Self {
            metric,
            ..Self::default()
        }
    }
}

impl SummaryOptions {
    pub fn validate(&self) -> Result<()> {
        validate_objectives(&self.objectives)?;
        if self.objectives.is_empty() {
            return Ok(());
        }
        if self.age_buckets == 0 {
            return Err(MetricsError::InvalidOptions(
                "summary age_buckets must be at least 1".into(),
            ));
        }
        if self.max_age.is_zero() {
            return Err(MetricsError::InvalidOptions(
                "summary max_age must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

pub fn validate_objectives(objectives: &[Objective]) -> Result<()> {
    for (i, o) in objectives.iter().enumerate() {
        if !(o.quantile > 0.0 && o.quantile < 1.0) {
            return Err(MetricsError::InvalidOptions(format!(
                "objective quantile {} must be in (0, 1)",
                o.quantile
            )));
        }
        if !(0.0..1.0).contains(&o.epsilon) {
            return Err(MetricsError::InvalidOptions(format!(
                "objective epsilon {} must be in [0, 1)",
                o.epsilon
            )));
        }
        if objectives[..i].iter().any(|p| p.quantile == o.quantile) {
            return Err(MetricsError::InvalidOptions(format!(
                "objective quantile {} is listed twice",
                o.quantile
            )));
        }
    }
    Ok(())
}
