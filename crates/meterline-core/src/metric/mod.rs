//! Metric kinds and the per-label instance state behind them.

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod summary;

use std::fmt;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::{Bucket, Histogram, HistogramSample};
pub use summary::{QuantileValue, Summary, SummaryConfig, SummarySample};

/// Kind tag of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }

    /// Label name the kind emits itself and callers may not declare.
    pub fn reserved_label(self) -> Option<&'static str> {
        match self {
            MetricKind::Histogram => Some("le"),
            MetricKind::Summary => Some("quantile"),
            MetricKind::Counter | MetricKind::Gauge => None,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of one instance, tagged by kind.
#[derive(Debug, Clone, Copy)]
pub enum MetricRef<'a> {
    Counter(&'a Counter),
    Gauge(&'a Gauge),
    Histogram(&'a Histogram),
    Summary(&'a Summary),
}

/// State of one label combination inside a family.
pub trait Metric: Send + Sync + Sized + 'static {
    const KIND: MetricKind;

    /// Construction state shared by every instance of a family.
    type Config: Send + Sync;

    fn create(config: &Self::Config) -> Self;

    fn metric_ref(&self) -> MetricRef<'_>;
}
