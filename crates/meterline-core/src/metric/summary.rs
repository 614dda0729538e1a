use std::sync::Arc;
use std::time::Duration;

use crate::atomic::{AtomicCount, AtomicF64};
use crate::clock::Clock;
use crate::options::SummaryOptions;
use crate::quantile::{Target, TimeWindowQuantiles};

use super::{Metric, MetricKind, MetricRef};

/// Per-family summary settings shared by all label instances.
pub struct SummaryConfig {
    /// Sorted by quantile.
    targets: Arc<[Target]>,
    max_age: Duration,
    age_buckets: usize,
    clock: Arc<dyn Clock>,
}

impl SummaryConfig {
    pub fn new(options: &SummaryOptions, clock: Arc<dyn Clock>) -> Self {
        let mut targets: Vec<Target> = options.objectives.iter().copied().map(Target::from).collect();
        targets.sort_by(|a, b| a.quantile.total_cmp(&b.quantile));

        Self {
            targets: targets.into(),
            max_age: options.max_age,
            age_buckets: options.age_buckets,
            clock,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

/// One exported quantile estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileValue {
    pub quantile: f64,
    pub value: f64,
}

/// Read-time view of a summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySample {
    pub count: u64,
    pub sum: f64,
    /// Ascending by quantile.
    pub quantiles: Vec<QuantileValue>,
}

/// Count and sum of observations, with windowed quantiles when objectives exist.
///
/// `count` and `sum` are independent cells: a reader may see one updated and
/// not yet the other. The exposed count never comes from the sketches, which
/// see every observation once per ring bucket.
pub struct Summary {
    count: AtomicCount,
    sum: AtomicF64,
    targets: Arc<[Target]>,
    window: Option<TimeWindowQuantiles>,
}

impl Summary {
    pub fn new(config: &SummaryConfig) -> Self {
        let window = (!config.targets.is_empty()).then(|| {
            TimeWindowQuantiles::new(
                Arc::clone(&config.targets),
                Arc::clone(&config.clock),
                config.max_age,
                config.age_buckets,
            )
        });

        Self {
            count: AtomicCount::default(),
            sum: AtomicF64::default(),
            targets: Arc::clone(&config.targets),
            window,
        }
    }

    pub fn observe(&self, value: f64) {
        self.count.increment(1);
        self.sum.increment(value);
        if let Some(window) = &self.window {
            window.insert(value);
        }
    }

    /// Estimate at `q` over the current window (NaN when empty or untracked).
    pub fn quantile(&self, q: f64) -> f64 {
        self.window.as_ref().map_or(f64::NAN, |w| w.get(q))
    }

    pub fn sample(&self) -> SummarySample {
        let quantiles = self
            .targets
            .iter()
            .map(|t| QuantileValue {
                quantile: t.quantile,
                value: self.quantile(t.quantile),
            })
            .collect();

        SummarySample {
            count: self.count.get(),
            sum: self.sum.get(),
            quantiles,
        }
    }
}

impl std::fmt::Debug for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summary")
            .field("count", &self.count.get())
            .field("sum", &self.sum.get())
            .field("targets", &self.targets)
            .finish()
    }
}

impl Metric for Summary {
    const KIND: MetricKind = MetricKind::Summary;
    type Config = SummaryConfig;

    fn create(config: &SummaryConfig) -> Self {
        Self::new(config)
    }

    fn metric_ref(&self) -> MetricRef<'_> {
        MetricRef::Summary(self)
    }
}
