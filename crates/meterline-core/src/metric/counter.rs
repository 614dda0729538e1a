use crate::atomic::AtomicF64;
use crate::error::{MetricsError, Result};

use super::{Metric, MetricKind, MetricRef};

/// Monotonically non-decreasing value.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicF64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by 1.
    pub fn inc(&self) {
        self.value.increment(1.0);
    }

    /// Increment by `v`. Negative values are rejected and leave the counter untouched.
    pub fn inc_by(&self, v: f64) -> Result<()> {
        if v < 0.0 || v.is_nan() {
            return Err(MetricsError::NegativeIncrement(v));
        }
        self.value.increment(v);
        Ok(())
    }

    pub fn get(&self) -> f64 {
        self.value.get()
    }
}

impl Metric for Counter {
    const KIND: MetricKind = MetricKind::Counter;
    type Config = ();

    fn create(_: &()) -> Self {
        Self::new()
    }

    fn metric_ref(&self) -> MetricRef<'_> {
        MetricRef::Counter(self)
    }
}
