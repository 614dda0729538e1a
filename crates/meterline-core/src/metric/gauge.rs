use crate::atomic::AtomicF64;

use super::{Metric, MetricKind, MetricRef};

/// Value that can go up, down, or be set outright.
///
/// Each call is applied exactly once; interleaved `set` and `inc` from
/// different threads land in whatever order the CAS loop serialises them.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicF64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.increment(1.0);
    }

    pub fn inc_by(&self, v: f64) {
        self.value.increment(v);
    }

    pub fn dec(&self) {
        self.value.decrement(1.0);
    }

    pub fn dec_by(&self, v: f64) {
        self.value.decrement(v);
    }

    pub fn set(&self, v: f64) {
        self.value.set(v);
    }

    pub fn get(&self) -> f64 {
        self.value.get()
    }
}

impl Metric for Gauge {
    const KIND: MetricKind = MetricKind::Gauge;
    type Config = ();

    fn create(_: &()) -> Self {
        Self::new()
    }

    fn metric_ref(&self) -> MetricRef<'_> {
        MetricRef::Gauge(self)
    }
}
