use std::sync::Arc;

use crate::atomic::{AtomicCount, AtomicF64};

use super::{Metric, MetricKind, MetricRef};

/// Append `+Inf` unless the caller already ended with it.
///
/// Bounds are taken in the caller's order; they are not sorted.
pub fn with_infinity(buckets: &[f64]) -> Arc<[f64]> {
    let mut bounds = buckets.to_vec();
    if bounds.last() != Some(&f64::INFINITY) {
        bounds.push(f64::INFINITY);
    }
    bounds.into()
}

/// Per-bucket counts plus a running sum.
///
/// Each observation increments exactly one bucket; cumulative counts are
/// only derived when the histogram is read.
#[derive(Debug)]
pub struct Histogram {
    upper_bounds: Arc<[f64]>,
    counts: Box<[AtomicCount]>,
    sum: AtomicF64,
}

/// One exported bucket: observations `<= upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub cumulative_count: u64,
    pub upper_bound: f64,
}

/// Read-time view of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSample {
    pub count: u64,
    pub sum: f64,
    pub buckets: Vec<Bucket>,
}

impl Histogram {
    /// `upper_bounds` must end with `+Inf` (see [`with_infinity`]).
    pub fn new(upper_bounds: Arc<[f64]>) -> Self {
        let counts = upper_bounds.iter().map(|_| AtomicCount::default()).collect();
        Self {
            upper_bounds,
            counts,
            sum: AtomicF64::default(),
        }
    }

    pub fn observe(&self, value: f64) {
        // The last bound is +Inf, so some bucket always matches (NaN aside).
        if let Some(i) = self.upper_bounds.iter().position(|&b| value <= b) {
            self.counts[i].increment(1);
        }
        self.sum.increment(value);
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper_bounds
    }

    pub fn sample(&self) -> HistogramSample {
        let mut acc = 0u64;
        let buckets = self
            .counts
            .iter()
            .zip(self.upper_bounds.iter())
            .map(|(count, &upper_bound)| {
                acc += count.get();
                Bucket {
                    cumulative_count: acc,
                    upper_bound,
                }
            })
            .collect();

        HistogramSample {
            count: acc,
            sum: self.sum.get(),
            buckets,
        }
    }
}

impl Metric for Histogram {
    const KIND: MetricKind = MetricKind::Histogram;
    type Config = Arc<[f64]>;

    fn create(bounds: &Arc<[f64]>) -> Self {
        Self::new(Arc::clone(bounds))
    }

    fn metric_ref(&self) -> MetricRef<'_> {
        MetricRef::Histogram(self)
    }
}
