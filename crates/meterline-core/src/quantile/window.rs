//! Sliding time window over a ring of CKMS sketches.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::ckms::CkmsQuantiles;
use super::Target;
use crate::clock::Clock;

struct Ring {
    buckets: Vec<CkmsQuantiles>,
    current: usize,
    last_rotate: Instant,
}

/// Quantiles over roughly the last `max_age` of observations.
///
/// Every observation goes into every sketch of the ring; sketches are reset
/// one at a time, each `max_age / age_buckets`. The sketch under the cursor
/// is the one that has gone longest without a reset, so it answers queries.
pub struct TimeWindowQuantiles {
    targets: Arc<[Target]>,
    clock: Arc<dyn Clock>,
    slice: Duration,
    ring: Mutex<Ring>,
}

impl TimeWindowQuantiles {
    /// `age_buckets` must be at least 1 (checked by `SummaryOptions::validate`).
    pub fn new(
        targets: Arc<[Target]>,
        clock: Arc<dyn Clock>,
        max_age: Duration,
        age_buckets: usize,
    ) -> Self {
        let age_buckets = age_buckets.max(1);
        let buckets = (0..age_buckets)
            .map(|_| CkmsQuantiles::new(Arc::clone(&targets)))
            .collect();
        let slice = max_age / age_buckets as u32;
        let last_rotate = clock.now();

        Self {
            targets,
            clock,
            slice,
            ring: Mutex::new(Ring {
                buckets,
                current: 0,
                last_rotate,
            }),
        }
    }

    pub fn insert(&self, value: f64) {
        let mut ring = self.rotate();
        for bucket in ring.buckets.iter_mut() {
            bucket.insert(value);
        }
    }

    /// Estimated value at `q` over the window; NaN when the window is empty.
    pub fn get(&self, q: f64) -> f64 {
        let mut ring = self.rotate();
        let current = ring.current;
        ring.buckets[current].get(q)
    }

    /// Lock the ring and age out every slice that elapsed since the last call.
    fn rotate(&self) -> MutexGuard<'_, Ring> {
        let now = self.clock.now();
        // A sketch is swapped whole, so a poisoned ring is still consistent.
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);

        let mut elapsed = now.saturating_duration_since(ring.last_rotate);
        while !self.slice.is_zero() && elapsed > self.slice {
            let current = ring.current;
            ring.buckets[current] = CkmsQuantiles::new(Arc::clone(&self.targets));
            ring.current = (current + 1) % ring.buckets.len();
            ring.last_rotate += self.slice;
            elapsed -= self.slice;
            tracing::trace!(bucket = current, "summary window rotated");
        }

        ring
    }
}
