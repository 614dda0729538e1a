//! Cormode, Korn, Muthukrishnan and Srivastava targeted-quantile sketch.
//!
//! "Effective Computation of Biased Quantiles over Data Streams", ICDE 2005.
//! A generalisation of Greenwald-Khanna that lets every targeted quantile
//! carry its own error bound, which keeps high percentiles cheap.
//!
//! The sketch is not synchronised; `TimeWindowQuantiles` serialises access.

use std::sync::Arc;

use super::Target;

/// Raw observations are batched before being merged into the sample.
pub const BUFFER_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Item {
    value: f64,
    /// Rank width relative to the previous item.
    g: u64,
    /// Rank uncertainty.
    delta: i64,
}

#[derive(Debug, Clone)]
pub struct CkmsQuantiles {
    targets: Arc<[Target]>,
    /// Observations merged into `sample` so far.
    count: u64,
    /// Sorted by value; `g` sums to `count`.
    sample: Vec<Item>,
    buffer: Vec<f64>,
}

impl CkmsQuantiles {
    pub fn new(targets: Arc<[Target]>) -> Self {
        Self {
            targets,
            count: 0,
            sample: Vec::new(),
            buffer: Vec::with_capacity(BUFFER_CAPACITY),
        }
    }

    pub fn insert(&mut self, value: f64) {
        self.buffer.push(value);
        if self.buffer.len() >= BUFFER_CAPACITY {
            self.flush();
        }
    }

    /// Estimated value at quantile `q`, or NaN when nothing was observed.
    pub fn get(&mut self, q: f64) -> f64 {
        self.flush();

        let Some((first, rest)) = self.sample.split_first() else {
            return f64::NAN;
        };

        let n = self.sample.len();
        let desired = (q * self.count as f64) as u64;
        let bound = desired as f64 + self.allowable_error(desired, n) / 2.0;

        let mut rank_min = 0u64;
        let mut prev = first;
        for cur in rest {
            rank_min += prev.g;
            if (rank_min + cur.g) as f64 + cur.delta as f64 > bound {
                return prev.value;
            }
            prev = cur;
        }

        // asking for the maximum
        prev.value
    }

    /// Total observations, including ones still buffered.
    pub fn count(&self) -> u64 {
        self.count + self.buffer.len() as u64
    }

    /// Number of retained sample items.
    pub fn sample_len(&self) -> usize {
        self.sample.len()
    }

    fn flush(&mut self) {
        if self.insert_batch() {
            self.compress();
        }
    }

    /// f(r, n) from the paper: how wide the rank window at `rank` may be.
    ///
    /// `n` is the current sample length rather than the observation count.
    /// Using the count makes the realised error exceed the configured bounds;
    /// the sample length costs memory but keeps estimates within them.
    fn allowable_error(&self, rank: u64, n: usize) -> f64 {
        let size = n as f64;
        let rank = rank as f64;
        self.targets.iter().fold(size + 1.0, |min, t| {
            let error = if rank <= t.quantile * size {
                t.u * (size - rank)
            } else {
                t.v * rank
            };
            min.min(error)
        })
    }

    /// Merge the sorted buffer into the sample with one forward cursor.
    fn insert_batch(&mut self) -> bool {
        if self.buffer.is_empty() {
            return false;
        }

        let mut batch = std::mem::take(&mut self.buffer);
        batch.sort_by(f64::total_cmp);

        let existing = std::mem::take(&mut self.sample);
        let mut merged = Vec::with_capacity(existing.len() + batch.len());
        let mut cursor = 0;

        for &value in &batch {
            while cursor < existing.len() && existing[cursor].value <= value {
                merged.push(existing[cursor]);
                cursor += 1;
            }

            let rank = merged.len();
            let at_edge = rank == 0 || cursor == existing.len();
            let delta = if at_edge {
                0
            } else {
                let n = merged.len() + (existing.len() - cursor);
                self.allowable_error(rank as u64, n).floor() as i64 - 1
            };

            merged.push(Item { value, g: 1, delta });
            self.count += 1;
        }
        merged.extend_from_slice(&existing[cursor..]);

        self.sample = merged;
        batch.clear();
        self.buffer = batch;
        true
    }

    /// Fold every item whose rank window fits into its successor.
    ///
    /// The rank handed to the error function is the successor's position
    /// before this pass; only the size shrinks as items are folded. The last
    /// item is never a successor, so the maximum keeps its own rank.
    fn compress(&mut self) {
        if self.sample.len() < 2 {
            return;
        }

        let mut size = self.sample.len();
        let last = size - 1;
        let items = std::mem::take(&mut self.sample);
        let mut kept: Vec<Item> = Vec::with_capacity(items.len());

        for (position, mut next) in items.into_iter().enumerate() {
            if (1..last).contains(&position) {
                if let Some(prev) = kept.last().copied() {
                    let width = (prev.g + next.g) as f64 + next.delta as f64;
                    if width <= self.allowable_error(position as u64, size) {
                        next.g += prev.g;
                        kept.pop();
                        size -= 1;
                    }
                }
            }
            kept.push(next);
        }

        self.sample = kept;
    }
}
