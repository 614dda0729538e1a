//! Streaming quantile estimation for summaries.
//!
//! - `ckms`: single-threaded CKMS sketch with batched inserts.
//! - `window`: ring of sketches that ages observations out over time.

pub mod ckms;
pub mod window;

pub use ckms::CkmsQuantiles;
pub use window::TimeWindowQuantiles;

use crate::options::Objective;

/// An objective with the CKMS constants precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub quantile: f64,
    pub epsilon: f64,
    /// `2ε / (1 - q)`, error slope below the target rank.
    pub u: f64,
    /// `2ε / q`, error slope above the target rank.
    pub v: f64,
}

impl Target {
    pub fn new(quantile: f64, epsilon: f64) -> Self {
        Self {
            quantile,
            epsilon,
            u: 2.0 * epsilon / (1.0 - quantile),
            v: 2.0 * epsilon / quantile,
        }
    }
}

impl From<Objective> for Target {
    fn from(o: Objective) -> Self {
        Target::new(o.quantile, o.epsilon)
    }
}
