//! meterline core: in-process metric storage and Prometheus text exposition.
//!
//! Counters, gauges, histograms and summaries are grouped into named
//! families inside a [`Registry`]. All updates are lock-free except summary
//! quantile tracking, which takes a short per-instance lock around its
//! sketches. Export walks the registry with a [`Visitor`]; the
//! [`exposition`] module provides the text-format writer.
//!
//! # Failure model
//! `unwrap`, `expect` and `panic!` are denied in this crate. Invalid names,
//! label arity, kind conflicts and negative counter increments all surface
//! as `MetricsError`; contention is retried internally and never reported.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod atomic;
pub mod clock;
pub mod error;
pub mod exposition;
pub mod family;
pub mod labels;
pub mod metric;
pub mod options;
pub mod quantile;
pub mod registry;
pub mod snapshot;
pub mod visit;

/// Shared result type.
pub use error::{ErrorCode, MetricsError, Result};

pub use clock::{Clock, ManualClock, SystemClock};
pub use exposition::{render_bytes, render_text, render_text_with, CancelToken, TextWriter};
pub use family::{CounterFamily, Family, GaugeFamily, HistogramFamily, SummaryFamily};
pub use labels::LabelKey;
pub use metric::{Counter, Gauge, Histogram, MetricKind, Summary};
pub use options::{
    exponential_buckets, linear_buckets, HistogramOptions, MetricOptions, Objective,
    SummaryOptions,
};
pub use registry::{global, AnyFamily, Registry};
pub use snapshot::{FamilySnapshot, InstanceSnapshot, SampleValue};
pub use visit::Visitor;
