//! Counter, gauge and histogram behaviour plus the cells underneath.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use meterline_core::atomic::{AtomicCount, AtomicF64};
use meterline_core::metric::histogram::with_infinity;
use meterline_core::{
    exponential_buckets, linear_buckets, Counter, Family, Gauge, Histogram, HistogramOptions,
    MetricOptions,
};

#[test]
fn concurrent_increments_are_never_lost() {
    let cell = Arc::new(AtomicF64::default());
    let count = Arc::new(AtomicCount::default());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cell = Arc::clone(&cell);
            let count = Arc::clone(&count);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    cell.increment(0.5);
                    count.increment(1);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(cell.get(), 40_000.0);
    assert_eq!(count.get(), 80_000);
}

#[test]
fn modify_returns_published_value() {
    let cell = AtomicF64::new(2.0);
    assert_eq!(cell.modify(|v, m| v * m, 3.0), 6.0);
    assert_eq!(cell.decrement(1.0), 5.0);
    cell.set(-1.0);
    assert_eq!(cell.get(), -1.0);
}

#[test]
fn counter_starts_at_zero_and_rejects_negative() {
    let counter = Counter::new();
    assert_eq!(counter.get(), 0.0);

    counter.inc();
    counter.inc_by(2.5).unwrap();
    assert_eq!(counter.get(), 3.5);

    let err = counter.inc_by(-1.0).unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_VALUE");
    assert!(counter.inc_by(f64::NAN).is_err());
    assert_eq!(counter.get(), 3.5);

    counter.inc_by(0.0).unwrap();
    assert_eq!(counter.get(), 3.5);
}

#[test]
fn gauge_moves_both_ways() {
    let gauge = Gauge::new();
    gauge.set(-1.0);
    gauge.inc_by(3.0);
    assert_eq!(gauge.get(), 2.0);

    gauge.dec();
    gauge.dec_by(4.0);
    assert_eq!(gauge.get(), -3.0);

    gauge.inc();
    assert_eq!(gauge.get(), -2.0);
}

#[test]
fn family_shortcuts_use_unlabeled_instance() {
    let counter = Family::counter("c", MetricOptions::default()).unwrap();
    counter.inc().unwrap();
    counter.inc_by(4.0).unwrap();
    assert_eq!(counter.unlabeled().unwrap().get(), 5.0);

    let gauge = Family::gauge("g", MetricOptions::default()).unwrap();
    gauge.set(10.0).unwrap();
    gauge.dec_by(2.0).unwrap();
    gauge.inc_by(0.5).unwrap();
    assert_eq!(gauge.unlabeled().unwrap().get(), 8.5);
    gauge.inc().unwrap();
    gauge.dec().unwrap();
    gauge.dec().unwrap();
    assert_eq!(gauge.unlabeled().unwrap().get(), 7.5);

    let labeled = Family::counter("l", MetricOptions::default().labels(["a"])).unwrap();
    assert_eq!(labeled.inc().unwrap_err().code().as_str(), "INVALID_LABELS");
}

#[test]
fn same_label_values_share_one_instance() {
    let family =
        Family::counter("requests", MetricOptions::default().labels(["method", "code"])).unwrap();

    let a = family.with_labels(&["GET", "200"]).unwrap();
    let b = family.with_labels(&["GET".to_string(), "200".to_string()]).unwrap();
    let c = family.with_labels(&["POST", "200"]).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(family.len(), 2);

    a.inc();
    assert_eq!(b.get(), 1.0);
    assert_eq!(c.get(), 0.0);

    assert!(family.get(&["POST", "200"]).is_some());
    assert!(family.get(&["PUT", "200"]).is_none());
    assert!(family.get(&["GET"]).is_none());

    let err = family.with_labels(&["GET"]).unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_LABELS");
    assert_eq!(family.len(), 2);
}

#[test]
fn concurrent_label_lookups_converge() {
    let family = Arc::new(Family::counter("c", MetricOptions::default().labels(["k"])).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let family = Arc::clone(&family);
            thread::spawn(move || {
                for i in 0..100 {
                    family.with_labels(&[format!("v{}", i % 10)]).unwrap().inc();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(family.len(), 10);
    for i in 0..10 {
        let counter = family.get(&[format!("v{i}")]).unwrap();
        assert_eq!(counter.get(), 80.0);
    }
}

#[test]
fn invalid_names_are_rejected_at_construction() {
    let err = Family::gauge("has-dash", MetricOptions::default()).err().unwrap();
    assert_eq!(err.code().as_str(), "INVALID_NAME");

    let err = Family::gauge("ok", MetricOptions::default().labels(["9lives"]))
        .err()
        .unwrap();
    assert_eq!(err.code().as_str(), "INVALID_NAME");

    let err = Family::gauge("ok", MetricOptions::default().labels(["__name"]))
        .err()
        .unwrap();
    assert_eq!(err.code().as_str(), "INVALID_LABELS");

    assert!(Family::gauge("ns:sub_metric", MetricOptions::default().labels(["le"])).is_ok());
}

#[test]
fn histogram_appends_infinity() {
    let histogram = Histogram::new(with_infinity(&[1.0, 2.0]));
    assert_eq!(histogram.upper_bounds(), &[1.0, 2.0, f64::INFINITY]);

    let already = with_infinity(&[1.0, f64::INFINITY]);
    assert_eq!(&already[..], &[1.0, f64::INFINITY]);

    let empty = with_infinity(&[]);
    assert_eq!(&empty[..], &[f64::INFINITY]);
}

#[test]
fn histogram_bucket_bounds_are_inclusive() {
    let histogram = Histogram::new(with_infinity(&[1.0, 2.5, 5.0]));
    histogram.observe(2.5);
    histogram.observe(0.1);
    histogram.observe(100.0);

    let sample = histogram.sample();
    let cumulative: Vec<u64> = sample.buckets.iter().map(|b| b.cumulative_count).collect();
    assert_eq!(cumulative, vec![1, 2, 2, 3]);
    assert_eq!(sample.count, 3);
    assert_eq!(sample.sum, 102.6);
}

#[test]
fn histogram_family_rejects_le_label() {
    let options = HistogramOptions::from(MetricOptions::default().labels(["le"]));
    let err = Family::histogram("h", options).err().unwrap();
    assert_eq!(err.code().as_str(), "INVALID_LABELS");
    assert!(err.to_string().contains("histogram"));
}

#[test]
fn histogram_defaults_to_standard_buckets() {
    let family = Family::histogram("h", HistogramOptions::default()).unwrap();
    let histogram = family.unlabeled().unwrap();
    assert_eq!(histogram.upper_bounds().len(), 15);
    assert_eq!(histogram.upper_bounds()[0], 0.005);
    assert_eq!(histogram.upper_bounds()[13], 10.0);

    family.observe(0.3).unwrap();
    assert_eq!(histogram.sample().buckets[7].cumulative_count, 1);
    assert_eq!(histogram.sample().buckets[6].cumulative_count, 0);
}

#[test]
fn bucket_generators() {
    assert_eq!(linear_buckets(1.0, 2.0, 3), vec![1.0, 3.0, 5.0]);
    assert_eq!(exponential_buckets(2.0, 2.5, 3), vec![2.0, 5.0, 12.5]);
    assert!(linear_buckets(0.0, 1.0, 0).is_empty());
}
