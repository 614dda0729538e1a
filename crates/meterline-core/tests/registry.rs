//! Registry get-or-create, removal, kind conflicts and snapshots.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use meterline_core::{
    global, render_text, HistogramOptions, MetricKind, MetricOptions, Registry, SampleValue,
    SummaryOptions,
};

#[test]
fn existing_family_wins_over_new_options() {
    let registry = Registry::new();
    let first = registry
        .counter("jobs_total", MetricOptions::with_help("first"))
        .unwrap();
    let second = registry
        .counter("jobs_total", MetricOptions::with_help("second").labels(["queue"]))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.descriptor().help, "first");
    assert!(second.label_names().is_empty());
    assert_eq!(registry.len(), 1);
}

#[test]
fn kind_conflict_is_reported() {
    let registry = Registry::new();
    registry.gauge("temperature", MetricOptions::default()).unwrap();

    let err = registry
        .counter("temperature", MetricOptions::default())
        .unwrap_err();
    assert_eq!(err.code().as_str(), "TYPE_CONFLICT");
    assert_eq!(
        err.to_string(),
        "metric temperature is already registered as a gauge, not a counter"
    );

    assert!(registry
        .histogram("temperature", HistogramOptions::default())
        .is_err());
    assert!(registry
        .summary("temperature", SummaryOptions::default())
        .is_err());
    assert_eq!(registry.get("temperature").unwrap().kind(), MetricKind::Gauge);
}

#[test]
fn failed_construction_registers_nothing() {
    let registry = Registry::new();
    let err = registry
        .histogram("h", HistogramOptions::from(MetricOptions::default().labels(["le"])))
        .unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_LABELS");
    assert!(registry.is_empty());
    assert!(registry.get("h").is_none());
}

#[test]
fn remove_drops_family_and_instances() {
    let registry = Registry::new();
    assert!(!registry.remove("missing"));

    let family = registry
        .counter("c", MetricOptions::default().labels(["k"]))
        .unwrap();
    family.with_labels(&["a"]).unwrap().inc();

    assert!(registry.remove("c"));
    assert!(!registry.remove("c"));
    assert!(registry.is_empty());
    assert_eq!(render_text(&registry).unwrap(), "");

    let fresh = registry
        .counter("c", MetricOptions::default().labels(["k"]))
        .unwrap();
    assert!(!Arc::ptr_eq(&family, &fresh));
    assert!(fresh.is_empty());
}

#[test]
fn concurrent_registration_yields_one_family() {
    let registry = Arc::new(Registry::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let family = registry
                    .counter("shared_total", MetricOptions::default())
                    .unwrap();
                family.inc().unwrap();
                registry
                    .gauge(&format!("own_{i}"), MetricOptions::default())
                    .unwrap();
                family
            })
        })
        .collect();
    let families: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for f in &families[1..] {
        assert!(Arc::ptr_eq(&families[0], f));
    }
    assert_eq!(families[0].unlabeled().unwrap().get(), 8.0);
    assert_eq!(registry.len(), 9);
}

#[test]
fn snapshot_collects_every_kind() {
    let registry = Registry::new();
    registry
        .counter("a_total", MetricOptions::with_help("a"))
        .unwrap()
        .inc_by(2.0)
        .unwrap();
    registry
        .gauge("b", MetricOptions::default().labels(["x"]))
        .unwrap()
        .with_labels(&["1"])
        .unwrap()
        .set(5.0);
    registry
        .histogram("c", HistogramOptions::default())
        .unwrap()
        .observe(0.2)
        .unwrap();
    registry
        .summary("d", SummaryOptions::default().metric.suppress_initial_value().into())
        .unwrap();

    let snapshot = registry.snapshot();
    let names: Vec<&str> = snapshot.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a_total", "b", "c", "d"]);

    assert_eq!(snapshot[0].help, "a");
    assert_eq!(snapshot[0].instances[0].value, SampleValue::Counter(2.0));
    assert_eq!(
        snapshot[1].instance(&["1"]).unwrap().labels,
        vec![("x".to_string(), "1".to_string())]
    );
    match &snapshot[2].instances[0].value {
        SampleValue::Histogram(h) => assert_eq!(h.count, 1),
        other => panic!("unexpected sample {other:?}"),
    }
    assert_eq!(snapshot[3].kind, MetricKind::Summary);
    assert!(snapshot[3].instances.is_empty());
}

#[test]
fn global_registry_is_shared() {
    let a = global();
    let b = global();
    assert!(Arc::ptr_eq(&a, &b));

    a.counter("registry_test_global_total", MetricOptions::default())
        .unwrap()
        .inc()
        .unwrap();
    assert!(b.get("registry_test_global_total").is_some());
}
