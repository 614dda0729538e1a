//! Double-dispatch traversal over registry -> families -> instances.
//!
//! The registry hands its family collection to [`Visitor::visit_collection`];
//! the visitor calls [`AnyFamily::accept`] on the families it wants, each
//! family calls [`Visitor::visit_family`] with its instances, and each
//! [`Instance::accept`] calls the kind-specific method.

use std::collections::BTreeMap;

use crate::family::Descriptor;
use crate::labels::LabelKey;
use crate::metric::{HistogramSample, MetricRef, SummarySample};
use crate::registry::AnyFamily;

pub trait Visitor {
    type Output;

    fn visit_collection(&mut self, families: Families<'_>) -> Self::Output;

    fn visit_family(&mut self, family: &Descriptor, instances: Instances<'_>) -> Self::Output;

    fn visit_counter(&mut self, value: f64, labels: &LabelKey) -> Self::Output;

    fn visit_gauge(&mut self, value: f64, labels: &LabelKey) -> Self::Output;

    fn visit_histogram(&mut self, sample: &HistogramSample, labels: &LabelKey) -> Self::Output;

    fn visit_summary(&mut self, sample: &SummarySample, labels: &LabelKey) -> Self::Output;
}

/// One registry snapshot, ascending by metric name.
#[derive(Clone, Copy)]
pub struct Families<'a> {
    map: &'a BTreeMap<String, AnyFamily>,
}

impl<'a> Families<'a> {
    pub(crate) fn new(map: &'a BTreeMap<String, AnyFamily>) -> Self {
        Self { map }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a AnyFamily> + 'a {
        self.map.values()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One family snapshot, ascending by label values.
pub struct Instances<'a> {
    entries: Vec<Instance<'a>>,
}

impl<'a> Instances<'a> {
    pub(crate) fn new(entries: Vec<Instance<'a>>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance<'a>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for Instances<'a> {
    type Item = Instance<'a>;
    type IntoIter = std::vec::IntoIter<Instance<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A label combination and its metric state.
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    labels: &'a LabelKey,
    metric: MetricRef<'a>,
}

impl<'a> Instance<'a> {
    pub(crate) fn new(labels: &'a LabelKey, metric: MetricRef<'a>) -> Self {
        Self { labels, metric }
    }

    pub fn labels(&self) -> &'a LabelKey {
        self.labels
    }

    pub fn metric(&self) -> MetricRef<'a> {
        self.metric
    }

    /// Read the instance and dispatch to the matching visitor method.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self.metric {
            MetricRef::Counter(c) => visitor.visit_counter(c.get(), self.labels),
            MetricRef::Gauge(g) => visitor.visit_gauge(g.get(), self.labels),
            MetricRef::Histogram(h) => visitor.visit_histogram(&h.sample(), self.labels),
            MetricRef::Summary(s) => visitor.visit_summary(&s.sample(), self.labels),
        }
    }
}
