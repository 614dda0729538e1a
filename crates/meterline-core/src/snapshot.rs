//! Plain-data copy of a registry or family, built through the visitor protocol.

use crate::family::{Descriptor, Family};
use crate::labels::LabelKey;
use crate::metric::{HistogramSample, Metric, MetricKind, SummarySample};
use crate::registry::Registry;
use crate::visit::{Families, Instances, Visitor};

#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Counter(f64),
    Gauge(f64),
    Histogram(HistogramSample),
    Summary(SummarySample),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSnapshot {
    pub labels: Vec<(String, String)>,
    pub value: SampleValue,
}

impl InstanceSnapshot {
    pub fn label_values(&self) -> Vec<&str> {
        self.labels.iter().map(|(_, v)| v.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilySnapshot {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub instances: Vec<InstanceSnapshot>,
}

impl FamilySnapshot {
    /// Instance whose label values equal `values`.
    pub fn instance(&self, values: &[&str]) -> Option<&InstanceSnapshot> {
        self.instances.iter().find(|i| i.label_values() == values)
    }
}

/// Visitor collecting families in traversal order.
#[derive(Debug, Default)]
pub struct SnapshotVisitor {
    families: Vec<FamilySnapshot>,
}

impl SnapshotVisitor {
    pub fn into_families(self) -> Vec<FamilySnapshot> {
        self.families
    }

    fn push(&mut self, labels: &LabelKey, value: SampleValue) {
        let labels = labels
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        if let Some(family) = self.families.last_mut() {
            family.instances.push(InstanceSnapshot { labels, value });
        }
    }
}

impl Visitor for SnapshotVisitor {
    type Output = ();

    fn visit_collection(&mut self, families: Families<'_>) {
        for family in families.iter() {
            family.accept(self);
        }
    }

    fn visit_family(&mut self, family: &Descriptor, instances: Instances<'_>) {
        self.families.push(FamilySnapshot {
            name: family.name.clone(),
            help: family.help.clone(),
            kind: family.kind,
            instances: Vec::with_capacity(instances.len()),
        });
        for instance in instances.iter() {
            instance.accept(self);
        }
    }

    fn visit_counter(&mut self, value: f64, labels: &LabelKey) {
        self.push(labels, SampleValue::Counter(value));
    }

    fn visit_gauge(&mut self, value: f64, labels: &LabelKey) {
        self.push(labels, SampleValue::Gauge(value));
    }

    fn visit_histogram(&mut self, sample: &HistogramSample, labels: &LabelKey) {
        self.push(labels, SampleValue::Histogram(sample.clone()));
    }

    fn visit_summary(&mut self, sample: &SummarySample, labels: &LabelKey) {
        self.push(labels, SampleValue::Summary(sample.clone()));
    }
}

impl Registry {
    /// Every family, ascending by name.
    pub fn snapshot(&self) -> Vec<FamilySnapshot> {
        let mut visitor = SnapshotVisitor::default();
        self.accept(&mut visitor);
        visitor.into_families()
    }
}

impl<M: Metric> Family<M> {
    pub fn snapshot(&self) -> FamilySnapshot {
        let mut visitor = SnapshotVisitor::default();
        self.accept(&mut visitor);
        visitor
            .into_families()
            .pop()
            .unwrap_or_else(|| FamilySnapshot {
                name: self.name().to_string(),
                help: self.descriptor().help.clone(),
                kind: M::KIND,
                instances: Vec::new(),
            })
    }
}
