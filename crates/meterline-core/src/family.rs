//! Metric family: every label combination of one named metric.
//!
//! Instances live in an immutable map behind an `ArcSwap`. Inserting clones
//! the map, adds the entry and publishes it with compare-and-swap, retrying
//! if another writer published first. Readers load one snapshot and never
//! see a half-built map.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::clock::Clock;
use crate::error::Result;
use crate::labels::{validate_label_names, validate_metric_name, LabelKey};
use crate::metric::histogram::with_infinity;
use crate::metric::{Counter, Gauge, Histogram, Metric, MetricKind, Summary, SummaryConfig};
use crate::options::{HistogramOptions, MetricOptions, SummaryOptions};
use crate::visit::{Instance, Instances, Visitor};

pub type CounterFamily = Family<Counter>;
pub type GaugeFamily = Family<Gauge>;
pub type HistogramFamily = Family<Histogram>;
pub type SummaryFamily = Family<Summary>;

type InstanceMap<M> = BTreeMap<LabelKey, Arc<M>>;

/// Immutable description of a family.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Arc<[String]>,
    pub suppress_initial_value: bool,
}

pub struct Family<M: Metric> {
    desc: Descriptor,
    config: M::Config,
    instances: ArcSwap<InstanceMap<M>>,
}

impl<M: Metric> Family<M> {
    fn build(name: &str, options: MetricOptions, config: M::Config) -> Result<Self> {
        validate_metric_name(name)?;
        let label_names =
            validate_label_names(M::KIND, &options.label_names, M::KIND.reserved_label())?;

        Ok(Self {
            desc: Descriptor {
                name: name.to_string(),
                help: options.help,
                kind: M::KIND,
                label_names,
                suppress_initial_value: options.suppress_initial_value,
            },
            config,
            instances: ArcSwap::from_pointee(BTreeMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.desc
    }

    pub fn label_names(&self) -> &[String] {
        &self.desc.label_names
    }

    /// Instance bound to `values`, created on first use.
    ///
    /// The number of values must match the declared label names.
    pub fn with_labels<S: AsRef<str>>(&self, values: &[S]) -> Result<Arc<M>> {
        let key = LabelKey::new(Arc::clone(&self.desc.label_names), values)?;
        Ok(self.get_or_insert(key))
    }

    /// Instance with no label values.
    pub fn unlabeled(&self) -> Result<Arc<M>> {
        self.with_labels::<&str>(&[])
    }

    /// Existing instance for `values`, without creating one.
    pub fn get<S: AsRef<str>>(&self, values: &[S]) -> Option<Arc<M>> {
        let key = LabelKey::new(Arc::clone(&self.desc.label_names), values).ok()?;
        self.instances.load().get(&key).cloned()
    }

    /// Number of label combinations created so far.
    pub fn len(&self) -> usize {
        self.instances.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.load().is_empty()
    }

    fn get_or_insert(&self, key: LabelKey) -> Arc<M> {
        let mut current = self.instances.load_full();
        if let Some(existing) = current.get(&key) {
            return Arc::clone(existing);
        }

        let metric = Arc::new(M::create(&self.config));
        loop {
            if let Some(existing) = current.get(&key) {
                return Arc::clone(existing);
            }

            let mut next = (*current).clone();
            next.insert(key.clone(), Arc::clone(&metric));

            let prev = self.instances.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*prev, &current) {
                return metric;
            }
            tracing::trace!(family = %self.desc.name, "instance insert raced, retrying");
            current = Guard::into_inner(prev);
        }
    }

    /// Feed this family and its current instances to `visitor`.
    ///
    /// An unlabeled family gets its zero-valued instance created first unless
    /// initial values are suppressed.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        if self.desc.label_names.is_empty() && !self.desc.suppress_initial_value {
            self.get_or_insert(LabelKey::empty());
        }

        let snapshot = self.instances.load_full();
        let instances = Instances::new(
            snapshot
                .iter()
                .map(|(labels, metric)| Instance::new(labels, metric.metric_ref()))
                .collect(),
        );
        visitor.visit_family(&self.desc, instances)
    }
}

impl<M: Metric> std::fmt::Debug for Family<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Family")
            .field("desc", &self.desc)
            .field("instances", &self.len())
            .finish()
    }
}

impl Family<Counter> {
    pub fn counter(name: &str, options: MetricOptions) -> Result<Self> {
        Self::build(name, options, ())
    }

    /// Increment the unlabeled counter by 1.
    pub fn inc(&self) -> Result<()> {
        self.unlabeled()?.inc();
        Ok(())
    }

    pub fn inc_by(&self, v: f64) -> Result<()> {
        self.unlabeled()?.inc_by(v)
    }
}

impl Family<Gauge> {
    pub fn gauge(name: &str, options: MetricOptions) -> Result<Self> {
        Self::build(name, options, ())
    }

    pub fn inc(&self) -> Result<()> {
        self.unlabeled()?.inc();
        Ok(())
    }

    pub fn dec(&self) -> Result<()> {
        self.unlabeled()?.dec();
        Ok(())
    }

    pub fn inc_by(&self, v: f64) -> Result<()> {
        self.unlabeled()?.inc_by(v);
        Ok(())
    }

    pub fn dec_by(&self, v: f64) -> Result<()> {
        self.unlabeled()?.dec_by(v);
        Ok(())
    }

    pub fn set(&self, v: f64) -> Result<()> {
        self.unlabeled()?.set(v);
        Ok(())
    }
}

impl Family<Histogram> {
    pub fn histogram(name: &str, options: HistogramOptions) -> Result<Self> {
        let bounds = with_infinity(&options.buckets);
        Self::build(name, options.metric, bounds)
    }

    pub fn observe(&self, value: f64) -> Result<()> {
        self.unlabeled()?.observe(value);
        Ok(())
    }
}

impl Family<Summary> {
    pub fn summary(name: &str, options: SummaryOptions, clock: Arc<dyn Clock>) -> Result<Self> {
        options.validate()?;
        let config = SummaryConfig::new(&options, clock);
        Self::build(name, options.metric, config)
    }

    pub fn observe(&self, value: f64) -> Result<()> {
        self.unlabeled()?.observe(value);
        Ok(())
    }
}
