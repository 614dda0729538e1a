//! Process-wide map from metric name to family.
//!
//! Same discipline as the per-family instance map: an immutable sorted map
//! behind an `ArcSwap`, replaced via compare-and-swap on add and remove.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use once_cell::sync::Lazy;

use crate::clock::{Clock, SystemClock};
use crate::error::{MetricsError, Result};
use crate::family::{
    CounterFamily, Descriptor, Family, GaugeFamily, HistogramFamily, SummaryFamily,
};
use crate::metric::MetricKind;
use crate::options::{HistogramOptions, MetricOptions, SummaryOptions};
use crate::visit::{Families, Visitor};

/// A family of any kind.
#[derive(Clone)]
pub enum AnyFamily {
    Counter(Arc<CounterFamily>),
    Gauge(Arc<GaugeFamily>),
    Histogram(Arc<HistogramFamily>),
    Summary(Arc<SummaryFamily>),
}

impl AnyFamily {
    pub fn kind(&self) -> MetricKind {
        self.descriptor().kind
    }

    pub fn name(&self) -> &str {
        &self.descriptor().name
    }

    pub fn descriptor(&self) -> &Descriptor {
        match self {
            AnyFamily::Counter(f) => f.descriptor(),
            AnyFamily::Gauge(f) => f.descriptor(),
            AnyFamily::Histogram(f) => f.descriptor(),
            AnyFamily::Summary(f) => f.descriptor(),
        }
    }

    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            AnyFamily::Counter(f) => f.accept(visitor),
            AnyFamily::Gauge(f) => f.accept(visitor),
            AnyFamily::Histogram(f) => f.accept(visitor),
            AnyFamily::Summary(f) => f.accept(visitor),
        }
    }

    pub fn as_counter(&self) -> Option<Arc<CounterFamily>> {
        match self {
            AnyFamily::Counter(f) => Some(Arc::clone(f)),
            _ => None,
        }
    }

    pub fn as_gauge(&self) -> Option<Arc<GaugeFamily>> {
        match self {
            AnyFamily::Gauge(f) => Some(Arc::clone(f)),
            _ => None,
        }
    }

    pub fn as_histogram(&self) -> Option<Arc<HistogramFamily>> {
        match self {
            AnyFamily::Histogram(f) => Some(Arc::clone(f)),
            _ => None,
        }
    }

    pub fn as_summary(&self) -> Option<Arc<SummaryFamily>> {
        match self {
            AnyFamily::Summary(f) => Some(Arc::clone(f)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AnyFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AnyFamily").field(self.descriptor()).finish()
    }
}

type FamilyMap = BTreeMap<String, AnyFamily>;

pub struct Registry {
    families: ArcSwap<FamilyMap>,
    clock: Arc<dyn Clock>,
}

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// The process-wide registry, built on first use and never torn down.
pub fn global() -> Arc<Registry> {
    Arc::clone(&GLOBAL)
}

impl Registry {
    /// Private registry on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Private registry whose summaries age against `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            families: ArcSwap::from_pointee(BTreeMap::new()),
            clock,
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Family registered under `name`, built by `factory(name, arg)` if absent.
    ///
    /// The factory only runs when the name is missing from the snapshot; if a
    /// concurrent caller registers the name first, its family wins and the
    /// freshly built one is dropped.
    pub fn get_or_add<A, F>(&self, name: &str, factory: F, arg: A) -> Result<AnyFamily>
    where
        F: FnOnce(&str, A) -> Result<AnyFamily>,
    {
        let mut current = self.families.load_full();
        if let Some(existing) = current.get(name) {
            return Ok(existing.clone());
        }

        let family = factory(name, arg)?;
        loop {
            if let Some(existing) = current.get(name) {
                return Ok(existing.clone());
            }

            let mut next = (*current).clone();
            next.insert(name.to_string(), family.clone());

            let prev = self.families.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*prev, &current) {
                tracing::debug!(metric = %name, kind = %family.kind(), "metric family registered");
                return Ok(family);
            }
            tracing::trace!(metric = %name, "family insert raced, retrying");
            current = Guard::into_inner(prev);
        }
    }

    pub fn get(&self, name: &str) -> Option<AnyFamily> {
        self.families.load().get(name).cloned()
    }

    /// Drop the family and all of its instances. Returns false if absent.
    pub fn remove(&self, name: &str) -> bool {
        let mut current = self.families.load_full();
        loop {
            if !current.contains_key(name) {
                return false;
            }

            let mut next = (*current).clone();
            next.remove(name);

            let prev = self.families.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*prev, &current) {
                tracing::debug!(metric = %name, "metric family removed");
                return true;
            }
            current = Guard::into_inner(prev);
        }
    }

    pub fn len(&self) -> usize {
        self.families.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.load().is_empty()
    }

    /// Hand the current family collection to `visitor`.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        let snapshot = self.families.load_full();
        visitor.visit_collection(Families::new(&snapshot))
    }

    pub fn counter(&self, name: &str, options: MetricOptions) -> Result<Arc<CounterFamily>> {
        let family = self.get_or_add(
            name,
            |name, options| Ok(AnyFamily::Counter(Arc::new(Family::counter(name, options)?))),
            options,
        )?;
        expect_kind(name, &family, MetricKind::Counter, AnyFamily::as_counter)
    }

    pub fn gauge(&self, name: &str, options: MetricOptions) -> Result<Arc<GaugeFamily>> {
        let family = self.get_or_add(
            name,
            |name, options| Ok(AnyFamily::Gauge(Arc::new(Family::gauge(name, options)?))),
            options,
        )?;
        expect_kind(name, &family, MetricKind::Gauge, AnyFamily::as_gauge)
    }

    pub fn histogram(&self, name: &str, options: HistogramOptions) -> Result<Arc<HistogramFamily>> {
        let family = self.get_or_add(
            name,
            |name, options| {
                Ok(AnyFamily::Histogram(Arc::new(Family::histogram(name, options)?)))
            },
            options,
        )?;
        expect_kind(name, &family, MetricKind::Histogram, AnyFamily::as_histogram)
    }

    pub fn summary(&self, name: &str, options: SummaryOptions) -> Result<Arc<SummaryFamily>> {
        let clock = self.clock();
        let family = self.get_or_add(
            name,
            |name, options| {
                Ok(AnyFamily::Summary(Arc::new(Family::summary(name, options, clock)?)))
            },
            options,
        )?;
        expect_kind(name, &family, MetricKind::Summary, AnyFamily::as_summary)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn expect_kind<T>(
    name: &str,
    family: &AnyFamily,
    requested: MetricKind,
    cast: impl FnOnce(&AnyFamily) -> Option<T>,
) -> Result<T> {
    cast(family).ok_or_else(|| {
        let existing = family.kind();
        tracing::warn!(metric = %name, %existing, %requested, "metric kind conflict");
        MetricsError::TypeConflict {
            name: name.to_string(),
            existing,
            requested,
        }
    })
}
