//! Prometheus text exposition format (version 0.0.4).
//!
//! ```text
//! # HELP <name> <help>
//! # TYPE <name> <kind>
//! <name>{<label>="<value>",...} <value>
//! ```
//!
//! Families are separated by a blank line. Families without instances are
//! skipped entirely.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{MetricsError, Result};
use crate::family::Descriptor;
use crate::labels::LabelKey;
use crate::metric::{HistogramSample, MetricKind, SummarySample};
use crate::registry::Registry;
use crate::visit::{Families, Instances, Visitor};

/// Content type served alongside [`render_text`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Shared flag to abort an export between families or instances.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(MetricsError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Render the whole registry.
pub fn render_text(registry: &Registry) -> Result<String> {
    render_text_with(registry, &CancelToken::new())
}

/// Render the whole registry, giving up with `Cancelled` once `cancel` fires.
pub fn render_text_with(registry: &Registry, cancel: &CancelToken) -> Result<String> {
    let mut out = String::new();
    registry.accept(&mut TextWriter::new(&mut out, cancel.clone()))?;
    Ok(out)
}

/// Render the whole registry as a response body.
pub fn render_bytes(registry: &Registry, cancel: &CancelToken) -> Result<Bytes> {
    render_text_with(registry, cancel).map(Bytes::from)
}

/// Visitor writing the text format into any `fmt::Write` sink.
///
/// Traversal is sequential: one family is open at a time.
pub struct TextWriter<'w, W: Write> {
    out: &'w mut W,
    cancel: CancelToken,
    open: Option<(String, MetricKind)>,
}

impl<'w, W: Write> TextWriter<'w, W> {
    pub fn new(out: &'w mut W, cancel: CancelToken) -> Self {
        Self {
            out,
            cancel,
            open: None,
        }
    }

    fn family_name(&self) -> &str {
        self.open.as_ref().map_or("", |(name, _)| name.as_str())
    }

    fn write_sample(
        &mut self,
        postfix: &str,
        labels: &LabelKey,
        extra: Option<(&str, &str)>,
        value: &str,
    ) -> Result<()> {
        let mut line = String::with_capacity(64);
        line.push_str(self.family_name());
        line.push_str(postfix);

        let mut pairs = labels.iter().chain(extra).peekable();
        if pairs.peek().is_some() {
            line.push('{');
            for (i, (name, v)) in pairs.enumerate() {
                if i > 0 {
                    line.push(',');
                }
                line.push_str(name);
                line.push_str("=\"");
                line.push_str(&escape_label(v));
                line.push('"');
            }
            line.push('}');
        }

        writeln!(self.out, "{} {}", line, value)?;
        Ok(())
    }

    fn write_family(&mut self, family: &Descriptor, instances: Instances<'_>) -> Result<()> {
        if !family.help.is_empty() {
            writeln!(self.out, "# HELP {} {}", family.name, escape_help(&family.help))?;
        }
        writeln!(self.out, "# TYPE {} {}", family.name, family.kind)?;

        for instance in instances.iter() {
            instance.accept(self)?;
            self.cancel.check()?;
        }

        self.out.write_char('\n')?;
        Ok(())
    }

    fn debug_kind(&self, expected: MetricKind) {
        debug_assert_eq!(self.open.as_ref().map(|(_, k)| *k), Some(expected));
    }
}

impl<W: Write> Visitor for TextWriter<'_, W> {
    type Output = Result<()>;

    fn visit_collection(&mut self, families: Families<'_>) -> Result<()> {
        for family in families.iter() {
            family.accept(self)?;
            self.cancel.check()?;
        }
        Ok(())
    }

    fn visit_family(&mut self, family: &Descriptor, instances: Instances<'_>) -> Result<()> {
        if instances.is_empty() {
            return Ok(());
        }

        debug_assert!(self.open.is_none(), "text writer families must not nest");
        self.open = Some((family.name.clone(), family.kind));
        let written = self.write_family(family, instances);
        // reset even when the family failed part way
        self.open = None;
        written
    }

    fn visit_counter(&mut self, value: f64, labels: &LabelKey) -> Result<()> {
        self.debug_kind(MetricKind::Counter);
        self.write_sample("", labels, None, &format_value(value))
    }

    fn visit_gauge(&mut self, value: f64, labels: &LabelKey) -> Result<()> {
        self.debug_kind(MetricKind::Gauge);
        self.write_sample("", labels, None, &format_value(value))
    }

    fn visit_histogram(&mut self, sample: &HistogramSample, labels: &LabelKey) -> Result<()> {
        self.debug_kind(MetricKind::Histogram);
        self.write_sample("_sum", labels, None, &format_value(sample.sum))?;
        self.write_sample("_count", labels, None, &sample.count.to_string())?;

        for bucket in &sample.buckets {
            let le = format_value(bucket.upper_bound);
            let count = bucket.cumulative_count.to_string();
            self.write_sample("_bucket", labels, Some(("le", &le)), &count)?;
        }
        Ok(())
    }

    fn visit_summary(&mut self, sample: &SummarySample, labels: &LabelKey) -> Result<()> {
        self.debug_kind(MetricKind::Summary);
        self.write_sample("_sum", labels, None, &format_value(sample.sum))?;
        self.write_sample("_count", labels, None, &sample.count.to_string())?;

        for q in &sample.quantiles {
            let quantile = format_value(q.quantile);
            self.write_sample("", labels, Some(("quantile", &quantile)), &format_value(q.value))?;
        }
        Ok(())
    }
}

/// Locale-independent float rendering with the format's spellings of the
/// special values.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n").replace('"', "\\\"")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}
