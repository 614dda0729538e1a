//! Metric/label naming rules and the label key used to index instances.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{MetricsError, Result};
use crate::metric::MetricKind;

/// `^[a-zA-Z_:][a-zA-Z0-9_:]*$`
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

pub fn validate_metric_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(MetricsError::InvalidMetricName(name.to_string()))
    }
}

/// Validate a declared label-name list and freeze it.
///
/// `forbidden` holds the label reserved by the metric kind (`le`, `quantile`).
pub fn validate_label_names(
    kind: MetricKind,
    names: &[String],
    forbidden: Option<&str>,
) -> Result<Arc<[String]>> {
    for name in names {
        if !is_valid_name(name) {
            return Err(MetricsError::InvalidLabelName(name.clone()));
        }
        if name.starts_with("__") {
            return Err(MetricsError::ReservedLabelName(name.clone()));
        }
        if forbidden == Some(name.as_str()) {
            return Err(MetricsError::ForbiddenLabel {
                kind,
                label: name.clone(),
            });
        }
    }
    Ok(names.iter().cloned().collect())
}

/// Label values bound to the family's label names.
///
/// Identity (equality, ordering, hashing) is defined by the values alone;
/// the names are shared with the owning family and only used for output.
#[derive(Clone)]
pub struct LabelKey {
    names: Arc<[String]>,
    values: Box<[String]>,
}

impl LabelKey {
    pub fn new<S: AsRef<str>>(names: Arc<[String]>, values: &[S]) -> Result<Self> {
        if values.len() != names.len() {
            return Err(MetricsError::LabelCountMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            names,
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
        })
    }

    /// Key of the unlabeled instance.
    pub fn empty() -> Self {
        Self {
            names: Arc::from(Vec::<String>::new()),
            values: Box::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.names
            .iter()
            .zip(self.values.iter())
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl PartialEq for LabelKey {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for LabelKey {}

impl PartialOrd for LabelKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LabelKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.values.cmp(&other.values)
    }
}

impl Hash for LabelKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl fmt::Debug for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
