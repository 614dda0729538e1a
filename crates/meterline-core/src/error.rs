//! Shared error type across meterline crates.

use thiserror::Error;

use crate::metric::MetricKind;

/// Stable error classification (safe to match on from callers and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric or label name does not match the naming rules.
    InvalidName,
    /// Label set does not fit the family (arity, reserved or forbidden names).
    InvalidLabels,
    /// Name already registered with another metric kind.
    TypeConflict,
    /// Value rejected by the metric (e.g. negative counter increment).
    InvalidValue,
    /// Construction options rejected.
    InvalidOptions,
    /// Export aborted by the caller.
    Cancelled,
    /// Configuration could not be loaded.
    Config,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::InvalidLabels => "INVALID_LABELS",
            ErrorCode::TypeConflict => "TYPE_CONFLICT",
            ErrorCode::InvalidValue => "INVALID_VALUE",
            ErrorCode::InvalidOptions => "INVALID_OPTIONS",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and http.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric name '{0}' must match ^[a-zA-Z_:][a-zA-Z0-9_:]*$")]
    InvalidMetricName(String),
    #[error("label name '{0}' must match ^[a-zA-Z_:][a-zA-Z0-9_:]*$")]
    InvalidLabelName(String),
    #[error("label name '{0}' is reserved: labels starting with '__' are internal")]
    ReservedLabelName(String),
    #[error("{kind} cannot have a label named '{label}'")]
    ForbiddenLabel { kind: MetricKind, label: String },
    #[error("expected {expected} label values, got {actual}")]
    LabelCountMismatch { expected: usize, actual: usize },
    #[error("metric {name} is already registered as a {existing}, not a {requested}")]
    TypeConflict {
        name: String,
        existing: MetricKind,
        requested: MetricKind,
    },
    #[error("counter increment must be a non-negative number (got {0})")]
    NegativeIncrement(f64),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("export cancelled")]
    Cancelled,
    #[error("write failed")]
    Format(#[from] std::fmt::Error),
    #[error("config: {0}")]
    Config(String),
}

impl MetricsError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricsError::InvalidMetricName(_) | MetricsError::InvalidLabelName(_) => {
                ErrorCode::InvalidName
            }
            MetricsError::ReservedLabelName(_)
            | MetricsError::ForbiddenLabel { .. }
            | MetricsError::LabelCountMismatch { .. } => ErrorCode::InvalidLabels,
            MetricsError::TypeConflict { .. } => ErrorCode::TypeConflict,
            MetricsError::NegativeIncrement(_) => ErrorCode::InvalidValue,
            MetricsError::InvalidOptions(_) => ErrorCode::InvalidOptions,
            MetricsError::Cancelled => ErrorCode::Cancelled,
            MetricsError::Config(_) => ErrorCode::Config,
            MetricsError::Format(_) => ErrorCode::Internal,
        }
    }
}
