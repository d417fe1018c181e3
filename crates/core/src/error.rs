//! Unified error types for the session pipeline.
//!
//! Error codes:
//! - SCHEMA_001-003: Malformed or missing input fields
//! - EVAL_001-002: Prediction parsing and score aggregation errors

use thiserror::Error;

use crate::events::LabelKind;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Schema error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// SCHEMA_001: Malformed row or wrong field type
    Malformed,
    /// SCHEMA_002: Required field is missing or empty
    MissingField,
    /// SCHEMA_003: Unknown event kind
    UnknownEventKind,
}

impl SchemaErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed => "SCHEMA_001",
            Self::MissingField => "SCHEMA_002",
            Self::UnknownEventKind => "SCHEMA_003",
        }
    }
}

/// Evaluation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorCode {
    /// EVAL_001: Prediction line cannot be parsed
    MalformedPrediction,
    /// EVAL_002: Recall denominator is zero
    ZeroDenominator,
}

impl EvalErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedPrediction => "EVAL_001",
            Self::ZeroDenominator => "EVAL_002",
        }
    }
}

/// Unified error type for the session pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid event kind: {0}")]
    InvalidEventKind(String),

    /// Prediction file line that does not match `{session}_{kind},{items}`.
    #[error("malformed prediction on line {line}: {message}")]
    MalformedPrediction { line: usize, message: String },

    /// No relevant events for a kind, so recall is undefined.
    #[error("recall denominator is zero for event type {0}")]
    ZeroDenominator(LabelKind),

    #[error("invalid split: {0}")]
    InvalidSplit(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn malformed_prediction(line: usize, msg: impl Into<String>) -> Self {
        Self::MalformedPrediction {
            line,
            message: msg.into(),
        }
    }

    pub fn invalid_split(msg: impl Into<String>) -> Self {
        Self::InvalidSplit(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether this error belongs to the schema family (bad input rows).
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::Schema(_) | Self::MissingField(_) | Self::InvalidEventKind(_)
        )
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Schema(_) => Some(SchemaErrorCode::Malformed.code()),
            Self::MissingField(_) => Some(SchemaErrorCode::MissingField.code()),
            Self::InvalidEventKind(_) => Some(SchemaErrorCode::UnknownEventKind.code()),
            Self::MalformedPrediction { .. } => Some(EvalErrorCode::MalformedPrediction.code()),
            Self::ZeroDenominator(_) => Some(EvalErrorCode::ZeroDenominator.code()),
            _ => None,
        }
    }
}
