use sea_orm::error::DbErr;
use serde::Serialize;

use crate::ml::Capability;

/// Unified error type for the HelioSentinel core.
///
/// Validation errors name the offending field(s); capability errors are only
/// surfaced once both the learned and fallback paths are unusable. No variant
/// is fatal beyond the request that produced it.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    SchemaError(Vec<String>),

    #[error("Field {field} is not numeric: {value}")]
    TypeCoercion { field: String, value: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Capability {0} is unavailable")]
    CapabilityUnavailable(Capability),

    #[error("Environmental history is empty")]
    EmptyHistory,

    #[error("Optimizer returned no solutions")]
    NoSolution,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::InternalError(format!("Serialization failed: {err}"))
    }
}

impl ServiceError {
    /// True for errors the caller can fix by correcting the submitted input.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::SchemaError(_)
                | Self::TypeCoercion { .. }
                | Self::InvalidTimestamp(_)
                | Self::EmptyHistory
                | Self::InvalidTransition { .. }
                | Self::NotFound(_)
                | Self::ValidationError(_)
        )
    }
}
