//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during payroll computation and
//! the approval workflows.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Payroll Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "payroll_record".to_string(),
///     id: "rec_001".to_string(),
/// };
/// assert_eq!(error.to_string(), "payroll_record not found: rec_001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Input was malformed or incomplete.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A transition was attempted against a stale or incorrect status.
    #[error("{entity} '{id}' is {actual}, expected {expected}; this record was already acted upon")]
    StateConflict {
        /// The kind of record (e.g. "payroll_record").
        entity: String,
        /// The record identifier.
        id: String,
        /// The status the transition required.
        expected: String,
        /// The status actually stored.
        actual: String,
    },

    /// One or more working days had no attendance entry.
    #[error("Incomplete attendance for officer '{officer_id}' in {month}: {} missing date(s)", .missing_dates.len())]
    IncompleteAttendance {
        /// The officer whose attendance is incomplete.
        officer_id: String,
        /// The month being aggregated, formatted `YYYY-MM`.
        month: String,
        /// Working dates with no entry, sorted ascending.
        missing_dates: Vec<NaiveDate>,
    },

    /// An officer, record or application was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: String,
        /// The identifier that was not found.
        id: String,
    },

    /// The actor is not allowed to perform the action.
    #[error("'{actor}' is not permitted to {action}")]
    PermissionDenied {
        /// The actor who attempted the action.
        actor: String,
        /// The attempted action.
        action: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An external collaborator (renderer, store, ledger) failed.
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        /// The collaborator that failed.
        collaborator: String,
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
