//! Approval workflows for payroll records and leave applications.
//!
//! Both state machines are pure functions over the current version of an
//! entity. The service layer persists the result with a compare-and-set on
//! the expected status and then publishes a [`WorkflowNotification`].

mod leave_approval;
mod payroll_approval;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

pub use leave_approval::{
    LeaveAction, LeaveRequest, apply_leave_transition, new_leave_application,
};
pub use payroll_approval::{PayrollAction, apply_payroll_transition, validate_payroll_action};

/// Minimum length of a rejection reason, counted in characters after
/// trimming.
pub const MIN_REASON_LENGTH: usize = 20;

/// Validates a rejection reason and returns it trimmed.
///
/// # Examples
///
/// ```
/// use payroll_engine::workflow::validate_reason;
///
/// assert!(validate_reason("too short").is_err());
/// assert!(validate_reason("  Overtime hours not countersigned  ").is_ok());
/// ```
pub fn validate_reason(reason: &str) -> EngineResult<String> {
    let trimmed = reason.trim();
    if trimmed.chars().count() < MIN_REASON_LENGTH {
        return Err(EngineError::validation(
            "reason",
            format!(
                "rejection reason must be at least {} characters",
                MIN_REASON_LENGTH
            ),
        ));
    }
    Ok(trimmed.to_string())
}

/// Which kind of entity a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSubject {
    /// A payroll record.
    Payroll,
    /// A leave application.
    Leave,
}

/// Published once for every accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowNotification {
    /// Kind of entity.
    pub subject: NotificationSubject,
    /// Entity id.
    pub entity_id: Uuid,
    /// The officer the entity belongs to.
    pub officer_id: String,
    /// Status before the transition.
    pub from: String,
    /// Status after the transition.
    pub to: String,
    /// Who performed the transition.
    pub actor: String,
    /// Recipients, filled in from the recipient resolver before sending.
    #[serde(default)]
    pub recipients: Vec<String>,
}
