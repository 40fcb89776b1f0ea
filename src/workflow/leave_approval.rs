//! Leave application state machine.
//!
//! `pending -> approved | rejected | cancelled`. All three outcomes are
//! terminal; a cancelled application is resubmitted as a new one.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::validate_reason;
use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveApplication, LeaveStatus, LeaveType};

/// A new leave application as submitted by an officer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    /// The applying officer.
    pub officer_id: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// Why leave is requested.
    pub reason: String,
}

/// A requested leave transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveAction {
    /// `pending -> approved`.
    Approve {
        /// The approving reviewer.
        reviewer_id: String,
        /// Optional comments.
        comments: Option<String>,
    },
    /// `pending -> rejected`.
    Reject {
        /// The rejecting reviewer.
        reviewer_id: String,
        /// At least 20 characters once trimmed.
        reason: String,
    },
    /// `pending -> cancelled`, by the applicant only.
    Cancel {
        /// The officer asking to cancel.
        officer_id: String,
    },
}

impl LeaveAction {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            LeaveAction::Approve { .. } => "approve_leave",
            LeaveAction::Reject { .. } => "reject_leave",
            LeaveAction::Cancel { .. } => "cancel_leave",
        }
    }

    /// The status the application moves to.
    pub fn target_status(&self) -> LeaveStatus {
        match self {
            LeaveAction::Approve { .. } => LeaveStatus::Approved,
            LeaveAction::Reject { .. } => LeaveStatus::Rejected,
            LeaveAction::Cancel { .. } => LeaveStatus::Cancelled,
        }
    }

    /// The reviewer whose authority must be checked, if any.
    pub fn reviewer(&self) -> Option<&str> {
        match self {
            LeaveAction::Approve { reviewer_id, .. } | LeaveAction::Reject { reviewer_id, .. } => {
                Some(reviewer_id)
            }
            LeaveAction::Cancel { .. } => None,
        }
    }
}

/// Builds a pending application from a request.
///
/// # Returns
///
/// A `Validation` error if `end_date` precedes `start_date` or the reason is
/// blank.
pub fn new_leave_application(
    request: LeaveRequest,
    now: DateTime<Utc>,
) -> EngineResult<LeaveApplication> {
    if request.officer_id.trim().is_empty() {
        return Err(EngineError::validation("officer_id", "officer id is required"));
    }
    if request.end_date < request.start_date {
        return Err(EngineError::validation(
            "end_date",
            format!(
                "end date {} is before start date {}",
                request.end_date, request.start_date
            ),
        ));
    }
    if request.reason.trim().is_empty() {
        return Err(EngineError::validation("reason", "a reason is required"));
    }

    let total_days = (request.end_date - request.start_date).num_days() as u32 + 1;

    Ok(LeaveApplication {
        id: Uuid::new_v4(),
        officer_id: request.officer_id,
        start_date: request.start_date,
        end_date: request.end_date,
        leave_type: request.leave_type,
        reason: request.reason.trim().to_string(),
        total_days,
        status: LeaveStatus::Pending,
        applied_at: now,
        reviewed_by: None,
        reviewed_at: None,
        rejection_reason: None,
        admin_comments: None,
        cancelled_at: None,
    })
}

/// Applies a transition to an application, returning the next version.
///
/// # Returns
///
/// - `Validation` for a rejection reason shorter than 20 characters
/// - `PermissionDenied` when someone other than the applicant cancels
/// - `StateConflict` when the application is no longer pending
pub fn apply_leave_transition(
    application: &LeaveApplication,
    action: &LeaveAction,
    now: DateTime<Utc>,
) -> EngineResult<LeaveApplication> {
    match action {
        LeaveAction::Reject { reason, .. } => {
            validate_reason(reason)?;
        }
        LeaveAction::Cancel { officer_id } if *officer_id != application.officer_id => {
            return Err(EngineError::PermissionDenied {
                actor: officer_id.clone(),
                action: "cancel another officer's leave".to_string(),
            });
        }
        _ => {}
    }

    if application.status != LeaveStatus::Pending {
        return Err(EngineError::StateConflict {
            entity: "leave_application".to_string(),
            id: application.id.to_string(),
            expected: LeaveStatus::Pending.to_string(),
            actual: application.status.to_string(),
        });
    }

    let mut next = application.clone();
    match action {
        LeaveAction::Approve {
            reviewer_id,
            comments,
        } => {
            next.reviewed_by = Some(reviewer_id.clone());
            next.reviewed_at = Some(now);
            next.admin_comments = comments.clone();
        }
        LeaveAction::Reject {
            reviewer_id,
            reason,
        } => {
            next.reviewed_by = Some(reviewer_id.clone());
            next.reviewed_at = Some(now);
            next.rejection_reason = Some(reason.trim().to_string());
        }
        LeaveAction::Cancel { .. } => {
            next.cancelled_at = Some(now);
        }
    }
    next.status = action.target_status();

    Ok(next)
}
