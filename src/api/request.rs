//! Request types for the Payroll Engine API.
//!
//! Months travel as `YYYY-MM` strings and are parsed into
//! [`PayrollMonth`] by the handlers so that an invalid month is reported as
//! a validation error rather than a deserialization failure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{LeaveType, PayrollMonth};
use crate::workflow::LeaveRequest;

/// Request body for `POST /payroll/compute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputePayrollRequest {
    /// The officer to compute.
    pub officer_id: String,
    /// The month, as `YYYY-MM`.
    pub month: String,
}

impl ComputePayrollRequest {
    /// The parsed month.
    pub fn month(&self) -> EngineResult<PayrollMonth> {
        self.month.parse()
    }
}

/// Request body for `POST /payroll/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkGenerationRequest {
    /// The month, as `YYYY-MM`.
    pub month: String,
}

impl BulkGenerationRequest {
    /// The parsed month.
    pub fn month(&self) -> EngineResult<PayrollMonth> {
        self.month.parse()
    }
}

/// Request body for `POST /payroll/{id}/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Who submits the record.
    pub submitted_by: String,
}

/// Request body for `POST /payroll/{id}/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    /// The approving reviewer.
    pub approver_id: String,
    /// Optional reviewer comments.
    #[serde(default)]
    pub comments: Option<String>,
}

/// Request body for `POST /payroll/{id}/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    /// The rejecting reviewer.
    pub approver_id: String,
    /// Why the record is rejected.
    pub reason: String,
}

/// Request body for `POST /payroll/{id}/forward`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardRequest {
    /// Who forwards the record to disbursement.
    pub forwarded_by: String,
}

/// Request body for `POST /payroll/{id}/pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPaidRequest {
    /// Payment channel.
    pub payment_mode: String,
    /// Bank or cheque reference.
    pub payment_reference: String,
}

/// Request body for `POST /leave`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApplicationRequest {
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

impl From<LeaveApplicationRequest> for LeaveRequest {
    fn from(req: LeaveApplicationRequest) -> Self {
        LeaveRequest {
            officer_id: req.officer_id,
            start_date: req.start_date,
            end_date: req.end_date,
            leave_type: req.leave_type,
            reason: req.reason,
        }
    }
}

/// Request body for `POST /leave/{id}/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApproveRequest {
    /// The approving reviewer.
    pub reviewer_id: String,
    /// Optional comments.
    #[serde(default)]
    pub comments: Option<String>,
}

/// Request body for `POST /leave/{id}/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRejectRequest {
    /// The rejecting reviewer.
    pub reviewer_id: String,
    /// Why the application is rejected.
    pub reason: String,
}

/// Request body for `POST /leave/{id}/cancel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveCancelRequest {
    /// The officer cancelling their own application.
    pub officer_id: String,
}
