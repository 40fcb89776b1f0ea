//! HTTP API module for the Payroll Engine.
//!
//! This module provides the REST endpoints for computing payroll, moving
//! records and leave applications through approval, and bulk payslip
//! generation.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ApproveRequest, BulkGenerationRequest, ComputePayrollRequest, ForwardRequest,
    LeaveApplicationRequest, LeaveApproveRequest, LeaveCancelRequest, LeaveRejectRequest,
    MarkPaidRequest, RejectRequest, SubmitRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
