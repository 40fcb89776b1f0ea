//! HTTP request handlers for the Payroll Engine API.
//!
//! This module contains the router and the handler functions for all API
//! endpoints. Every request is tagged with a correlation id that appears on
//! each log line it produces.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::request::{
    ApproveRequest, BulkGenerationRequest, ComputePayrollRequest, ForwardRequest,
    LeaveApplicationRequest, LeaveApproveRequest, LeaveCancelRequest, LeaveRejectRequest,
    MarkPaidRequest, RejectRequest, SubmitRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/compute", post(compute_handler))
        .route("/payroll/bulk", post(bulk_handler))
        .route("/payroll/:id", get(get_record_handler))
        .route("/payroll/:id/submit", post(submit_handler))
        .route("/payroll/:id/approve", post(approve_handler))
        .route("/payroll/:id/reject", post(reject_handler))
        .route("/payroll/:id/forward", post(forward_handler))
        .route("/payroll/:id/pay", post(pay_handler))
        .route("/leave", post(leave_submit_handler))
        .route("/leave/:id/approve", post(leave_approve_handler))
        .route("/leave/:id/reject", post(leave_reject_handler))
        .route("/leave/:id/cancel", post(leave_cancel_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn respond<T: Serialize>(correlation_id: Uuid, status: StatusCode, result: EngineResult<T>) -> Response {
    match result {
        Ok(body) => json_response(status, body),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Turns a JSON extraction failure into a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn parse_id(raw: &str) -> EngineResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| EngineError::validation("id", format!("'{}' is not a valid id", raw)))
}

/// Unwraps a JSON body or logs and builds the 400 response for it.
macro_rules! body_or_reject {
    ($correlation_id:expr, $payload:expr) => {
        match $payload {
            Ok(Json(body)) => body,
            Err(rejection) => return rejection_response($correlation_id, rejection),
        }
    };
}

/// Parses a path id or returns the 400 response for it.
macro_rules! id_or_reject {
    ($correlation_id:expr, $raw:expr) => {
        match parse_id(&$raw) {
            Ok(id) => id,
            Err(err) => return error_response($correlation_id, err),
        }
    };
}

/// Handler for POST /payroll/compute.
async fn compute_handler(
    State(state): State<AppState>,
    payload: Result<Json<ComputePayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = body_or_reject!(correlation_id, payload);
    info!(
        correlation_id = %correlation_id,
        officer_id = %request.officer_id,
        month = %request.month,
        "Processing payroll computation"
    );

    let result = request
        .month()
        .and_then(|month| state.payroll().compute_payroll(&request.officer_id, month));
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payroll/bulk.
///
/// Bulk generation fans out over a rayon pool, so it runs off the async
/// executor.
async fn bulk_handler(
    State(state): State<AppState>,
    payload: Result<Json<BulkGenerationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = body_or_reject!(correlation_id, payload);
    info!(
        correlation_id = %correlation_id,
        month = %request.month,
        "Processing bulk payslip generation"
    );

    let month = match request.month() {
        Ok(month) => month,
        Err(err) => return error_response(correlation_id, err),
    };
    let payroll = state.payroll().clone();
    let result = tokio::task::spawn_blocking(move || payroll.bulk_generate_payslips(month))
        .await
        .unwrap_or_else(|err| {
            Err(EngineError::Collaborator {
                collaborator: "bulk_worker".to_string(),
                message: err.to_string(),
            })
        });
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /payroll/{id}.
async fn get_record_handler(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    respond(correlation_id, StatusCode::OK, state.payroll().get_record(id))
}

/// Handler for POST /payroll/{id}/submit.
async fn submit_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    let request = body_or_reject!(correlation_id, payload);
    info!(correlation_id = %correlation_id, record_id = %id, "Submitting payroll record");

    let result = state.payroll().submit_for_review(id, &request.submitted_by);
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payroll/{id}/approve.
async fn approve_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    let request = body_or_reject!(correlation_id, payload);
    info!(
        correlation_id = %correlation_id,
        record_id = %id,
        approver_id = %request.approver_id,
        "Approving payroll record"
    );

    let result = state
        .payroll()
        .approve(id, &request.approver_id, request.comments);
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payroll/{id}/reject.
async fn reject_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<RejectRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    let request = body_or_reject!(correlation_id, payload);
    info!(
        correlation_id = %correlation_id,
        record_id = %id,
        approver_id = %request.approver_id,
        "Rejecting payroll record"
    );

    let result = state
        .payroll()
        .reject(id, &request.approver_id, &request.reason);
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payroll/{id}/forward.
async fn forward_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<ForwardRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    let request = body_or_reject!(correlation_id, payload);
    info!(correlation_id = %correlation_id, record_id = %id, "Forwarding payroll record");

    let result = state.payroll().forward(id, &request.forwarded_by);
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payroll/{id}/pay.
async fn pay_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<MarkPaidRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    let request = body_or_reject!(correlation_id, payload);
    info!(correlation_id = %correlation_id, record_id = %id, "Marking payroll record paid");

    let result = state
        .payroll()
        .mark_paid(id, &request.payment_mode, &request.payment_reference);
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /leave.
async fn leave_submit_handler(
    State(state): State<AppState>,
    payload: Result<Json<LeaveApplicationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = body_or_reject!(correlation_id, payload);
    info!(
        correlation_id = %correlation_id,
        officer_id = %request.officer_id,
        "Submitting leave application"
    );

    let result = state.leave().submit_leave(request.into());
    respond(correlation_id, StatusCode::CREATED, result)
}

/// Handler for POST /leave/{id}/approve.
async fn leave_approve_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<LeaveApproveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    let request = body_or_reject!(correlation_id, payload);
    info!(correlation_id = %correlation_id, leave_id = %id, "Approving leave application");

    let result = state
        .leave()
        .approve_leave(id, &request.reviewer_id, request.comments);
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /leave/{id}/reject.
async fn leave_reject_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<LeaveRejectRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    let request = body_or_reject!(correlation_id, payload);
    info!(correlation_id = %correlation_id, leave_id = %id, "Rejecting leave application");

    let result = state
        .leave()
        .reject_leave(id, &request.reviewer_id, &request.reason);
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /leave/{id}/cancel.
async fn leave_cancel_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<LeaveCancelRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = id_or_reject!(correlation_id, raw_id);
    let request = body_or_reject!(correlation_id, payload);
    info!(correlation_id = %correlation_id, leave_id = %id, "Cancelling leave application");

    let result = state.leave().cancel_leave(id, &request.officer_id);
    respond(correlation_id, StatusCode::OK, result)
}
