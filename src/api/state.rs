//! Application state for the Payroll Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use crate::service::{LeaveService, PayrollService};

/// Shared application state.
///
/// Both services are cheap to clone; their collaborators sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    payroll: PayrollService,
    leave: LeaveService,
}

impl AppState {
    /// Creates a new application state from the two services.
    pub fn new(payroll: PayrollService, leave: LeaveService) -> Self {
        Self { payroll, leave }
    }

    /// The payroll service.
    pub fn payroll(&self) -> &PayrollService {
        &self.payroll
    }

    /// The leave service.
    pub fn leave(&self) -> &LeaveService {
        &self.leave
    }
}
