//! Payroll Engine for institution staff.
//!
//! This crate computes monthly payroll from daily attendance and salary
//! structures, applies statutory deductions (provident fund, state
//! insurance, professional tax and income tax withholding), and moves
//! payroll records and leave applications through their approval
//! workflows. Every computed figure carries an audit trail.
//!
//! The layers are:
//!
//! - [`calculation`]: pure functions that produce amounts and audit steps
//! - [`workflow`]: pure state transitions for payroll records and leave
//! - [`service`]: orchestration over pluggable collaborators and stores
//! - [`api`]: the axum HTTP surface

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod workflow;
