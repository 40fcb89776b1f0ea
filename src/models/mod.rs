//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod leave;
mod month;
mod officer;
mod payroll_record;
mod payslip;
mod salary;

pub use attendance::{AttendanceStatus, DailyAttendanceEntry, LeaveType, MonthlyAttendanceTotals};
pub use leave::{LeaveApplication, LeaveStatus};
pub use month::PayrollMonth;
pub use officer::{OfficerProfile, StatutoryProfile};
pub use payroll_record::{
    AuditStep, AuditWarning, PayrollRecord, PayrollStatus, PayrollTotals, WorkflowEvent,
};
pub use payslip::{DeliveryMetadata, DeliveryStatus, Payslip};
pub use salary::{
    CalculationType, ComponentTemplate, ComponentType, Deduction, DeductionType, PercentageBase,
    SalaryComponent, SalaryStructure,
};
