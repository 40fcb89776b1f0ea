//! Payroll and leave services.
//!
//! Services own the side effects the calculators and workflows avoid:
//! reading collaborators, persisting through atomic compare-and-set,
//! logging and publishing notifications.

mod collaborators;
mod leave_service;
mod memory;
mod notifier;
mod payroll_service;
mod ports;

pub use collaborators::{
    AllowListAuthority, InMemoryAttendance, InMemoryLoanLedger, InMemoryOfficerMaster,
    MonthCalendar, RecordingSink, StaticRecipients, TextPayslipRenderer,
};
pub use leave_service::LeaveService;
pub use memory::{InMemoryLeaveStore, InMemoryPayrollStore, InMemoryPayslipStore};
pub use notifier::Notifier;
pub use payroll_service::{BulkGenerationSummary, PayrollCollaborators, PayrollService};
pub use ports::{
    ApprovalAuthority, AttendanceSource, LeaveStore, LoanLedger, NotificationSink, OfficerMaster,
    PayrollStore, PayslipRenderer, PayslipStore, RecipientResolver, WorkingCalendar,
};
