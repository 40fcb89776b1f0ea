//! Collaborator traits consumed by the payroll and leave services.
//!
//! Every external dependency sits behind one of these traits so the
//! services can be driven by in-memory implementations in tests and by real
//! adapters in production. All of them must be `Send + Sync`; bulk payslip
//! generation calls them from worker threads.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    DailyAttendanceEntry, DeliveryStatus, LeaveApplication, LeaveStatus, OfficerProfile,
    PayrollMonth, PayrollRecord, PayrollStatus, Payslip, SalaryStructure, StatutoryProfile,
};
use crate::workflow::WorkflowNotification;

/// Source of daily attendance entries.
pub trait AttendanceSource: Send + Sync {
    /// Entries for one officer and month, or `NotFound`.
    fn daily_attendance(
        &self,
        officer_id: &str,
        month: PayrollMonth,
    ) -> EngineResult<Vec<DailyAttendanceEntry>>;

    /// Overtime hours reported for the month.
    fn overtime_hours(&self, _officer_id: &str, _month: PayrollMonth) -> EngineResult<Decimal> {
        Ok(Decimal::ZERO)
    }
}

/// The institution's working calendar.
pub trait WorkingCalendar: Send + Sync {
    /// Dates on which attendance must be recorded.
    fn working_days(&self, month: PayrollMonth) -> EngineResult<Vec<NaiveDate>>;
}

/// Officer master data.
pub trait OfficerMaster: Send + Sync {
    /// The officer's profile, or `NotFound`.
    fn officer(&self, officer_id: &str) -> EngineResult<OfficerProfile>;

    /// The officer's explicit salary structure, if one exists.
    fn salary_structure(&self, officer_id: &str) -> EngineResult<Option<SalaryStructure>>;

    /// The officer's statutory flags.
    fn statutory_profile(&self, officer_id: &str) -> EngineResult<StatutoryProfile>;

    /// Officers to include in a bulk run.
    fn active_officers(&self) -> EngineResult<Vec<OfficerProfile>>;
}

/// Loan and advance recoveries.
pub trait LoanLedger: Send + Sync {
    /// Loan repayment due for the month; zero when there is none.
    fn monthly_deduction(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Decimal>;

    /// Salary advance recovery due for the month; zero when there is none.
    fn monthly_advance(&self, _officer_id: &str, _month: PayrollMonth) -> EngineResult<Decimal> {
        Ok(Decimal::ZERO)
    }
}

/// Produces the payslip document for a record.
pub trait PayslipRenderer: Send + Sync {
    /// Renders the record to document bytes.
    fn render(&self, record: &PayrollRecord) -> EngineResult<Vec<u8>>;
}

/// Delivers workflow notifications.
///
/// Called once per accepted transition. Errors are logged by the caller
/// and never retried or propagated.
pub trait NotificationSink: Send + Sync {
    /// Sends one notification.
    fn notify(&self, notification: &WorkflowNotification) -> EngineResult<()>;
}

/// Decides who is told about a transition.
pub trait RecipientResolver: Send + Sync {
    /// Recipients for a notification.
    fn recipients(&self, notification: &WorkflowNotification) -> EngineResult<Vec<String>>;
}

/// Decides who may approve or reject.
pub trait ApprovalAuthority: Send + Sync {
    /// Returns true if the reviewer holds approval authority.
    fn can_approve(&self, approver_id: &str) -> bool;
}

/// Persistent payroll records.
pub trait PayrollStore: Send + Sync {
    /// Stores a new record.
    ///
    /// Fails with `StateConflict` if the id exists, or if another record for
    /// the same officer and month is in any status other than `rejected`.
    fn insert(&self, record: PayrollRecord) -> EngineResult<()>;

    /// Fetches a record by id, or `NotFound`.
    fn get(&self, id: Uuid) -> EngineResult<PayrollRecord>;

    /// All records for an officer and month, oldest first.
    fn find(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Vec<PayrollRecord>>;

    /// Replaces the record with `next` only if its stored status is still
    /// `expected`. The check and the write are one atomic step.
    ///
    /// Fails with `NotFound` or `StateConflict`; on failure nothing changes.
    fn compare_and_set(
        &self,
        id: Uuid,
        expected: PayrollStatus,
        next: PayrollRecord,
    ) -> EngineResult<PayrollRecord>;
}

/// Persistent leave applications.
pub trait LeaveStore: Send + Sync {
    /// Stores a new application.
    fn insert(&self, application: LeaveApplication) -> EngineResult<()>;

    /// Fetches an application by id, or `NotFound`.
    fn get(&self, id: Uuid) -> EngineResult<LeaveApplication>;

    /// All applications of an officer, oldest first.
    fn find(&self, officer_id: &str) -> EngineResult<Vec<LeaveApplication>>;

    /// Atomic status compare-and-set, as for [`PayrollStore::compare_and_set`].
    fn compare_and_set(
        &self,
        id: Uuid,
        expected: LeaveStatus,
        next: LeaveApplication,
    ) -> EngineResult<LeaveApplication>;
}

/// Persistent payslips.
pub trait PayslipStore: Send + Sync {
    /// Stores a new payslip.
    fn insert(&self, payslip: Payslip) -> EngineResult<()>;

    /// Fetches a payslip by id, or `NotFound`.
    fn get(&self, id: Uuid) -> EngineResult<Payslip>;

    /// All payslips for an officer and month, oldest first.
    fn find(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Vec<Payslip>>;

    /// Atomic delivery-status compare-and-set.
    fn compare_and_set(
        &self,
        id: Uuid,
        expected: DeliveryStatus,
        next: Payslip,
    ) -> EngineResult<Payslip>;
}
