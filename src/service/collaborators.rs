//! In-memory collaborators.
//!
//! Simple implementations of the collaborator traits, used by the HTTP
//! server's demo wiring, the integration tests and the benchmarks.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;

use super::ports::{
    ApprovalAuthority, AttendanceSource, LoanLedger, NotificationSink, OfficerMaster,
    PayslipRenderer, RecipientResolver, WorkingCalendar,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DailyAttendanceEntry, OfficerProfile, PayrollMonth, PayrollRecord, SalaryStructure,
    StatutoryProfile,
};
use crate::workflow::WorkflowNotification;

type OfficerMonth = (String, PayrollMonth);

/// Attendance entries and overtime hours keyed by officer and month.
#[derive(Debug, Default)]
pub struct InMemoryAttendance {
    entries: RwLock<HashMap<OfficerMonth, Vec<DailyAttendanceEntry>>>,
    overtime: RwLock<HashMap<OfficerMonth, Decimal>>,
}

impl InMemoryAttendance {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entries for an officer and month.
    pub fn record(&self, officer_id: &str, month: PayrollMonth, entries: Vec<DailyAttendanceEntry>) {
        self.entries
            .write()
            .insert((officer_id.to_string(), month), entries);
    }

    /// Sets overtime hours for an officer and month.
    pub fn set_overtime(&self, officer_id: &str, month: PayrollMonth, hours: Decimal) {
        self.overtime
            .write()
            .insert((officer_id.to_string(), month), hours);
    }
}

impl AttendanceSource for InMemoryAttendance {
    fn daily_attendance(
        &self,
        officer_id: &str,
        month: PayrollMonth,
    ) -> EngineResult<Vec<DailyAttendanceEntry>> {
        self.entries
            .read()
            .get(&(officer_id.to_string(), month))
            .cloned()
            .ok_or_else(|| {
                EngineError::not_found("attendance", format!("{}/{}", officer_id, month))
            })
    }

    fn overtime_hours(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Decimal> {
        Ok(self
            .overtime
            .read()
            .get(&(officer_id.to_string(), month))
            .copied()
            .unwrap_or(Decimal::ZERO))
    }
}

/// A calendar that treats every day as working except listed weekdays and
/// holidays.
#[derive(Debug, Clone, Default)]
pub struct MonthCalendar {
    weekly_off: Vec<Weekday>,
    holidays: BTreeSet<NaiveDate>,
}

impl MonthCalendar {
    /// Every calendar day is a working day.
    pub fn every_day() -> Self {
        Self::default()
    }

    /// Every day except the given weekdays.
    pub fn excluding(weekly_off: Vec<Weekday>) -> Self {
        Self {
            weekly_off,
            holidays: BTreeSet::new(),
        }
    }

    /// Adds a holiday.
    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }
}

impl WorkingCalendar for MonthCalendar {
    fn working_days(&self, month: PayrollMonth) -> EngineResult<Vec<NaiveDate>> {
        Ok(month
            .dates()
            .into_iter()
            .filter(|d| !self.weekly_off.contains(&d.weekday()))
            .filter(|d| !self.holidays.contains(d))
            .collect())
    }
}

#[derive(Debug, Clone)]
struct OfficerEntry {
    profile: OfficerProfile,
    statutory: StatutoryProfile,
    structure: Option<SalaryStructure>,
}

/// Officer master data held in memory, ordered by officer id.
#[derive(Debug, Default)]
pub struct InMemoryOfficerMaster {
    officers: RwLock<BTreeMap<String, OfficerEntry>>,
}

impl InMemoryOfficerMaster {
    /// Creates an empty master.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an officer.
    pub fn add(
        &self,
        profile: OfficerProfile,
        statutory: StatutoryProfile,
        structure: Option<SalaryStructure>,
    ) {
        self.officers.write().insert(
            profile.officer_id.clone(),
            OfficerEntry {
                profile,
                statutory,
                structure,
            },
        );
    }

    fn entry(&self, officer_id: &str) -> EngineResult<OfficerEntry> {
        self.officers
            .read()
            .get(officer_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("officer", officer_id))
    }
}

impl OfficerMaster for InMemoryOfficerMaster {
    fn officer(&self, officer_id: &str) -> EngineResult<OfficerProfile> {
        self.entry(officer_id).map(|e| e.profile)
    }

    fn salary_structure(&self, officer_id: &str) -> EngineResult<Option<SalaryStructure>> {
        self.entry(officer_id).map(|e| e.structure)
    }

    fn statutory_profile(&self, officer_id: &str) -> EngineResult<StatutoryProfile> {
        self.entry(officer_id).map(|e| e.statutory)
    }

    fn active_officers(&self) -> EngineResult<Vec<OfficerProfile>> {
        Ok(self
            .officers
            .read()
            .values()
            .filter(|e| e.profile.active)
            .map(|e| e.profile.clone())
            .collect())
    }
}

/// Loan and advance recoveries held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLoanLedger {
    loans: RwLock<HashMap<OfficerMonth, Decimal>>,
    advances: RwLock<HashMap<OfficerMonth, Decimal>>,
}

impl InMemoryLoanLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the loan repayment for an officer and month.
    pub fn set_loan(&self, officer_id: &str, month: PayrollMonth, amount: Decimal) {
        self.loans
            .write()
            .insert((officer_id.to_string(), month), amount);
    }

    /// Sets the advance recovery for an officer and month.
    pub fn set_advance(&self, officer_id: &str, month: PayrollMonth, amount: Decimal) {
        self.advances
            .write()
            .insert((officer_id.to_string(), month), amount);
    }
}

impl LoanLedger for InMemoryLoanLedger {
    fn monthly_deduction(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Decimal> {
        Ok(self
            .loans
            .read()
            .get(&(officer_id.to_string(), month))
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    fn monthly_advance(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Decimal> {
        Ok(self
            .advances
            .read()
            .get(&(officer_id.to_string(), month))
            .copied()
            .unwrap_or(Decimal::ZERO))
    }
}

/// Renders a payslip as plain UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPayslipRenderer;

impl PayslipRenderer for TextPayslipRenderer {
    fn render(&self, record: &PayrollRecord) -> EngineResult<Vec<u8>> {
        let mut lines = vec![
            format!("PAYSLIP {}", record.month),
            format!("Officer: {} ({})", record.officer_name, record.officer_id),
            format!(
                "Paid days: {}/{}",
                record.attendance.paid_days(),
                record.attendance.total_days()
            ),
            String::new(),
            "EARNINGS".to_string(),
        ];
        lines.extend(
            record
                .salary_components
                .iter()
                .map(|c| format!("  {:<22}{:>12}", c.component_type.as_str(), c.amount)),
        );
        lines.push(format!("  {:<22}{:>12}", "gross", record.gross_salary));
        lines.push("DEDUCTIONS".to_string());
        lines.extend(
            record
                .deductions
                .iter()
                .map(|d| format!("  {:<22}{:>12}", format!("{:?}", d.deduction_type), d.amount)),
        );
        lines.push(format!("  {:<22}{:>12}", "total", record.total_deductions));
        lines.push(String::new());
        lines.push(format!("NET PAY {}", record.net_pay));
        Ok(lines.join("\n").into_bytes())
    }
}

/// Keeps every notification it is given.
///
/// A failing sink returns an error from every call, for exercising the
/// log-and-continue path.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<WorkflowNotification>>,
    failing: bool,
}

impl RecordingSink {
    /// Creates a sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose deliveries always fail.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Notifications delivered so far.
    pub fn sent(&self) -> Vec<WorkflowNotification> {
        self.sent.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &WorkflowNotification) -> EngineResult<()> {
        if self.failing {
            return Err(EngineError::Collaborator {
                collaborator: "notification_sink".to_string(),
                message: "delivery refused".to_string(),
            });
        }
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

/// Sends every notification to a fixed list of recipients.
#[derive(Debug, Clone, Default)]
pub struct StaticRecipients {
    recipients: Vec<String>,
}

impl StaticRecipients {
    /// Creates a resolver for the given recipients.
    pub fn new(recipients: Vec<String>) -> Self {
        Self { recipients }
    }
}

impl RecipientResolver for StaticRecipients {
    fn recipients(&self, _notification: &WorkflowNotification) -> EngineResult<Vec<String>> {
        Ok(self.recipients.clone())
    }
}

/// Grants approval authority to a fixed set of reviewers.
#[derive(Debug, Clone, Default)]
pub struct AllowListAuthority {
    approvers: HashSet<String>,
}

impl AllowListAuthority {
    /// Creates an authority from reviewer ids.
    pub fn new<I, S>(approvers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            approvers: approvers.into_iter().map(Into::into).collect(),
        }
    }
}

impl ApprovalAuthority for AllowListAuthority {
    fn can_approve(&self, approver_id: &str) -> bool {
        self.approvers.contains(approver_id)
    }
}
