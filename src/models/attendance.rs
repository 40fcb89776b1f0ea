//! Attendance models.
//!
//! Daily entries are produced by the attendance-marking collaborator and are
//! read-only here; monthly totals are always derived from them.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayrollMonth;

/// The attendance status recorded for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// The officer worked the day.
    Present,
    /// The officer was absent without paid leave.
    Absent,
    /// The officer was on paid leave.
    Leave,
}

/// The kind of leave taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Sick leave.
    Sick,
    /// Casual leave.
    Casual,
    /// Earned (privilege) leave.
    Earned,
}

impl LeaveType {
    /// Returns the wire name of the leave type.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Sick => "sick",
            LeaveType::Casual => "casual",
            LeaveType::Earned => "earned",
        }
    }
}

/// One officer's attendance for one day.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AttendanceStatus, DailyAttendanceEntry};
/// use chrono::NaiveDate;
///
/// let entry = DailyAttendanceEntry::new(
///     NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
///     AttendanceStatus::Present,
/// );
/// assert!(entry.leave_type.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendanceEntry {
    /// The day this entry covers.
    pub date: NaiveDate,
    /// Present, absent or on leave.
    pub status: AttendanceStatus,
    /// The leave type when `status` is `leave`.
    #[serde(default)]
    pub leave_type: Option<LeaveType>,
    /// Check-in time, if recorded.
    #[serde(default)]
    pub check_in: Option<NaiveDateTime>,
    /// Check-out time, if recorded.
    #[serde(default)]
    pub check_out: Option<NaiveDateTime>,
    /// Hours worked, if recorded directly.
    #[serde(default)]
    pub hours_worked: Option<Decimal>,
}

impl DailyAttendanceEntry {
    /// Creates an entry with no leave type, timestamps or hours.
    pub fn new(date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            date,
            status,
            leave_type: None,
            check_in: None,
            check_out: None,
            hours_worked: None,
        }
    }

    /// Creates a leave entry of the given type.
    pub fn leave(date: NaiveDate, leave_type: LeaveType) -> Self {
        Self {
            leave_type: Some(leave_type),
            ..Self::new(date, AttendanceStatus::Leave)
        }
    }

    /// Hours worked on this day.
    ///
    /// Uses the recorded `hours_worked` when present, otherwise the span
    /// between check-in and check-out. Missing or inverted timestamps count
    /// as zero hours.
    pub fn effective_hours(&self) -> Decimal {
        if let Some(hours) = self.hours_worked {
            return hours;
        }
        match (self.check_in, self.check_out) {
            (Some(start), Some(end)) if end > start => {
                let minutes = (end - start).num_minutes();
                Decimal::from(minutes) / Decimal::from(60)
            }
            _ => Decimal::ZERO,
        }
    }
}

/// Attendance totals for one officer and month.
///
/// Derived by the attendance aggregator; never edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAttendanceTotals {
    /// The officer the totals belong to.
    pub officer_id: String,
    /// The month aggregated.
    pub month: PayrollMonth,
    /// Days marked present.
    pub present_days: u32,
    /// Days marked absent.
    pub absent_days: u32,
    /// Days on paid leave.
    pub leave_days: u32,
    /// Sum of effective hours across all entries.
    pub total_hours_worked: Decimal,
}

impl MonthlyAttendanceTotals {
    /// All days with an entry; the proration denominator.
    pub fn total_days(&self) -> u32 {
        self.present_days + self.absent_days + self.leave_days
    }

    /// Days that are paid (present plus leave).
    pub fn paid_days(&self) -> u32 {
        self.present_days + self.leave_days
    }
}
