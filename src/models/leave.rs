//! Leave application model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::LeaveType;

/// Workflow status of a leave application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting review.
    Pending,
    /// Approved. Terminal.
    Approved,
    /// Rejected. Terminal.
    Rejected,
    /// Withdrawn by the applicant. Terminal.
    Cancelled,
}

impl LeaveStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An officer's request for leave over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// Unique identifier for the application.
    pub id: Uuid,
    /// The applying officer.
    pub officer_id: String,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// Why leave is requested.
    pub reason: String,
    /// Inclusive number of calendar days.
    pub total_days: u32,
    /// Workflow status.
    pub status: LeaveStatus,
    /// When the application was submitted.
    pub applied_at: DateTime<Utc>,
    /// Reviewer who approved or rejected.
    #[serde(default)]
    pub reviewed_by: Option<String>,
    /// When it was reviewed.
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reason given on rejection.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Comments given on approval.
    #[serde(default)]
    pub admin_comments: Option<String>,
    /// When the applicant cancelled.
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl LeaveApplication {
    /// Returns true if `date` falls inside the leave range.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Every date in the leave range in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start_date
            .iter_days()
            .take_while(|d| *d <= self.end_date)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(start: u32, end: u32) -> LeaveApplication {
        LeaveApplication {
            id: Uuid::new_v4(),
            officer_id: "off_001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, start).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, end).unwrap(),
            leave_type: LeaveType::Casual,
            reason: "family function out of town".to_string(),
            total_days: end - start + 1,
            status: LeaveStatus::Pending,
            applied_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            admin_comments: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn test_covers_is_inclusive() {
        let leave = application(10, 12);
        assert!(leave.covers(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
        assert!(leave.covers(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()));
        assert!(!leave.covers(NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()));
    }

    #[test]
    fn test_dates_match_total_days() {
        let leave = application(10, 12);
        assert_eq!(leave.dates().len() as u32, leave.total_days);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(LeaveStatus::Cancelled.to_string(), "cancelled");
    }
}
