//! Attendance aggregation functionality.
//!
//! This module turns one officer's daily attendance entries for a month into
//! [`MonthlyAttendanceTotals`], and backfills working days covered by
//! approved leave before aggregation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceStatus, AuditStep, DailyAttendanceEntry, LeaveApplication, LeaveStatus,
    MonthlyAttendanceTotals, PayrollMonth,
};

/// The result of aggregating attendance, including the totals and audit step.
#[derive(Debug, Clone)]
pub struct AttendanceAggregationResult {
    /// The derived monthly totals.
    pub totals: MonthlyAttendanceTotals,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Aggregates daily entries into monthly totals.
///
/// A working day without an entry is never assumed present: the caller must
/// supply one entry per working day.
///
/// # Arguments
///
/// * `officer_id` - The officer the entries belong to
/// * `month` - The month being aggregated
/// * `entries` - Daily entries, one per date
/// * `working_days` - Canonical working dates of the month
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns the totals, or an error if:
/// - An entry falls outside `month` (`Validation`)
/// - Two entries share a date (`Validation`)
/// - A working day has no entry (`IncompleteAttendance`, listing the dates)
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::aggregate_attendance;
/// use payroll_engine::models::{AttendanceStatus, DailyAttendanceEntry, PayrollMonth};
/// use chrono::NaiveDate;
///
/// let month = PayrollMonth::new(2025, 3).unwrap();
/// let days: Vec<NaiveDate> = (3..=5)
///     .map(|d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap())
///     .collect();
/// let entries: Vec<DailyAttendanceEntry> = days
///     .iter()
///     .map(|d| DailyAttendanceEntry::new(*d, AttendanceStatus::Present))
///     .collect();
///
/// let result = aggregate_attendance("off_001", month, &entries, &days, 1).unwrap();
/// assert_eq!(result.totals.present_days, 3);
/// ```
pub fn aggregate_attendance(
    officer_id: &str,
    month: PayrollMonth,
    entries: &[DailyAttendanceEntry],
    working_days: &[NaiveDate],
    step_number: u32,
) -> EngineResult<AttendanceAggregationResult> {
    let mut seen = BTreeSet::new();
    for entry in entries {
        if !month.contains(entry.date) {
            return Err(EngineError::validation(
                "entries",
                format!("entry dated {} is outside {}", entry.date, month),
            ));
        }
        if !seen.insert(entry.date) {
            return Err(EngineError::validation(
                "entries",
                format!("more than one entry for {}", entry.date),
            ));
        }
    }

    let missing_dates: Vec<NaiveDate> = working_days
        .iter()
        .filter(|d| !seen.contains(*d))
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !missing_dates.is_empty() {
        return Err(EngineError::IncompleteAttendance {
            officer_id: officer_id.to_string(),
            month: month.to_string(),
            missing_dates,
        });
    }

    let count = |status: AttendanceStatus| -> u32 {
        entries.iter().filter(|e| e.status == status).count() as u32
    };
    let present_days = count(AttendanceStatus::Present);
    let absent_days = count(AttendanceStatus::Absent);
    let leave_days = count(AttendanceStatus::Leave);
    let total_hours_worked: Decimal = entries.iter().map(|e| e.effective_hours()).sum();

    let totals = MonthlyAttendanceTotals {
        officer_id: officer_id.to_string(),
        month,
        present_days,
        absent_days,
        leave_days,
        total_hours_worked,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_aggregation".to_string(),
        rule_name: "Attendance Aggregation".to_string(),
        statute_ref: "attendance policy".to_string(),
        input: serde_json::json!({
            "month": month.to_string(),
            "entries": entries.len(),
            "working_days": working_days.len()
        }),
        output: serde_json::json!({
            "present_days": present_days,
            "absent_days": absent_days,
            "leave_days": leave_days,
            "total_hours_worked": total_hours_worked.normalize().to_string()
        }),
        reasoning: format!(
            "{} entries: {} present, {} absent, {} leave",
            entries.len(),
            present_days,
            absent_days,
            leave_days
        ),
    };

    Ok(AttendanceAggregationResult { totals, audit_step })
}

/// Adds leave entries for working days covered by approved leave.
///
/// Only working days of `month` that have no entry and fall inside an
/// approved application of the officer are filled. Existing entries always
/// win. The returned list is sorted by date.
pub fn backfill_approved_leave(
    month: PayrollMonth,
    entries: &[DailyAttendanceEntry],
    leaves: &[LeaveApplication],
    working_days: &[NaiveDate],
) -> Vec<DailyAttendanceEntry> {
    let recorded: BTreeSet<NaiveDate> = entries.iter().map(|e| e.date).collect();
    let mut filled: Vec<DailyAttendanceEntry> = entries.to_vec();

    for date in working_days {
        if recorded.contains(date) || !month.contains(*date) {
            continue;
        }
        if let Some(leave) = leaves
            .iter()
            .find(|l| l.status == LeaveStatus::Approved && l.covers(*date))
        {
            filled.push(DailyAttendanceEntry::leave(*date, leave.leave_type));
        }
    }

    filled.sort_by_key(|e| e.date);
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaveType;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn march() -> PayrollMonth {
        PayrollMonth::new(2025, 3).unwrap()
    }

    fn entries(statuses: &[(u32, AttendanceStatus)]) -> Vec<DailyAttendanceEntry> {
        statuses
            .iter()
            .map(|(d, s)| DailyAttendanceEntry::new(day(*d), *s))
            .collect()
    }

    fn approved_leave(start: u32, end: u32, status: LeaveStatus) -> LeaveApplication {
        LeaveApplication {
            id: Uuid::new_v4(),
            officer_id: "off_001".to_string(),
            start_date: day(start),
            end_date: day(end),
            leave_type: LeaveType::Earned,
            reason: "annual family visit to hometown".to_string(),
            total_days: end - start + 1,
            status,
            applied_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            admin_comments: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn test_totals_sum_to_entry_count() {
        let list = entries(&[
            (3, AttendanceStatus::Present),
            (4, AttendanceStatus::Absent),
            (5, AttendanceStatus::Leave),
            (6, AttendanceStatus::Present),
        ]);
        let working: Vec<_> = (3..=6).map(day).collect();

        let result = aggregate_attendance("off_001", march(), &list, &working, 1).unwrap();

        assert_eq!(result.totals.present_days, 2);
        assert_eq!(result.totals.absent_days, 1);
        assert_eq!(result.totals.leave_days, 1);
        assert_eq!(result.totals.total_days() as usize, list.len());
        assert_eq!(result.audit_step.rule_id, "attendance_aggregation");
    }

    #[test]
    fn test_missing_working_days_are_reported_sorted() {
        let list = entries(&[(3, AttendanceStatus::Present)]);
        let working = vec![day(5), day(3), day(4)];

        let result = aggregate_attendance("off_001", march(), &list, &working, 1);

        match result {
            Err(EngineError::IncompleteAttendance {
                officer_id,
                month,
                missing_dates,
            }) => {
                assert_eq!(officer_id, "off_001");
                assert_eq!(month, "2025-03");
                assert_eq!(missing_dates, vec![day(4), day(5)]);
            }
            other => panic!("Expected IncompleteAttendance, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_outside_month_is_invalid() {
        let list = vec![DailyAttendanceEntry::new(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            AttendanceStatus::Present,
        )];
        let result = aggregate_attendance("off_001", march(), &list, &[], 1);
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_duplicate_date_is_invalid() {
        let list = entries(&[(3, AttendanceStatus::Present), (3, AttendanceStatus::Absent)]);
        let result = aggregate_attendance("off_001", march(), &list, &[day(3)], 1);
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_weekend_work_is_counted() {
        let list = entries(&[(3, AttendanceStatus::Present), (8, AttendanceStatus::Present)]);
        let result = aggregate_attendance("off_001", march(), &list, &[day(3)], 1).unwrap();
        assert_eq!(result.totals.present_days, 2);
    }

    #[test]
    fn test_hours_are_summed() {
        let mut list = entries(&[(3, AttendanceStatus::Present), (4, AttendanceStatus::Present)]);
        list[0].hours_worked = Some(Decimal::from_str("8").unwrap());
        list[1].hours_worked = Some(Decimal::from_str("9.5").unwrap());

        let result =
            aggregate_attendance("off_001", march(), &list, &[day(3), day(4)], 1).unwrap();
        assert_eq!(result.totals.total_hours_worked, Decimal::from_str("17.5").unwrap());
    }

    #[test]
    fn test_backfill_fills_only_approved_leave_days() {
        let list = entries(&[(3, AttendanceStatus::Present)]);
        let working: Vec<_> = (3..=6).map(day).collect();
        let leaves = vec![
            approved_leave(4, 5, LeaveStatus::Approved),
            approved_leave(6, 6, LeaveStatus::Pending),
        ];

        let filled = backfill_approved_leave(march(), &list, &leaves, &working);

        assert_eq!(filled.len(), 3);
        assert_eq!(filled[1], DailyAttendanceEntry::leave(day(4), LeaveType::Earned));
        assert_eq!(filled[2], DailyAttendanceEntry::leave(day(5), LeaveType::Earned));
        let result = aggregate_attendance("off_001", march(), &filled, &working, 1);
        assert!(matches!(
            result,
            Err(EngineError::IncompleteAttendance { missing_dates, .. }) if missing_dates == vec![day(6)]
        ));
    }

    #[test]
    fn test_backfill_never_overrides_recorded_entry() {
        let list = entries(&[(4, AttendanceStatus::Absent)]);
        let leaves = vec![approved_leave(4, 4, LeaveStatus::Approved)];

        let filled = backfill_approved_leave(march(), &list, &leaves, &[day(4)]);

        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].status, AttendanceStatus::Absent);
    }
}
