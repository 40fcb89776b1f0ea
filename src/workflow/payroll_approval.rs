//! Payroll approval state machine.
//!
//! ```text
//! draft -> pending -> approved -> forwarded -> paid
//!                  \-> rejected
//! ```
//!
//! Transitions here are pure: they check the precondition status and the
//! action's guards, and return the next version of the record. Persisting
//! it atomically is the store's job.

use chrono::{DateTime, Utc};

use super::validate_reason;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollRecord, PayrollStatus, WorkflowEvent};

/// A requested payroll transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayrollAction {
    /// `draft -> pending`.
    Submit {
        /// Who submitted the record.
        actor: String,
    },
    /// `pending -> approved`.
    Approve {
        /// The approving reviewer.
        approver_id: String,
        /// Optional reviewer comments.
        comments: Option<String>,
    },
    /// `pending -> rejected`.
    Reject {
        /// The rejecting reviewer.
        approver_id: String,
        /// Why the record was rejected; at least 20 characters once trimmed.
        reason: String,
    },
    /// `approved -> forwarded`.
    Forward {
        /// Who handed the record to disbursement.
        forwarded_by: String,
    },
    /// `forwarded -> paid`.
    MarkPaid {
        /// Payment channel.
        payment_mode: String,
        /// Bank or cheque reference.
        payment_reference: String,
    },
}

impl PayrollAction {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            PayrollAction::Submit { .. } => "submit",
            PayrollAction::Approve { .. } => "approve",
            PayrollAction::Reject { .. } => "reject",
            PayrollAction::Forward { .. } => "forward",
            PayrollAction::MarkPaid { .. } => "mark_paid",
        }
    }

    /// The status the record must be in.
    pub fn expected_status(&self) -> PayrollStatus {
        match self {
            PayrollAction::Submit { .. } => PayrollStatus::Draft,
            PayrollAction::Approve { .. } | PayrollAction::Reject { .. } => PayrollStatus::Pending,
            PayrollAction::Forward { .. } => PayrollStatus::Approved,
            PayrollAction::MarkPaid { .. } => PayrollStatus::Forwarded,
        }
    }

    /// The status the record moves to.
    pub fn target_status(&self) -> PayrollStatus {
        match self {
            PayrollAction::Submit { .. } => PayrollStatus::Pending,
            PayrollAction::Approve { .. } => PayrollStatus::Approved,
            PayrollAction::Reject { .. } => PayrollStatus::Rejected,
            PayrollAction::Forward { .. } => PayrollStatus::Forwarded,
            PayrollAction::MarkPaid { .. } => PayrollStatus::Paid,
        }
    }

    /// Who performs the transition, for the history entry.
    pub fn actor(&self) -> &str {
        match self {
            PayrollAction::Submit { actor } => actor,
            PayrollAction::Approve { approver_id, .. } | PayrollAction::Reject { approver_id, .. } => {
                approver_id
            }
            PayrollAction::Forward { forwarded_by } => forwarded_by,
            PayrollAction::MarkPaid { .. } => "disbursement",
        }
    }

    /// The reviewer whose authority must be checked, if any.
    pub fn approver(&self) -> Option<&str> {
        match self {
            PayrollAction::Approve { approver_id, .. } | PayrollAction::Reject { approver_id, .. } => {
                Some(approver_id)
            }
            _ => None,
        }
    }
}

/// Checks guards that do not depend on the record's status.
///
/// Run before touching the store so an invalid request never causes a
/// write.
pub fn validate_payroll_action(action: &PayrollAction) -> EngineResult<()> {
    match action {
        PayrollAction::Reject { reason, .. } => validate_reason(reason).map(|_| ()),
        PayrollAction::MarkPaid {
            payment_mode,
            payment_reference,
        } => {
            if payment_mode.trim().is_empty() {
                return Err(EngineError::validation(
                    "payment_mode",
                    "payment mode is required",
                ));
            }
            if payment_reference.trim().is_empty() {
                return Err(EngineError::validation(
                    "payment_reference",
                    "payment reference is required",
                ));
            }
            Ok(())
        }
        PayrollAction::Forward { forwarded_by } if forwarded_by.trim().is_empty() => Err(
            EngineError::validation("forwarded_by", "forwarding actor is required"),
        ),
        _ => Ok(()),
    }
}

/// Applies a transition to a record, returning the next version.
///
/// # Returns
///
/// - `StateConflict` if the record is not in the action's expected status
/// - `Validation` if a guard fails: a rejection reason shorter than 20
///   characters, a blank payment field, or a submitted record without
///   components or with inconsistent totals
///
/// The input record is never modified.
///
/// # Examples
///
/// ```
/// # use payroll_engine::workflow::{PayrollAction, apply_payroll_transition};
/// # fn demo(record: &payroll_engine::models::PayrollRecord) {
/// let action = PayrollAction::Reject {
///     approver_id: "rev_01".to_string(),
///     reason: "too short".to_string(),
/// };
/// assert!(apply_payroll_transition(record, &action, chrono::Utc::now()).is_err());
/// # }
/// ```
pub fn apply_payroll_transition(
    record: &PayrollRecord,
    action: &PayrollAction,
    now: DateTime<Utc>,
) -> EngineResult<PayrollRecord> {
    validate_payroll_action(action)?;

    let expected = action.expected_status();
    if record.status != expected {
        return Err(EngineError::StateConflict {
            entity: "payroll_record".to_string(),
            id: record.id.to_string(),
            expected: expected.to_string(),
            actual: record.status.to_string(),
        });
    }

    let mut next = record.clone();
    let note = match action {
        PayrollAction::Submit { .. } => {
            if record.salary_components.is_empty() {
                return Err(EngineError::validation(
                    "salary_components",
                    "cannot submit a record without salary components",
                ));
            }
            if !record.totals_are_consistent() {
                return Err(EngineError::validation(
                    "net_pay",
                    "record totals do not match its line items; recompute before submitting",
                ));
            }
            next.submitted_at = Some(now);
            None
        }
        PayrollAction::Approve {
            approver_id,
            comments,
        } => {
            next.approved_by = Some(approver_id.clone());
            next.approved_date = Some(now);
            next.reviewer_comments = comments.clone();
            comments.clone()
        }
        PayrollAction::Reject {
            approver_id,
            reason,
        } => {
            let reason = reason.trim().to_string();
            next.approved_by = Some(approver_id.clone());
            next.approved_date = Some(now);
            next.rejection_reason = Some(reason.clone());
            Some(reason)
        }
        PayrollAction::Forward { forwarded_by } => {
            next.forwarded_by = Some(forwarded_by.clone());
            next.forwarded_at = Some(now);
            None
        }
        PayrollAction::MarkPaid {
            payment_mode,
            payment_reference,
        } => {
            next.paid_date = Some(now);
            next.payment_mode = Some(payment_mode.trim().to_string());
            next.payment_reference = Some(payment_reference.trim().to_string());
            Some(payment_reference.trim().to_string())
        }
    };

    next.status = action.target_status();
    next.history.push(WorkflowEvent {
        from: expected.to_string(),
        to: next.status.to_string(),
        actor: action.actor().to_string(),
        at: now,
        note,
    });

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{PayrollInputs, assemble_payroll};
    use crate::config::StatutoryConfig;
    use crate::models::{MonthlyAttendanceTotals, OfficerProfile, PayrollMonth, StatutoryProfile};
    use rust_decimal::Decimal;

    fn draft() -> PayrollRecord {
        let officer = OfficerProfile {
            officer_id: "off_001".to_string(),
            officer_name: "A. Rao".to_string(),
            employee_id: None,
            designation: None,
            institution_id: None,
            email: None,
            monthly_salary: Decimal::from(30000),
            active: true,
        };
        let profile = StatutoryProfile::new(true, true, true).with_jurisdiction("maharashtra");
        let attendance = MonthlyAttendanceTotals {
            officer_id: "off_001".to_string(),
            month: PayrollMonth::new(2025, 4).unwrap(),
            present_days: 30,
            absent_days: 0,
            leave_days: 0,
            total_hours_worked: Decimal::ZERO,
        };
        assemble_payroll(
            PayrollInputs {
                officer: &officer,
                structure: None,
                profile: &profile,
                attendance: &attendance,
                attendance_step: None,
                overtime_hours: Decimal::ZERO,
                loan_deduction: Decimal::ZERO,
                advance_deduction: Decimal::ZERO,
            },
            &StatutoryConfig::default(),
            Utc::now(),
        )
        .unwrap()
    }

    fn submit() -> PayrollAction {
        PayrollAction::Submit {
            actor: "clerk_01".to_string(),
        }
    }

    fn approve() -> PayrollAction {
        PayrollAction::Approve {
            approver_id: "rev_01".to_string(),
            comments: Some("Verified against attendance".to_string()),
        }
    }

    fn reject(reason: &str) -> PayrollAction {
        PayrollAction::Reject {
            approver_id: "rev_01".to_string(),
            reason: reason.to_string(),
        }
    }

    fn step(record: &PayrollRecord, action: PayrollAction) -> PayrollRecord {
        apply_payroll_transition(record, &action, Utc::now()).unwrap()
    }

    #[test]
    fn test_happy_path_to_paid() {
        let record = draft();
        let pending = step(&record, submit());
        let approved = step(&pending, approve());
        let forwarded = step(
            &approved,
            PayrollAction::Forward {
                forwarded_by: "accounts_01".to_string(),
            },
        );
        let paid = step(
            &forwarded,
            PayrollAction::MarkPaid {
                payment_mode: "bank_transfer".to_string(),
                payment_reference: "UTR123456".to_string(),
            },
        );

        assert_eq!(pending.status, PayrollStatus::Pending);
        assert!(pending.submitted_at.is_some());
        assert_eq!(approved.approved_by.as_deref(), Some("rev_01"));
        assert_eq!(
            approved.reviewer_comments.as_deref(),
            Some("Verified against attendance")
        );
        assert_eq!(forwarded.forwarded_by.as_deref(), Some("accounts_01"));
        assert_eq!(paid.status, PayrollStatus::Paid);
        assert_eq!(paid.payment_reference.as_deref(), Some("UTR123456"));
        assert!(paid.paid_date.is_some());

        let trail: Vec<(&str, &str)> = paid
            .history
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(
            trail,
            vec![
                ("draft", "pending"),
                ("pending", "approved"),
                ("approved", "forwarded"),
                ("forwarded", "paid"),
            ]
        );
    }

    #[test]
    fn test_reject_reason_length_boundary() {
        let pending = step(&draft(), submit());

        let nineteen = "a".repeat(19);
        let err = apply_payroll_transition(&pending, &reject(&nineteen), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));

        // Surrounding whitespace does not count towards the minimum.
        let padded = format!("   {}   ", nineteen);
        assert!(apply_payroll_transition(&pending, &reject(&padded), Utc::now()).is_err());

        let twenty = "a".repeat(20);
        let rejected = step(&pending, reject(&twenty));
        assert_eq!(rejected.status, PayrollStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some(twenty.as_str()));
    }

    #[test]
    fn test_reject_reason_is_validated_before_status() {
        // A short reason on a draft reports the reason, not the status.
        let err = apply_payroll_transition(&draft(), &reject(""), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn test_wrong_status_is_state_conflict() {
        let record = draft();
        let err = apply_payroll_transition(&record, &approve(), Utc::now()).unwrap_err();
        match err {
            EngineError::StateConflict {
                expected, actual, ..
            } => {
                assert_eq!(expected, "pending");
                assert_eq!(actual, "draft");
            }
            other => panic!("expected StateConflict, got {other:?}"),
        }
        assert_eq!(record.status, PayrollStatus::Draft);
        assert!(record.history.is_empty());
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        let pending = step(&draft(), submit());
        let rejected = step(&pending, reject("Attendance for the 14th is disputed"));

        for action in [submit(), approve(), reject("Attendance for the 14th is disputed")] {
            assert!(apply_payroll_transition(&rejected, &action, Utc::now()).is_err());
        }
    }

    #[test]
    fn test_submit_requires_consistent_totals() {
        let mut record = draft();
        record.salary_components[0].amount += Decimal::ONE;
        let err = apply_payroll_transition(&record, &submit(), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "net_pay"));
    }

    #[test]
    fn test_submit_requires_components() {
        let mut record = draft();
        record.salary_components.clear();
        let totals = record.recompute_totals();
        record.total_earnings = totals.total_earnings;
        record.gross_salary = totals.gross_salary;
        record.net_pay = totals.net_pay;
        let err = apply_payroll_transition(&record, &submit(), Utc::now()).unwrap_err();
        assert!(
            matches!(err, EngineError::Validation { ref field, .. } if field == "salary_components")
        );
    }

    #[test]
    fn test_mark_paid_requires_mode_and_reference() {
        let action = PayrollAction::MarkPaid {
            payment_mode: "bank_transfer".to_string(),
            payment_reference: "  ".to_string(),
        };
        assert!(validate_payroll_action(&action).is_err());

        let action = PayrollAction::MarkPaid {
            payment_mode: "".to_string(),
            payment_reference: "UTR1".to_string(),
        };
        assert!(validate_payroll_action(&action).is_err());
    }

    #[test]
    fn test_action_metadata() {
        assert_eq!(approve().approver(), Some("rev_01"));
        assert_eq!(submit().approver(), None);
        assert_eq!(reject("x").expected_status(), PayrollStatus::Pending);
        assert_eq!(submit().name(), "submit");
    }
}
