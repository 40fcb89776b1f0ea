//! Payroll computation, approval and payslip generation.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::notifier::Notifier;
use super::ports::{
    ApprovalAuthority, AttendanceSource, LeaveStore, LoanLedger, OfficerMaster, PayrollStore,
    PayslipRenderer, PayslipStore, WorkingCalendar,
};
use crate::calculation::{
    PayrollInputs, aggregate_attendance, assemble_payroll, backfill_approved_leave,
};
use crate::config::StatutoryConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DeliveryMetadata, DeliveryStatus, LeaveStatus, PayrollMonth, PayrollRecord, PayrollStatus,
    Payslip,
};
use crate::workflow::{
    NotificationSubject, PayrollAction, WorkflowNotification, apply_payroll_transition,
    validate_payroll_action,
};

/// Everything the payroll service talks to.
#[derive(Clone)]
pub struct PayrollCollaborators {
    /// Daily attendance and overtime.
    pub attendance: Arc<dyn AttendanceSource>,
    /// Working days per month.
    pub calendar: Arc<dyn WorkingCalendar>,
    /// Officer master data.
    pub officers: Arc<dyn OfficerMaster>,
    /// Loan and advance recoveries.
    pub loans: Arc<dyn LoanLedger>,
    /// Leave applications, read for the approved-leave backfill.
    pub leaves: Arc<dyn LeaveStore>,
    /// Payroll records.
    pub records: Arc<dyn PayrollStore>,
    /// Payslips.
    pub payslips: Arc<dyn PayslipStore>,
    /// Payslip document renderer.
    pub renderer: Arc<dyn PayslipRenderer>,
    /// Approval authority.
    pub authority: Arc<dyn ApprovalAuthority>,
    /// Transition notifications.
    pub notifier: Notifier,
}

/// Outcome of a bulk payslip run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGenerationSummary {
    /// The month processed.
    pub month: PayrollMonth,
    /// Officers whose payslip is now on file.
    pub generated: usize,
    /// Officers whose payslip could not be produced.
    pub failed: usize,
    /// Ids of the failed officers, sorted.
    pub failed_officer_ids: Vec<String>,
}

/// Computes payroll records and moves them through approval.
#[derive(Clone)]
pub struct PayrollService {
    config: Arc<StatutoryConfig>,
    deps: PayrollCollaborators,
}

impl PayrollService {
    /// Creates a service over the given configuration and collaborators.
    pub fn new(config: Arc<StatutoryConfig>, deps: PayrollCollaborators) -> Self {
        Self { config, deps }
    }

    /// The statutory configuration in use.
    pub fn config(&self) -> &StatutoryConfig {
        &self.config
    }

    /// Fetches a record by id.
    pub fn get_record(&self, record_id: Uuid) -> EngineResult<PayrollRecord> {
        self.deps.records.get(record_id)
    }

    /// Computes the officer's draft payroll for a month.
    ///
    /// An existing draft for the same month is recomputed in place and keeps
    /// its id and history. A record that is pending, approved, forwarded or
    /// paid blocks computation with `StateConflict`. Rejected records stay on
    /// file and a new draft is created next to them.
    pub fn compute_payroll(
        &self,
        officer_id: &str,
        month: PayrollMonth,
    ) -> EngineResult<PayrollRecord> {
        let start_time = Instant::now();
        let existing = self.deps.records.find(officer_id, month)?;

        if let Some(blocking) = existing
            .iter()
            .find(|r| !matches!(r.status, PayrollStatus::Draft | PayrollStatus::Rejected))
        {
            warn!(
                record_id = %blocking.id,
                officer_id = %officer_id,
                month = %month,
                status = %blocking.status,
                "Refusing to recompute a record already under review"
            );
            return Err(EngineError::StateConflict {
                entity: "payroll_record".to_string(),
                id: blocking.id.to_string(),
                expected: PayrollStatus::Draft.to_string(),
                actual: blocking.status.to_string(),
            });
        }

        let mut record = self.build_record(officer_id, month)?;

        let stored = match existing.iter().find(|r| r.status == PayrollStatus::Draft) {
            Some(draft) => {
                record.id = draft.id;
                record.history = draft.history.clone();
                self.deps
                    .records
                    .compare_and_set(draft.id, PayrollStatus::Draft, record)?
            }
            None => {
                self.deps.records.insert(record.clone())?;
                record
            }
        };

        info!(
            record_id = %stored.id,
            officer_id = %officer_id,
            month = %month,
            gross = %stored.gross_salary,
            net = %stored.net_pay,
            warnings = stored.warnings.len(),
            duration_us = start_time.elapsed().as_micros(),
            "Payroll computed"
        );
        Ok(stored)
    }

    fn build_record(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<PayrollRecord> {
        let deps = &self.deps;
        let officer = deps.officers.officer(officer_id)?;
        let structure = deps.officers.salary_structure(officer_id)?;
        let profile = deps.officers.statutory_profile(officer_id)?;

        let entries = deps.attendance.daily_attendance(officer_id, month)?;
        let working_days = deps.calendar.working_days(month)?;
        let approved: Vec<_> = deps
            .leaves
            .find(officer_id)?
            .into_iter()
            .filter(|l| l.status == LeaveStatus::Approved)
            .collect();
        let entries = backfill_approved_leave(month, &entries, &approved, &working_days);
        let aggregation = aggregate_attendance(officer_id, month, &entries, &working_days, 1)?;

        let overtime_hours = deps.attendance.overtime_hours(officer_id, month)?;
        let loan_deduction = deps.loans.monthly_deduction(officer_id, month)?;
        let advance_deduction = deps.loans.monthly_advance(officer_id, month)?;

        debug!(
            officer_id = %officer_id,
            month = %month,
            paid_days = aggregation.totals.paid_days(),
            total_days = aggregation.totals.total_days(),
            approved_leaves = approved.len(),
            "Attendance aggregated"
        );

        assemble_payroll(
            PayrollInputs {
                officer: &officer,
                structure: structure.as_ref(),
                profile: &profile,
                attendance: &aggregation.totals,
                attendance_step: Some(aggregation.audit_step),
                overtime_hours,
                loan_deduction,
                advance_deduction,
            },
            &self.config,
            Utc::now(),
        )
    }

    /// `draft -> pending`.
    pub fn submit_for_review(
        &self,
        record_id: Uuid,
        submitted_by: &str,
    ) -> EngineResult<PayrollRecord> {
        self.transition(
            record_id,
            PayrollAction::Submit {
                actor: submitted_by.to_string(),
            },
        )
    }

    /// `pending -> approved`.
    pub fn approve(
        &self,
        record_id: Uuid,
        approver_id: &str,
        comments: Option<String>,
    ) -> EngineResult<PayrollRecord> {
        self.transition(
            record_id,
            PayrollAction::Approve {
                approver_id: approver_id.to_string(),
                comments,
            },
        )
    }

    /// `pending -> rejected`.
    pub fn reject(
        &self,
        record_id: Uuid,
        approver_id: &str,
        reason: &str,
    ) -> EngineResult<PayrollRecord> {
        self.transition(
            record_id,
            PayrollAction::Reject {
                approver_id: approver_id.to_string(),
                reason: reason.to_string(),
            },
        )
    }

    /// `approved -> forwarded`.
    pub fn forward(&self, record_id: Uuid, forwarded_by: &str) -> EngineResult<PayrollRecord> {
        self.transition(
            record_id,
            PayrollAction::Forward {
                forwarded_by: forwarded_by.to_string(),
            },
        )
    }

    /// `forwarded -> paid`.
    pub fn mark_paid(
        &self,
        record_id: Uuid,
        payment_mode: &str,
        payment_reference: &str,
    ) -> EngineResult<PayrollRecord> {
        self.transition(
            record_id,
            PayrollAction::MarkPaid {
                payment_mode: payment_mode.to_string(),
                payment_reference: payment_reference.to_string(),
            },
        )
    }

    fn transition(&self, record_id: Uuid, action: PayrollAction) -> EngineResult<PayrollRecord> {
        let outcome = self.try_transition(record_id, &action);
        match &outcome {
            Ok(record) => {
                let from = record
                    .history
                    .last()
                    .map(|e| e.from.clone())
                    .unwrap_or_default();
                info!(
                    record_id = %record.id,
                    officer_id = %record.officer_id,
                    action = action.name(),
                    from = %from,
                    to = %record.status,
                    "Payroll transition accepted"
                );
                self.deps.notifier.publish(WorkflowNotification {
                    subject: NotificationSubject::Payroll,
                    entity_id: record.id,
                    officer_id: record.officer_id.clone(),
                    from,
                    to: record.status.to_string(),
                    actor: action.actor().to_string(),
                    recipients: Vec::new(),
                });
            }
            Err(err) => warn!(
                record_id = %record_id,
                action = action.name(),
                error = %err,
                "Payroll transition rejected"
            ),
        }
        outcome
    }

    fn try_transition(
        &self,
        record_id: Uuid,
        action: &PayrollAction,
    ) -> EngineResult<PayrollRecord> {
        validate_payroll_action(action)?;
        if let Some(approver) = action.approver() {
            if !self.deps.authority.can_approve(approver) {
                return Err(EngineError::PermissionDenied {
                    actor: approver.to_string(),
                    action: format!("{} payroll records", action.name()),
                });
            }
        }

        let current = self.deps.records.get(record_id)?;
        let next = apply_payroll_transition(&current, action, Utc::now())?;
        self.deps
            .records
            .compare_and_set(record_id, action.expected_status(), next)
    }

    /// Produces the officer's payslip for a month.
    ///
    /// Reuses the officer's non-rejected record for the month, computing a
    /// draft when there is none. A payslip already on file for the same
    /// version of the record is returned instead of rendering again.
    pub fn generate_payslip(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Payslip> {
        let active = self
            .deps
            .records
            .find(officer_id, month)?
            .into_iter()
            .rev()
            .find(|r| r.status != PayrollStatus::Rejected);
        let record = match active {
            Some(record) => record,
            None => self.compute_payroll(officer_id, month)?,
        };

        if let Some(existing) = self
            .deps
            .payslips
            .find(officer_id, month)?
            .into_iter()
            .rev()
            .find(|p| p.is_current_for(&record))
        {
            return Ok(existing);
        }

        let officer = self.deps.officers.officer(officer_id)?;
        let document = self.deps.renderer.render(&record)?;
        let payslip = Payslip {
            id: Uuid::new_v4(),
            record,
            generated_date: Utc::now(),
            document,
            delivery: DeliveryMetadata {
                recipient: officer.email,
                status: DeliveryStatus::Generated,
            },
        };
        self.deps.payslips.insert(payslip.clone())?;
        Ok(payslip)
    }

    /// Generates payslips for every active officer, in parallel.
    ///
    /// Each officer is isolated: a failure is logged and counted and never
    /// stops the others.
    pub fn bulk_generate_payslips(&self, month: PayrollMonth) -> EngineResult<BulkGenerationSummary> {
        let start_time = Instant::now();
        let officers = self.deps.officers.active_officers()?;

        let outcomes: Vec<(String, EngineResult<Payslip>)> = officers
            .par_iter()
            .map(|officer| {
                let outcome = self.generate_payslip(&officer.officer_id, month);
                (officer.officer_id.clone(), outcome)
            })
            .collect();

        let mut failed_officer_ids = Vec::new();
        let mut generated = 0;
        for (officer_id, outcome) in outcomes {
            match outcome {
                Ok(_) => generated += 1,
                Err(err) => {
                    warn!(
                        officer_id = %officer_id,
                        month = %month,
                        error = %err,
                        "Payslip generation failed"
                    );
                    failed_officer_ids.push(officer_id);
                }
            }
        }
        failed_officer_ids.sort();

        info!(
            month = %month,
            generated,
            failed = failed_officer_ids.len(),
            duration_us = start_time.elapsed().as_micros(),
            "Bulk payslip generation finished"
        );

        Ok(BulkGenerationSummary {
            month,
            generated,
            failed: failed_officer_ids.len(),
            failed_officer_ids,
        })
    }

    /// Records the delivery outcome of a generated payslip.
    pub fn record_payslip_delivery(
        &self,
        payslip_id: Uuid,
        status: DeliveryStatus,
    ) -> EngineResult<Payslip> {
        if status == DeliveryStatus::Generated {
            return Err(EngineError::validation(
                "status",
                "delivery outcome must be sent or failed",
            ));
        }
        let mut next = self.deps.payslips.get(payslip_id)?;
        next.delivery.status = status;
        self.deps
            .payslips
            .compare_and_set(payslip_id, DeliveryStatus::Generated, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceStatus, DailyAttendanceEntry, DeductionType, LeaveType, OfficerProfile,
        StatutoryProfile,
    };
    use crate::service::{
        AllowListAuthority, InMemoryAttendance, InMemoryLeaveStore, InMemoryLoanLedger,
        InMemoryOfficerMaster, InMemoryPayrollStore, InMemoryPayslipStore, LeaveService,
        MonthCalendar, RecordingSink, StaticRecipients, TextPayslipRenderer,
    };
    use crate::workflow::LeaveRequest;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    struct Fixture {
        service: PayrollService,
        leave_service: LeaveService,
        attendance: Arc<InMemoryAttendance>,
        officers: Arc<InMemoryOfficerMaster>,
        loans: Arc<InMemoryLoanLedger>,
        payslips: Arc<InMemoryPayslipStore>,
        sink: Arc<RecordingSink>,
    }

    fn april() -> PayrollMonth {
        PayrollMonth::new(2025, 4).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn officer(id: &str, monthly: i64) -> OfficerProfile {
        OfficerProfile {
            officer_id: id.to_string(),
            officer_name: format!("Officer {}", id),
            employee_id: None,
            designation: None,
            institution_id: None,
            email: Some(format!("{}@example.org", id)),
            monthly_salary: Decimal::from(monthly),
            active: true,
        }
    }

    /// 28 present, 1 absent (the 15th), 1 leave (the 16th).
    fn reference_entries() -> Vec<DailyAttendanceEntry> {
        (1..=30)
            .map(|d| match d {
                15 => DailyAttendanceEntry::new(day(d), AttendanceStatus::Absent),
                16 => DailyAttendanceEntry::leave(day(d), LeaveType::Casual),
                _ => DailyAttendanceEntry::new(day(d), AttendanceStatus::Present),
            })
            .collect()
    }

    fn fixture() -> Fixture {
        let attendance = Arc::new(InMemoryAttendance::new());
        let officers = Arc::new(InMemoryOfficerMaster::new());
        let loans = Arc::new(InMemoryLoanLedger::new());
        let payslips = Arc::new(InMemoryPayslipStore::new());
        let leaves = Arc::new(InMemoryLeaveStore::new());
        let sink = Arc::new(RecordingSink::new());
        let authority = Arc::new(AllowListAuthority::new(["rev_01"]));
        let notifier = Notifier::new(
            sink.clone(),
            Arc::new(StaticRecipients::new(vec!["payroll@example.org".to_string()])),
        );

        officers.add(
            officer("off_001", 30000),
            StatutoryProfile::new(true, true, true).with_jurisdiction("maharashtra"),
            None,
        );
        attendance.record("off_001", april(), reference_entries());

        let service = PayrollService::new(
            Arc::new(StatutoryConfig::default()),
            PayrollCollaborators {
                attendance: attendance.clone(),
                calendar: Arc::new(MonthCalendar::every_day()),
                officers: officers.clone(),
                loans: loans.clone(),
                leaves: leaves.clone(),
                records: Arc::new(InMemoryPayrollStore::new()),
                payslips: payslips.clone(),
                renderer: Arc::new(TextPayslipRenderer),
                authority: authority.clone(),
                notifier: notifier.clone(),
            },
        );
        let leave_service = LeaveService::new(leaves, authority, notifier);

        Fixture {
            service,
            leave_service,
            attendance,
            officers,
            loans,
            payslips,
            sink,
        }
    }

    #[test]
    fn test_compute_reference_month() {
        let f = fixture();
        let record = f.service.compute_payroll("off_001", april()).unwrap();

        assert_eq!(record.attendance.present_days, 28);
        assert_eq!(record.salary_components[0].amount, Decimal::from(11600));
        assert_eq!(record.gross_salary, Decimal::from(29000));
        assert_eq!(record.pf_employee, Decimal::from(1740));
        assert_eq!(record.professional_tax, Decimal::from(200));
        assert_eq!(record.net_pay, record.gross_salary - record.total_deductions);
        assert_eq!(record.audit_trace[0].rule_id, "attendance_aggregation");
        assert_eq!(record.status, PayrollStatus::Draft);
    }

    #[test]
    fn test_recompute_draft_keeps_id() {
        let f = fixture();
        let first = f.service.compute_payroll("off_001", april()).unwrap();
        f.loans.set_loan("off_001", april(), Decimal::from(1000));
        let second = f.service.compute_payroll("off_001", april()).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.deduction_amount(DeductionType::Loan), Decimal::from(1000));
        assert_eq!(second.net_pay, first.net_pay - Decimal::from(1000));
    }

    #[test]
    fn test_recompute_under_review_is_conflict() {
        let f = fixture();
        let record = f.service.compute_payroll("off_001", april()).unwrap();
        f.service.submit_for_review(record.id, "clerk_01").unwrap();

        let err = f.service.compute_payroll("off_001", april()).unwrap_err();
        assert!(matches!(err, EngineError::StateConflict { .. }));
    }

    #[test]
    fn test_rejected_record_is_kept_and_new_draft_created() {
        let f = fixture();
        let record = f.service.compute_payroll("off_001", april()).unwrap();
        f.service.submit_for_review(record.id, "clerk_01").unwrap();
        f.service
            .reject(record.id, "rev_01", "Absence on the 15th was approved leave")
            .unwrap();

        let fresh = f.service.compute_payroll("off_001", april()).unwrap();
        assert_ne!(fresh.id, record.id);
        assert_eq!(
            f.service.get_record(record.id).unwrap().status,
            PayrollStatus::Rejected
        );
    }

    #[test]
    fn test_missing_attendance_day_fails() {
        let f = fixture();
        let mut entries = reference_entries();
        entries.retain(|e| e.date != day(20));
        f.attendance.record("off_001", april(), entries);

        let err = f.service.compute_payroll("off_001", april()).unwrap_err();
        match err {
            EngineError::IncompleteAttendance { missing_dates, .. } => {
                assert_eq!(missing_dates, vec![day(20)]);
            }
            other => panic!("expected IncompleteAttendance, got {other:?}"),
        }
    }

    #[test]
    fn test_approved_leave_fills_missing_days() {
        let f = fixture();
        let mut entries = reference_entries();
        entries.retain(|e| e.date != day(21) && e.date != day(22));
        f.attendance.record("off_001", april(), entries);

        let application = f
            .leave_service
            .submit_leave(LeaveRequest {
                officer_id: "off_001".to_string(),
                start_date: day(21),
                end_date: day(22),
                leave_type: LeaveType::Earned,
                reason: "Family wedding".to_string(),
            })
            .unwrap();
        f.leave_service
            .approve_leave(application.id, "rev_01", None)
            .unwrap();

        let record = f.service.compute_payroll("off_001", april()).unwrap();
        assert_eq!(record.attendance.leave_days, 3);
        assert_eq!(record.attendance.present_days, 26);
    }

    #[test]
    fn test_unauthorized_approver_is_refused() {
        let f = fixture();
        let record = f.service.compute_payroll("off_001", april()).unwrap();
        f.service.submit_for_review(record.id, "clerk_01").unwrap();

        let err = f.service.approve(record.id, "clerk_01", None).unwrap_err();
        assert!(matches!(err, EngineError::PermissionDenied { .. }));
        assert_eq!(
            f.service.get_record(record.id).unwrap().status,
            PayrollStatus::Pending
        );
    }

    #[test]
    fn test_each_transition_notifies_once() {
        let f = fixture();
        let record = f.service.compute_payroll("off_001", april()).unwrap();
        f.service.submit_for_review(record.id, "clerk_01").unwrap();
        f.service.approve(record.id, "rev_01", None).unwrap();
        // A refused transition does not notify.
        let _ = f.service.approve(record.id, "rev_01", None);

        let sent = f.sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].from, "pending");
        assert_eq!(sent[1].to, "approved");
        assert_eq!(sent[1].recipients, vec!["payroll@example.org"]);
    }

    #[test]
    fn test_bulk_isolates_failures() {
        let f = fixture();
        f.officers.add(
            officer("off_002", 18000),
            StatutoryProfile::new(true, true, true).with_jurisdiction("maharashtra"),
            None,
        );
        // off_002 has no attendance on file and must fail alone.
        let summary = f.service.bulk_generate_payslips(april()).unwrap();

        assert_eq!(summary.generated, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failed_officer_ids, vec!["off_002"]);
        assert_eq!(f.payslips.len(), 1);
    }

    #[test]
    fn test_bulk_is_idempotent_for_unchanged_records() {
        let f = fixture();
        f.service.bulk_generate_payslips(april()).unwrap();
        f.service.bulk_generate_payslips(april()).unwrap();
        assert_eq!(f.payslips.len(), 1);
    }

    #[test]
    fn test_payslip_delivery_outcome() {
        let f = fixture();
        let payslip = f.service.generate_payslip("off_001", april()).unwrap();
        assert_eq!(payslip.delivery.recipient.as_deref(), Some("off_001@example.org"));
        assert!(!payslip.document.is_empty());

        let sent = f
            .service
            .record_payslip_delivery(payslip.id, DeliveryStatus::Sent)
            .unwrap();
        assert_eq!(sent.delivery.status, DeliveryStatus::Sent);
        assert!(f
            .service
            .record_payslip_delivery(payslip.id, DeliveryStatus::Failed)
            .is_err());
    }
}
