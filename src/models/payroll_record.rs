//! Payroll record models for the Payroll Engine.
//!
//! This module contains the [`PayrollRecord`] type and its associated
//! structures that capture a fully itemized monthly pay computation,
//! including earnings, deductions, statutory break-outs, the audit trace
//! of every rule applied, and the workflow history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Deduction, DeductionType, MonthlyAttendanceTotals, PayrollMonth, SalaryComponent};

/// Workflow status of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Computed, not yet submitted.
    Draft,
    /// Submitted for review.
    Pending,
    /// Approved by a reviewer.
    Approved,
    /// Rejected by a reviewer. Terminal.
    Rejected,
    /// Handed off to disbursement.
    Forwarded,
    /// Paid. Terminal.
    Paid,
}

impl PayrollStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayrollStatus::Draft => "draft",
            PayrollStatus::Pending => "pending",
            PayrollStatus::Approved => "approved",
            PayrollStatus::Rejected => "rejected",
            PayrollStatus::Forwarded => "forwarded",
            PayrollStatus::Paid => "paid",
        }
    }

    /// Returns true for states no transition leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayrollStatus::Rejected | PayrollStatus::Paid)
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "provident_fund".to_string(),
///     rule_name: "Provident Fund".to_string(),
///     statute_ref: "EPF Act 1952".to_string(),
///     input: serde_json::json!({"basic_pay": "11600", "da": "2900"}),
///     output: serde_json::json!({"employee": "1740", "employer": "1740"}),
///     reasoning: "min(14500, 15000) x 0.12 = 1740".to_string(),
/// };
/// assert_eq!(step.step_number, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the statute or policy behind this rule.
    pub statute_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag business conditions that do not stop a computation but
/// need attention upstream, such as a negative net pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// One accepted workflow transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Status before the transition.
    pub from: String,
    /// Status after the transition.
    pub to: String,
    /// Who performed the transition.
    pub actor: String,
    /// When the transition was accepted.
    pub at: DateTime<Utc>,
    /// Comments, reason or payment reference attached to the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Recomputed totals of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Sum of all salary components.
    pub total_earnings: Decimal,
    /// Equal to total earnings.
    pub gross_salary: Decimal,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Gross salary minus total deductions. May be negative.
    pub net_pay: Decimal,
}

impl PayrollTotals {
    /// Derives totals from line items.
    pub fn from_lines(components: &[SalaryComponent], deductions: &[Deduction]) -> Self {
        let total_earnings: Decimal = components.iter().map(|c| c.amount).sum();
        let total_deductions: Decimal = deductions.iter().map(|d| d.amount).sum();
        Self {
            total_earnings,
            gross_salary: total_earnings,
            total_deductions,
            net_pay: total_earnings - total_deductions,
        }
    }
}

/// One officer's payroll for one month.
///
/// Created by the payroll assembler in `draft`, then moved only by the
/// approval workflow. Records are never deleted; a rejected record stays on
/// file and corrections produce a new draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for this record.
    pub id: Uuid,
    /// The officer paid.
    pub officer_id: String,
    /// Officer display name at computation time.
    pub officer_name: String,
    /// Staff number.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Job title.
    #[serde(default)]
    pub designation: Option<String>,
    /// Institution.
    #[serde(default)]
    pub institution_id: Option<String>,
    /// The month paid.
    pub month: PayrollMonth,
    /// Attendance totals the pay was prorated against.
    pub attendance: MonthlyAttendanceTotals,
    /// Overtime hours reported for the month.
    pub overtime_hours: Decimal,
    /// Earnings lines.
    pub salary_components: Vec<SalaryComponent>,
    /// Sum of earnings lines.
    pub total_earnings: Decimal,
    /// Deduction lines.
    pub deductions: Vec<Deduction>,
    /// Sum of deduction lines.
    pub total_deductions: Decimal,
    /// Equal to total earnings.
    pub gross_salary: Decimal,
    /// Gross salary minus total deductions.
    pub net_pay: Decimal,
    /// Provident fund, employee share.
    pub pf_employee: Decimal,
    /// Provident fund, employer share (not deducted from pay).
    pub pf_employer: Decimal,
    /// State insurance, employee share.
    pub esi_employee: Decimal,
    /// State insurance, employer share (not deducted from pay).
    pub esi_employer: Decimal,
    /// Income tax withheld.
    pub tds: Decimal,
    /// Professional tax.
    pub professional_tax: Decimal,
    /// Workflow status.
    pub status: PayrollStatus,
    /// When the record was computed.
    pub created_at: DateTime<Utc>,
    /// When the record was submitted for review.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Reviewer who approved or rejected the record.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// When the record was approved or rejected.
    #[serde(default)]
    pub approved_date: Option<DateTime<Utc>>,
    /// Reviewer comments on approval.
    #[serde(default)]
    pub reviewer_comments: Option<String>,
    /// Reason given on rejection.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Who forwarded the record to disbursement.
    #[serde(default)]
    pub forwarded_by: Option<String>,
    /// When the record was forwarded.
    #[serde(default)]
    pub forwarded_at: Option<DateTime<Utc>>,
    /// When the record was paid.
    #[serde(default)]
    pub paid_date: Option<DateTime<Utc>>,
    /// Payment channel (e.g. "bank_transfer").
    #[serde(default)]
    pub payment_mode: Option<String>,
    /// Bank or cheque reference.
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Every rule applied during computation, in order.
    pub audit_trace: Vec<AuditStep>,
    /// Conditions flagged during computation.
    pub warnings: Vec<AuditWarning>,
    /// Every accepted workflow transition, in order.
    pub history: Vec<WorkflowEvent>,
}

impl PayrollRecord {
    /// Recomputes totals from the component and deduction lines.
    pub fn recompute_totals(&self) -> PayrollTotals {
        PayrollTotals::from_lines(&self.salary_components, &self.deductions)
    }

    /// Returns true if the stored totals match the line items.
    pub fn totals_are_consistent(&self) -> bool {
        let totals = self.recompute_totals();
        totals.total_earnings == self.total_earnings
            && totals.gross_salary == self.gross_salary
            && totals.total_deductions == self.total_deductions
            && totals.net_pay == self.net_pay
    }

    /// Amount of the first deduction of the given type, or zero.
    pub fn deduction_amount(&self, deduction_type: DeductionType) -> Decimal {
        self.deductions
            .iter()
            .filter(|d| d.deduction_type == deduction_type)
            .map(|d| d.amount)
            .sum()
    }

    /// Returns true if a warning with the given code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}
