//! Payroll assembly.
//!
//! Runs the calculators in order over one officer's month and assembles the
//! itemized [`PayrollRecord`]. Assembly is pure: the caller supplies every
//! input, including the timestamp stamped on the record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    annualize, calculate_income_tax_withholding, calculate_overtime, calculate_professional_tax,
    calculate_provident_fund, calculate_state_insurance, prorate_components,
    resolve_salary_structure,
};
use crate::config::StatutoryConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, ComponentType, Deduction, DeductionType, MonthlyAttendanceTotals,
    OfficerProfile, PayrollRecord, PayrollStatus, PayrollTotals, SalaryComponent,
    SalaryStructure, StatutoryProfile,
};

/// Warning code raised when deductions exceed gross salary.
pub const NEGATIVE_NET_PAY: &str = "NEGATIVE_NET_PAY";

/// Everything needed to assemble one officer's payroll for one month.
#[derive(Debug, Clone)]
pub struct PayrollInputs<'a> {
    /// The officer being paid.
    pub officer: &'a OfficerProfile,
    /// The officer's explicit structure, if any.
    pub structure: Option<&'a SalaryStructure>,
    /// The officer's statutory flags.
    pub profile: &'a StatutoryProfile,
    /// Aggregated attendance for the month.
    pub attendance: &'a MonthlyAttendanceTotals,
    /// The aggregation step, prepended to the trace when present.
    pub attendance_step: Option<AuditStep>,
    /// Overtime hours for the month.
    pub overtime_hours: Decimal,
    /// Loan repayment due this month.
    pub loan_deduction: Decimal,
    /// Salary advance recovery due this month.
    pub advance_deduction: Decimal,
}

/// Assembles a draft payroll record.
///
/// The steps run in this order, each appending to the audit trace:
/// structure resolution, proration, overtime, provident fund, state
/// insurance, professional tax and income tax. Provident fund is computed on
/// prorated basic plus DA; the other statutory calculators use gross salary
/// including overtime. Employee shares, professional tax and income tax
/// become statutory deductions when non-zero. Loan and advance amounts
/// become fixed deductions when non-zero.
///
/// # Returns
///
/// A `Validation` error if overtime hours, the loan amount or the advance
/// amount is negative, or if the salary structure does not resolve.
pub fn assemble_payroll(
    inputs: PayrollInputs<'_>,
    config: &StatutoryConfig,
    created_at: DateTime<Utc>,
) -> EngineResult<PayrollRecord> {
    if inputs.overtime_hours < Decimal::ZERO {
        return Err(EngineError::validation(
            "overtime_hours",
            "overtime hours cannot be negative",
        ));
    }
    if inputs.loan_deduction < Decimal::ZERO {
        return Err(EngineError::validation(
            "loan_deduction",
            "loan deduction cannot be negative",
        ));
    }
    if inputs.advance_deduction < Decimal::ZERO {
        return Err(EngineError::validation(
            "advance_deduction",
            "advance deduction cannot be negative",
        ));
    }

    let officer = inputs.officer;
    let profile = inputs.profile;
    let mut audit_trace: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    if let Some(mut step) = inputs.attendance_step {
        step.step_number = step_number;
        audit_trace.push(step);
        step_number += 1;
    }

    let structure = resolve_salary_structure(
        inputs.structure,
        officer.monthly_salary,
        &config.salary_split,
        step_number,
    )?;
    audit_trace.push(structure.audit_step);
    step_number += 1;

    let proration = prorate_components(&structure.components, inputs.attendance, step_number);
    audit_trace.push(proration.audit_step);
    step_number += 1;
    let mut components = proration.components;

    let basic = component_amount(&components, ComponentType::BasicPay);
    let da = component_amount(&components, ComponentType::Da);

    let overtime = calculate_overtime(inputs.overtime_hours, basic, &config.overtime, step_number);
    audit_trace.push(overtime.audit_step);
    step_number += 1;
    if let Some(component) = overtime.component {
        components.push(component);
    }

    let gross: Decimal = components.iter().map(|c| c.amount).sum();

    let pf = calculate_provident_fund(
        basic,
        da,
        profile.pf_applicable,
        &config.provident_fund,
        step_number,
    );
    audit_trace.push(pf.audit_step);
    step_number += 1;

    let esi = calculate_state_insurance(
        gross,
        profile.esi_applicable,
        &config.state_insurance,
        step_number,
    );
    audit_trace.push(esi.audit_step);
    step_number += 1;

    let pt = calculate_professional_tax(
        gross,
        profile.pt_applicable,
        profile.pt_jurisdiction.as_deref(),
        &config.professional_tax,
        step_number,
    );
    audit_trace.push(pt.audit_step);
    step_number += 1;
    if let Some(warning) = pt.warning {
        warnings.push(warning);
    }

    let tds = if profile.tds_applicable {
        let result = calculate_income_tax_withholding(
            annualize(gross, &config.income_tax),
            &config.income_tax,
            step_number,
        );
        audit_trace.push(result.audit_step);
        result.monthly_withholding
    } else {
        audit_trace.push(AuditStep {
            step_number,
            rule_id: "income_tax_withholding".to_string(),
            rule_name: "Income Tax Withholding".to_string(),
            statute_ref: config.income_tax.statute_ref.clone(),
            input: serde_json::json!({"tds_applicable": false}),
            output: serde_json::json!({"monthly_withholding": "0"}),
            reasoning: "Income tax withholding not applicable to officer".to_string(),
        });
        Decimal::ZERO
    };

    let statutory = [
        (DeductionType::Pf, pf.employee, "Provident fund, employee share"),
        (DeductionType::Esi, esi.employee, "State insurance, employee share"),
        (DeductionType::ProfessionalTax, pt.amount, "Professional tax"),
        (DeductionType::Tds, tds, "Income tax withheld at source"),
    ];
    let mut deductions: Vec<Deduction> = statutory
        .into_iter()
        .filter(|(_, amount, _)| *amount > Decimal::ZERO)
        .map(|(kind, amount, notes)| Deduction::statutory(kind, amount, notes))
        .collect();
    for (kind, amount) in [
        (DeductionType::Loan, inputs.loan_deduction),
        (DeductionType::Advance, inputs.advance_deduction),
    ] {
        if amount > Decimal::ZERO {
            deductions.push(Deduction::fixed(kind, amount));
        }
    }

    let totals = PayrollTotals::from_lines(&components, &deductions);
    if totals.net_pay < Decimal::ZERO {
        warn!(
            officer_id = %officer.officer_id,
            month = %inputs.attendance.month,
            net_pay = %totals.net_pay,
            "Deductions exceed gross salary"
        );
        warnings.push(AuditWarning {
            code: NEGATIVE_NET_PAY.to_string(),
            message: format!(
                "Deductions {} exceed gross salary {}",
                totals.total_deductions.normalize(),
                totals.gross_salary.normalize()
            ),
            severity: "high".to_string(),
        });
    }

    debug!(
        officer_id = %officer.officer_id,
        month = %inputs.attendance.month,
        gross = %totals.gross_salary,
        net = %totals.net_pay,
        steps = audit_trace.len(),
        "Payroll assembled"
    );

    Ok(PayrollRecord {
        id: Uuid::new_v4(),
        officer_id: officer.officer_id.clone(),
        officer_name: officer.officer_name.clone(),
        employee_id: officer.employee_id.clone(),
        designation: officer.designation.clone(),
        institution_id: officer.institution_id.clone(),
        month: inputs.attendance.month,
        attendance: inputs.attendance.clone(),
        overtime_hours: inputs.overtime_hours,
        salary_components: components,
        total_earnings: totals.total_earnings,
        deductions,
        total_deductions: totals.total_deductions,
        gross_salary: totals.gross_salary,
        net_pay: totals.net_pay,
        pf_employee: pf.employee,
        pf_employer: pf.employer,
        esi_employee: esi.employee,
        esi_employer: esi.employer,
        tds,
        professional_tax: pt.amount,
        status: PayrollStatus::Draft,
        created_at,
        submitted_at: None,
        approved_by: None,
        approved_date: None,
        reviewer_comments: None,
        rejection_reason: None,
        forwarded_by: None,
        forwarded_at: None,
        paid_date: None,
        payment_mode: None,
        payment_reference: None,
        notes: None,
        audit_trace,
        warnings,
        history: Vec::new(),
    })
}

fn component_amount(components: &[SalaryComponent], component_type: ComponentType) -> Decimal {
    components
        .iter()
        .filter(|c| c.component_type == component_type)
        .map(|c| c.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalculationType, PayrollMonth, PercentageBase};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn officer(monthly: &str) -> OfficerProfile {
        OfficerProfile {
            officer_id: "off_001".to_string(),
            officer_name: "A. Rao".to_string(),
            employee_id: Some("EMP-001".to_string()),
            designation: Some("Field Officer".to_string()),
            institution_id: Some("inst_01".to_string()),
            email: None,
            monthly_salary: dec(monthly),
            active: true,
        }
    }

    fn attendance(present: u32, absent: u32, leave: u32) -> MonthlyAttendanceTotals {
        MonthlyAttendanceTotals {
            officer_id: "off_001".to_string(),
            month: PayrollMonth::new(2025, 4).unwrap(),
            present_days: present,
            absent_days: absent,
            leave_days: leave,
            total_hours_worked: Decimal::ZERO,
        }
    }

    fn maharashtra() -> StatutoryProfile {
        StatutoryProfile::new(true, true, true).with_jurisdiction("maharashtra")
    }

    fn inputs<'a>(
        officer: &'a OfficerProfile,
        profile: &'a StatutoryProfile,
        attendance: &'a MonthlyAttendanceTotals,
    ) -> PayrollInputs<'a> {
        PayrollInputs {
            officer,
            structure: None,
            profile,
            attendance,
            attendance_step: None,
            overtime_hours: Decimal::ZERO,
            loan_deduction: Decimal::ZERO,
            advance_deduction: Decimal::ZERO,
        }
    }

    fn assemble(inputs: PayrollInputs<'_>) -> PayrollRecord {
        assemble_payroll(inputs, &StatutoryConfig::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_reference_month_with_tds() {
        let officer = officer("30000");
        let profile = maharashtra();
        let attendance = attendance(28, 1, 1);
        let record = assemble(inputs(&officer, &profile, &attendance));

        let amounts: Vec<Decimal> = record.salary_components.iter().map(|c| c.amount).collect();
        assert_eq!(
            amounts,
            vec![dec("11600"), dec("5800"), dec("2900"), dec("1450"), dec("5800"), dec("1450")]
        );
        assert_eq!(record.gross_salary, dec("29000"));
        assert_eq!(record.pf_employee, dec("1740"));
        assert_eq!(record.pf_employer, dec("1740"));
        assert_eq!(record.esi_employee, Decimal::ZERO);
        assert_eq!(record.professional_tax, dec("200"));
        assert_eq!(record.tds, dec("408"));
        assert_eq!(record.total_deductions, dec("2348"));
        assert_eq!(record.net_pay, dec("26652"));
        assert_eq!(record.status, PayrollStatus::Draft);
        assert!(record.totals_are_consistent());
    }

    #[test]
    fn test_reference_month_without_tds() {
        let officer = officer("30000");
        let mut profile = maharashtra();
        profile.tds_applicable = false;
        let attendance = attendance(28, 1, 1);
        let record = assemble(inputs(&officer, &profile, &attendance));

        assert_eq!(record.tds, Decimal::ZERO);
        assert_eq!(record.deduction_amount(DeductionType::Tds), Decimal::ZERO);
        assert_eq!(record.net_pay, dec("27060"));
    }

    #[test]
    fn test_employer_shares_are_not_deductions() {
        let officer = officer("15000");
        let profile = maharashtra();
        let attendance = attendance(30, 0, 0);
        let record = assemble(inputs(&officer, &profile, &attendance));

        // gross 15000 <= 21000, so ESI applies: 112.5 -> 113 and 487.5 -> 488
        assert_eq!(record.esi_employee, dec("113"));
        assert_eq!(record.esi_employer, dec("488"));
        let deducted: Decimal = record.deductions.iter().map(|d| d.amount).sum();
        assert_eq!(
            deducted,
            record.pf_employee + record.esi_employee + record.professional_tax + record.tds
        );
    }

    #[test]
    fn test_zero_amounts_are_not_listed() {
        let officer = officer("30000");
        let profile = StatutoryProfile::new(false, false, false);
        let attendance = attendance(30, 0, 0);
        let mut inputs = inputs(&officer, &profile, &attendance);
        inputs.loan_deduction = Decimal::ZERO;
        let record = assemble(inputs);

        // Only TDS remains: 360000 annual -> 5500 / 12 = 458.33
        assert_eq!(record.deductions.len(), 1);
        assert_eq!(record.deductions[0].deduction_type, DeductionType::Tds);
        assert_eq!(record.deductions[0].amount, dec("458"));
    }

    #[test]
    fn test_loan_and_advance_are_fixed_deductions() {
        let officer = officer("30000");
        let profile = maharashtra();
        let attendance = attendance(30, 0, 0);
        let mut inputs = inputs(&officer, &profile, &attendance);
        inputs.loan_deduction = dec("1500");
        inputs.advance_deduction = dec("500");
        let record = assemble(inputs);

        let loan = record
            .deductions
            .iter()
            .find(|d| d.deduction_type == DeductionType::Loan)
            .unwrap();
        assert_eq!(loan.calculation_type, CalculationType::Fixed);
        assert_eq!(loan.amount, dec("1500"));
        assert_eq!(record.deduction_amount(DeductionType::Advance), dec("500"));
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let officer = officer("30000");
        let profile = maharashtra();
        let attendance = attendance(30, 0, 0);

        let mut bad = inputs(&officer, &profile, &attendance);
        bad.loan_deduction = dec("-1");
        let err = assemble_payroll(bad, &StatutoryConfig::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "loan_deduction"));

        let mut bad = inputs(&officer, &profile, &attendance);
        bad.overtime_hours = dec("-2");
        let err = assemble_payroll(bad, &StatutoryConfig::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "overtime_hours"));
    }

    #[test]
    fn test_overtime_component_feeds_gross() {
        let officer = officer("30000");
        let profile = maharashtra();
        let attendance = attendance(30, 0, 0);
        let mut inputs = inputs(&officer, &profile, &attendance);
        inputs.overtime_hours = dec("5");
        let record = assemble(inputs);

        // 12000 / 208 x 2 x 5 = 576.92 -> 577
        let overtime = record.salary_components.last().unwrap();
        assert_eq!(overtime.component_type, ComponentType::Overtime);
        assert_eq!(overtime.amount, dec("577"));
        assert_eq!(record.gross_salary, dec("30577"));
    }

    #[test]
    fn test_negative_net_pay_is_kept_and_flagged() {
        let officer = officer("10000");
        let profile = maharashtra();
        let attendance = attendance(30, 0, 0);
        let mut inputs = inputs(&officer, &profile, &attendance);
        inputs.loan_deduction = dec("20000");
        let record = assemble(inputs);

        assert!(record.net_pay < Decimal::ZERO);
        assert!(record.has_warning(NEGATIVE_NET_PAY));
        assert!(record.totals_are_consistent());
    }

    #[test]
    fn test_unknown_jurisdiction_warning_reaches_record() {
        let officer = officer("30000");
        let profile = StatutoryProfile::new(true, true, true).with_jurisdiction("atlantis");
        let attendance = attendance(30, 0, 0);
        let record = assemble(inputs(&officer, &profile, &attendance));

        assert_eq!(record.professional_tax, Decimal::ZERO);
        assert!(record.has_warning("UNKNOWN_PT_JURISDICTION"));
    }

    #[test]
    fn test_explicit_structure_is_used() {
        let officer = officer("99999");
        let profile = maharashtra();
        let attendance = attendance(30, 0, 0);
        let structure = SalaryStructure {
            monthly_salary: dec("20000"),
            components: vec![
                SalaryComponent::fixed(ComponentType::BasicPay, dec("10000")),
                SalaryComponent {
                    component_type: ComponentType::Hra,
                    amount: Decimal::ZERO,
                    is_taxable: true,
                    calculation_type: CalculationType::Percentage,
                    percentage_of: Some(PercentageBase::BasicPay),
                    percentage: Some(dec("50")),
                },
            ],
        };
        let mut inputs = inputs(&officer, &profile, &attendance);
        inputs.structure = Some(&structure);
        let record = assemble(inputs);

        assert_eq!(record.gross_salary, dec("15000"));
        assert_eq!(record.pf_employee, dec("1200"));
    }

    #[test]
    fn test_audit_steps_are_sequential() {
        let officer = officer("30000");
        let profile = maharashtra();
        let attendance = attendance(28, 1, 1);
        let mut inputs = inputs(&officer, &profile, &attendance);
        inputs.attendance_step = Some(AuditStep {
            step_number: 99,
            rule_id: "attendance_aggregation".to_string(),
            rule_name: "Attendance Aggregation".to_string(),
            statute_ref: "Attendance policy".to_string(),
            input: serde_json::json!({}),
            output: serde_json::json!({}),
            reasoning: "30 entries".to_string(),
        });
        let record = assemble(inputs);

        for (index, step) in record.audit_trace.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
        assert_eq!(record.audit_trace[0].rule_id, "attendance_aggregation");
        assert_eq!(record.audit_trace.last().unwrap().rule_id, "income_tax_withholding");
    }

    proptest! {
        #[test]
        fn prop_recompute_is_identical(
            monthly in 0i64..200_000,
            present in 0u32..31,
            absent in 0u32..5,
            overtime in 0i64..40,
        ) {
            let officer = officer(&monthly.to_string());
            let profile = maharashtra();
            let attendance = attendance(present, absent, 0);
            let mut first_inputs = inputs(&officer, &profile, &attendance);
            first_inputs.overtime_hours = Decimal::from(overtime);
            let second_inputs = first_inputs.clone();

            let first = assemble(first_inputs);
            let second = assemble(second_inputs);

            prop_assert_eq!(&first.salary_components, &second.salary_components);
            prop_assert_eq!(&first.deductions, &second.deductions);
            prop_assert_eq!(first.gross_salary, second.gross_salary);
            prop_assert_eq!(first.net_pay, second.net_pay);
            prop_assert!(first.totals_are_consistent());
        }
    }
}
