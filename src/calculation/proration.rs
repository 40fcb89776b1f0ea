//! Attendance-based proration of salary components.

use rust_decimal::Decimal;

use super::round_currency;
use crate::models::{AuditStep, MonthlyAttendanceTotals, SalaryComponent};

/// The result of prorating components against attendance.
#[derive(Debug, Clone)]
pub struct ProrationResult {
    /// Prorated components, each rounded to whole currency units.
    pub components: Vec<SalaryComponent>,
    /// Present plus leave days.
    pub paid_days: u32,
    /// Present plus absent plus leave days.
    pub total_days: u32,
    /// The audit step recording this proration.
    pub audit_step: AuditStep,
}

/// Scales each component by `paid_days / total_days`.
///
/// Each component is rounded individually after proration, so the prorated
/// total may differ from rounding the unprorated total once by up to one
/// unit per component. A month with `total_days == 0` yields zero for every
/// component.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::prorate_components;
/// use payroll_engine::models::{ComponentType, MonthlyAttendanceTotals, PayrollMonth, SalaryComponent};
/// use rust_decimal::Decimal;
///
/// let totals = MonthlyAttendanceTotals {
///     officer_id: "off_001".to_string(),
///     month: PayrollMonth::new(2025, 3).unwrap(),
///     present_days: 28,
///     absent_days: 1,
///     leave_days: 1,
///     total_hours_worked: Decimal::ZERO,
/// };
/// let basic = SalaryComponent::fixed(ComponentType::BasicPay, Decimal::from(12000));
///
/// let result = prorate_components(&[basic], &totals, 2);
/// assert_eq!(result.components[0].amount, Decimal::from(11600));
/// ```
pub fn prorate_components(
    components: &[SalaryComponent],
    attendance: &MonthlyAttendanceTotals,
    step_number: u32,
) -> ProrationResult {
    let paid_days = attendance.paid_days();
    let total_days = attendance.total_days();

    let prorated: Vec<SalaryComponent> = components
        .iter()
        .map(|component| SalaryComponent {
            amount: prorate_amount(component.amount, paid_days, total_days),
            ..component.clone()
        })
        .collect();

    let before: Decimal = components.iter().map(|c| c.amount).sum();
    let after: Decimal = prorated.iter().map(|c| c.amount).sum();

    let reasoning = if total_days == 0 {
        "No attendance days in period; all components prorated to 0".to_string()
    } else {
        format!(
            "{} x {}/{} per component, rounded individually = {}",
            before.normalize(),
            paid_days,
            total_days,
            after.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "proration".to_string(),
        rule_name: "Attendance Proration".to_string(),
        statute_ref: "salary policy".to_string(),
        input: serde_json::json!({
            "unprorated_total": before.normalize().to_string(),
            "paid_days": paid_days,
            "total_days": total_days
        }),
        output: serde_json::json!({
            "prorated_total": after.normalize().to_string()
        }),
        reasoning,
    };

    ProrationResult {
        components: prorated,
        paid_days,
        total_days,
        audit_step,
    }
}

fn prorate_amount(amount: Decimal, paid_days: u32, total_days: u32) -> Decimal {
    if total_days == 0 {
        return Decimal::ZERO;
    }
    round_currency(amount * Decimal::from(paid_days) / Decimal::from(total_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComponentType, PayrollMonth};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn attendance(present: u32, absent: u32, leave: u32) -> MonthlyAttendanceTotals {
        MonthlyAttendanceTotals {
            officer_id: "off_001".to_string(),
            month: PayrollMonth::new(2025, 3).unwrap(),
            present_days: present,
            absent_days: absent,
            leave_days: leave,
            total_hours_worked: Decimal::ZERO,
        }
    }

    fn components(amounts: &[&str]) -> Vec<SalaryComponent> {
        amounts
            .iter()
            .map(|a| SalaryComponent::fixed(ComponentType::SpecialAllowance, dec(a)))
            .collect()
    }

    #[test]
    fn test_reference_split_prorated_over_29_of_30_days() {
        let input = components(&["12000", "6000", "3000", "1500", "6000", "1500"]);
        let result = prorate_components(&input, &attendance(28, 1, 1), 2);

        let amounts: Vec<Decimal> = result.components.iter().map(|c| c.amount).collect();
        assert_eq!(
            amounts,
            vec![
                dec("11600"),
                dec("5800"),
                dec("2900"),
                dec("1450"),
                dec("5800"),
                dec("1450")
            ]
        );
        assert_eq!(result.paid_days, 29);
        assert_eq!(result.total_days, 30);
        assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec("29000"));
    }

    #[test]
    fn test_each_component_rounded_individually() {
        // 3 x round(100 x 2/3) = 3 x 67 = 201, whereas round(300 x 2/3) = 200.
        let input = components(&["100", "100", "100"]);
        let result = prorate_components(&input, &attendance(2, 1, 0), 1);

        for component in &result.components {
            assert_eq!(component.amount, dec("67"));
        }
        let total: Decimal = result.components.iter().map(|c| c.amount).sum();
        assert_eq!(total, dec("201"));
    }

    #[test]
    fn test_zero_day_month_yields_zero_pay() {
        let input = components(&["12000", "6000"]);
        let result = prorate_components(&input, &attendance(0, 0, 0), 1);

        assert!(result.components.iter().all(|c| c.amount == Decimal::ZERO));
        assert!(result.audit_step.reasoning.contains("No attendance days"));
    }

    #[test]
    fn test_leave_is_paid_absence_is_not() {
        let input = components(&["3000"]);
        let all_leave = prorate_components(&input, &attendance(0, 0, 30), 1);
        let all_absent = prorate_components(&input, &attendance(0, 30, 0), 1);

        assert_eq!(all_leave.components[0].amount, dec("3000"));
        assert_eq!(all_absent.components[0].amount, Decimal::ZERO);
    }

    #[test]
    fn test_component_metadata_preserved() {
        let mut input = components(&["1000"]);
        input[0].is_taxable = false;
        let result = prorate_components(&input, &attendance(30, 0, 0), 1);

        assert!(!result.components[0].is_taxable);
        assert_eq!(result.components[0].component_type, ComponentType::SpecialAllowance);
    }
}
