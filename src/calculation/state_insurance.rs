//! State insurance contribution calculation.

use rust_decimal::Decimal;

use super::round_currency;
use crate::config::StateInsuranceConfig;
use crate::models::AuditStep;

/// The result of a state insurance calculation.
#[derive(Debug, Clone)]
pub struct StateInsuranceResult {
    /// Employee contribution, deducted from pay.
    pub employee: Decimal,
    /// Employer contribution, not deducted from pay.
    pub employer: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates state insurance contributions on gross salary.
///
/// Contributions are zero when the officer is not covered, and also when
/// `gross_salary` exceeds the wage threshold, whatever the applicability
/// flag says. At or below the threshold the employee pays
/// `round(gross × 0.0075)` and the employer `round(gross × 0.0325)` under
/// the reference configuration.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_state_insurance;
/// use payroll_engine::config::StatutoryConfig;
/// use rust_decimal::Decimal;
///
/// let config = StatutoryConfig::default();
/// let over = calculate_state_insurance(Decimal::from(21001), true, &config.state_insurance, 5);
/// assert_eq!(over.employee, Decimal::ZERO);
/// assert_eq!(over.employer, Decimal::ZERO);
/// ```
pub fn calculate_state_insurance(
    gross_salary: Decimal,
    esi_applicable: bool,
    config: &StateInsuranceConfig,
    step_number: u32,
) -> StateInsuranceResult {
    let input = serde_json::json!({
        "gross_salary": gross_salary.normalize().to_string(),
        "esi_applicable": esi_applicable,
        "wage_threshold": config.wage_threshold.normalize().to_string()
    });

    let exempt_reason = if !esi_applicable {
        Some("State insurance not applicable to officer".to_string())
    } else if gross_salary > config.wage_threshold {
        Some(format!(
            "Gross {} exceeds threshold {}; no contribution due",
            gross_salary.normalize(),
            config.wage_threshold.normalize()
        ))
    } else {
        None
    };

    if let Some(reasoning) = exempt_reason {
        return StateInsuranceResult {
            employee: Decimal::ZERO,
            employer: Decimal::ZERO,
            audit_step: AuditStep {
                step_number,
                rule_id: "state_insurance".to_string(),
                rule_name: "State Insurance".to_string(),
                statute_ref: config.statute_ref.clone(),
                input,
                output: serde_json::json!({"employee": "0", "employer": "0"}),
                reasoning,
            },
        };
    }

    let employee = round_currency(gross_salary * config.employee_rate);
    let employer = round_currency(gross_salary * config.employer_rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "state_insurance".to_string(),
        rule_name: "State Insurance".to_string(),
        statute_ref: config.statute_ref.clone(),
        input,
        output: serde_json::json!({
            "employee": employee.normalize().to_string(),
            "employer": employer.normalize().to_string()
        }),
        reasoning: format!(
            "{} x {} = {} (employee); {} x {} = {} (employer)",
            gross_salary.normalize(),
            config.employee_rate.normalize(),
            employee.normalize(),
            gross_salary.normalize(),
            config.employer_rate.normalize(),
            employer.normalize()
        ),
    };

    StateInsuranceResult {
        employee,
        employer,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatutoryConfig;
    use proptest::prelude::*;

    fn config() -> StateInsuranceConfig {
        StatutoryConfig::default().state_insurance
    }

    #[test]
    fn test_at_threshold_is_charged() {
        // 21000 x 0.0075 = 157.5 -> 158; 21000 x 0.0325 = 682.5 -> 683
        let result = calculate_state_insurance(Decimal::from(21000), true, &config(), 1);
        assert_eq!(result.employee, Decimal::from(158));
        assert_eq!(result.employer, Decimal::from(683));
    }

    #[test]
    fn test_one_above_threshold_is_exempt() {
        let result = calculate_state_insurance(Decimal::from(21001), true, &config(), 1);
        assert_eq!(result.employee, Decimal::ZERO);
        assert_eq!(result.employer, Decimal::ZERO);
        assert!(result.audit_step.reasoning.contains("exceeds threshold"));
    }

    #[test]
    fn test_not_applicable_is_zero_below_threshold() {
        let result = calculate_state_insurance(Decimal::from(12000), false, &config(), 1);
        assert_eq!(result.employee, Decimal::ZERO);
        assert_eq!(result.employer, Decimal::ZERO);
    }

    #[test]
    fn test_low_wage_contribution() {
        // 12000 x 0.0075 = 90; 12000 x 0.0325 = 390
        let result = calculate_state_insurance(Decimal::from(12000), true, &config(), 1);
        assert_eq!(result.employee, Decimal::from(90));
        assert_eq!(result.employer, Decimal::from(390));
    }

    proptest! {
        #[test]
        fn prop_above_threshold_always_exempt(gross in 21_001i64..1_000_000, applicable: bool) {
            let result = calculate_state_insurance(Decimal::from(gross), applicable, &config(), 1);
            prop_assert_eq!(result.employee, Decimal::ZERO);
            prop_assert_eq!(result.employer, Decimal::ZERO);
        }

        #[test]
        fn prop_at_or_below_threshold_employer_pays_more(gross in 1_000i64..=21_000) {
            let result = calculate_state_insurance(Decimal::from(gross), true, &config(), 1);
            prop_assert!(result.employer > result.employee);
            prop_assert!(result.employee > Decimal::ZERO);
        }
    }
}
