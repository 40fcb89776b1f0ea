//! Overtime calculation functionality.
//!
//! This module computes the overtime component from reported overtime hours
//! and the prorated basic pay for the period.

use rust_decimal::Decimal;

use super::round_currency;
use crate::config::OvertimeConfig;
use crate::models::{AuditStep, CalculationType, ComponentType, SalaryComponent};

/// The result of an overtime calculation.
#[derive(Debug, Clone)]
pub struct OvertimeResult {
    /// The overtime component, or `None` when no overtime was worked.
    pub component: Option<SalaryComponent>,
    /// Prorated basic pay divided by standard monthly hours.
    pub hourly_rate: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the overtime component.
///
/// `hourly_rate = basic_pay / standard_monthly_hours` and
/// `amount = round(hourly_rate × multiplier × hours)`. With the reference
/// configuration that is `basic_pay / 208 × 2` per hour. Zero hours produce
/// no component at all. Negative hours are rejected by callers before this
/// function is reached; here they are treated like zero.
///
/// # Arguments
///
/// * `overtime_hours` - Hours of overtime reported for the month
/// * `prorated_basic` - Basic pay after proration
/// * `config` - Overtime constants
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_overtime;
/// use payroll_engine::config::StatutoryConfig;
/// use rust_decimal::Decimal;
///
/// let config = StatutoryConfig::default();
/// let result = calculate_overtime(Decimal::from(10), Decimal::from(20800), &config.overtime, 3);
///
/// let component = result.component.unwrap();
/// assert_eq!(component.amount, Decimal::from(2000));
/// ```
pub fn calculate_overtime(
    overtime_hours: Decimal,
    prorated_basic: Decimal,
    config: &OvertimeConfig,
    step_number: u32,
) -> OvertimeResult {
    let hourly_rate = if config.standard_monthly_hours > Decimal::ZERO {
        prorated_basic / config.standard_monthly_hours
    } else {
        Decimal::ZERO
    };

    if overtime_hours <= Decimal::ZERO || hourly_rate <= Decimal::ZERO {
        let audit_step = AuditStep {
            step_number,
            rule_id: "overtime".to_string(),
            rule_name: "Overtime".to_string(),
            statute_ref: config.policy_ref.clone(),
            input: serde_json::json!({
                "overtime_hours": overtime_hours.normalize().to_string(),
                "basic_pay": prorated_basic.normalize().to_string()
            }),
            output: serde_json::json!({
                "component_added": false
            }),
            reasoning: "No overtime payable; component omitted".to_string(),
        };
        return OvertimeResult {
            component: None,
            hourly_rate,
            audit_step,
        };
    }

    // Multiply before dividing so the hourly rate never truncates.
    let amount = round_currency(
        prorated_basic * config.multiplier * overtime_hours / config.standard_monthly_hours,
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime".to_string(),
        rule_name: "Overtime".to_string(),
        statute_ref: config.policy_ref.clone(),
        input: serde_json::json!({
            "overtime_hours": overtime_hours.normalize().to_string(),
            "basic_pay": prorated_basic.normalize().to_string(),
            "standard_monthly_hours": config.standard_monthly_hours.normalize().to_string(),
            "multiplier": config.multiplier.normalize().to_string()
        }),
        output: serde_json::json!({
            "component_added": true,
            "hourly_rate": hourly_rate.round_dp(4).normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} / {} x {} x {}h = {}",
            prorated_basic.normalize(),
            config.standard_monthly_hours.normalize(),
            config.multiplier.normalize(),
            overtime_hours.normalize(),
            amount.normalize()
        ),
    };

    OvertimeResult {
        component: Some(SalaryComponent {
            component_type: ComponentType::Overtime,
            amount,
            is_taxable: true,
            calculation_type: CalculationType::Computed,
            percentage_of: None,
            percentage: None,
        }),
        hourly_rate,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatutoryConfig;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> OvertimeConfig {
        StatutoryConfig::default().overtime
    }

    #[test]
    fn test_zero_hours_omits_component() {
        let result = calculate_overtime(Decimal::ZERO, dec("11600"), &config(), 3);
        assert!(result.component.is_none());
        assert_eq!(result.audit_step.output["component_added"], false);
    }

    #[test]
    fn test_double_time_on_208_hour_month() {
        // 11600 / 208 x 2 x 5 = 557.69...
        let result = calculate_overtime(dec("5"), dec("11600"), &config(), 3);
        let component = result.component.unwrap();

        assert_eq!(component.amount, dec("558"));
        assert_eq!(component.component_type, ComponentType::Overtime);
        assert_eq!(component.calculation_type, CalculationType::Computed);
        assert!(component.is_taxable);
    }

    #[test]
    fn test_fractional_hours() {
        // 20800 / 208 x 2 x 1.5 = 300
        let result = calculate_overtime(dec("1.5"), dec("20800"), &config(), 3);
        assert_eq!(result.component.unwrap().amount, dec("300"));
        assert_eq!(result.hourly_rate, dec("100"));
    }

    #[test]
    fn test_zero_basic_omits_component() {
        let result = calculate_overtime(dec("4"), Decimal::ZERO, &config(), 3);
        assert!(result.component.is_none());
    }

    #[test]
    fn test_audit_step_records_rate_inputs() {
        let result = calculate_overtime(dec("2"), dec("20800"), &config(), 7);
        assert_eq!(result.audit_step.step_number, 7);
        assert_eq!(result.audit_step.input["standard_monthly_hours"], "208");
        assert_eq!(result.audit_step.input["multiplier"], "2");
        assert!(result.audit_step.reasoning.contains("= 400"));
    }
}
