//! Provident fund contribution calculation.

use rust_decimal::Decimal;

use super::round_currency;
use crate::config::ProvidentFundConfig;
use crate::models::AuditStep;

/// The result of a provident fund calculation.
#[derive(Debug, Clone)]
pub struct ProvidentFundResult {
    /// Employee contribution, deducted from pay.
    pub employee: Decimal,
    /// Employer contribution, not deducted from pay.
    pub employer: Decimal,
    /// Wages contributions were computed on, after the ceiling.
    pub base: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates provident fund contributions.
///
/// When applicable, `base = min(basic_pay + da, wage_ceiling)` and each side
/// contributes `round(base × rate)`. With the reference configuration both
/// rates are 12% and the ceiling is 15000, so the two shares are always
/// equal. When not applicable both shares are zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_provident_fund;
/// use payroll_engine::config::StatutoryConfig;
/// use rust_decimal::Decimal;
///
/// let config = StatutoryConfig::default();
/// let result = calculate_provident_fund(
///     Decimal::from(11600),
///     Decimal::from(2900),
///     true,
///     &config.provident_fund,
///     4,
/// );
/// assert_eq!(result.employee, Decimal::from(1740));
/// assert_eq!(result.employer, Decimal::from(1740));
/// ```
pub fn calculate_provident_fund(
    basic_pay: Decimal,
    da: Decimal,
    pf_applicable: bool,
    config: &ProvidentFundConfig,
    step_number: u32,
) -> ProvidentFundResult {
    let input = serde_json::json!({
        "basic_pay": basic_pay.normalize().to_string(),
        "da": da.normalize().to_string(),
        "pf_applicable": pf_applicable
    });

    if !pf_applicable {
        return ProvidentFundResult {
            employee: Decimal::ZERO,
            employer: Decimal::ZERO,
            base: Decimal::ZERO,
            audit_step: AuditStep {
                step_number,
                rule_id: "provident_fund".to_string(),
                rule_name: "Provident Fund".to_string(),
                statute_ref: config.statute_ref.clone(),
                input,
                output: serde_json::json!({"employee": "0", "employer": "0"}),
                reasoning: "Provident fund not applicable to officer".to_string(),
            },
        };
    }

    let base = (basic_pay + da).min(config.wage_ceiling);
    let employee = round_currency(base * config.employee_rate);
    let employer = round_currency(base * config.employer_rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "provident_fund".to_string(),
        rule_name: "Provident Fund".to_string(),
        statute_ref: config.statute_ref.clone(),
        input,
        output: serde_json::json!({
            "base": base.normalize().to_string(),
            "employee": employee.normalize().to_string(),
            "employer": employer.normalize().to_string()
        }),
        reasoning: format!(
            "min({} + {}, {}) = {}; x {} = {}",
            basic_pay.normalize(),
            da.normalize(),
            config.wage_ceiling.normalize(),
            base.normalize(),
            config.employee_rate.normalize(),
            employee.normalize()
        ),
    };

    ProvidentFundResult {
        employee,
        employer,
        base,
        audit_step,
    }
}
