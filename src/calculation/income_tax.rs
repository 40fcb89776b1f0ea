//! Income tax withholding calculation.
//!
//! Annual income is approximated as the month's gross salary multiplied by
//! the annualization factor (12); it is not a year-to-date figure.

use rust_decimal::Decimal;

use super::{evaluate_slabs, round_currency};
use crate::config::IncomeTaxConfig;
use crate::models::AuditStep;

/// The result of an income tax withholding calculation.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// Annual income the slabs were applied to.
    pub annual_income: Decimal,
    /// Annual tax before division, unrounded.
    pub annual_tax: Decimal,
    /// Monthly withholding, `round(annual_tax / months)`.
    pub monthly_withholding: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Annualizes a monthly gross salary.
pub fn annualize(monthly_gross: Decimal, config: &IncomeTaxConfig) -> Decimal {
    monthly_gross * Decimal::from(config.annualization_months)
}

/// Calculates the monthly withholding for an annual income.
///
/// The reference slabs are: up to 250000 nil; up to 500000 5% of the excess
/// over 250000; up to 1000000 12500 plus 20% of the excess over 500000;
/// above that 112500 plus 30% of the excess over 1000000.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_income_tax_withholding;
/// use payroll_engine::config::StatutoryConfig;
/// use rust_decimal::Decimal;
///
/// let config = StatutoryConfig::default();
/// let result = calculate_income_tax_withholding(Decimal::from(2_400_000), &config.income_tax, 7);
/// assert_eq!(result.monthly_withholding, Decimal::from(44375));
/// ```
pub fn calculate_income_tax_withholding(
    annual_income: Decimal,
    config: &IncomeTaxConfig,
    step_number: u32,
) -> IncomeTaxResult {
    let evaluation = evaluate_slabs(&config.slabs, annual_income);
    let annual_tax = evaluation.amount;
    let months = Decimal::from(config.annualization_months.max(1));
    let monthly_withholding = round_currency(annual_tax / months);

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax_withholding".to_string(),
        rule_name: "Income Tax Withholding".to_string(),
        statute_ref: config.statute_ref.clone(),
        input: serde_json::json!({
            "annual_income": annual_income.normalize().to_string()
        }),
        output: serde_json::json!({
            "slab_index": evaluation.slab_index,
            "annual_tax": annual_tax.normalize().to_string(),
            "monthly_withholding": monthly_withholding.normalize().to_string()
        }),
        reasoning: format!(
            "Annual {} in slab {} above {}: tax {}; / {} = {}",
            annual_income.normalize(),
            evaluation.slab_index,
            evaluation.lower_bound.normalize(),
            annual_tax.normalize(),
            months,
            monthly_withholding.normalize()
        ),
    };

    IncomeTaxResult {
        annual_income,
        annual_tax,
        monthly_withholding,
        audit_step,
    }
}
