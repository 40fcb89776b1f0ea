//! Professional tax calculation.

use rust_decimal::Decimal;

use super::{evaluate_slabs, round_currency};
use crate::config::ProfessionalTaxConfig;
use crate::models::{AuditStep, AuditWarning};

/// Warning code raised when no slab table exists for a jurisdiction.
pub const UNKNOWN_PT_JURISDICTION: &str = "UNKNOWN_PT_JURISDICTION";

/// The result of a professional tax calculation.
#[derive(Debug, Clone)]
pub struct ProfessionalTaxResult {
    /// Monthly professional tax.
    pub amount: Decimal,
    /// Raised when the jurisdiction has no table and zero was charged.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates monthly professional tax from the jurisdiction's slab table.
///
/// Not applicable yields zero. An applicable officer whose jurisdiction is
/// missing or has no table also yields zero, with an
/// [`UNKNOWN_PT_JURISDICTION`] warning so the gap is visible on the record.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_professional_tax;
/// use payroll_engine::config::StatutoryConfig;
/// use rust_decimal::Decimal;
///
/// let config = StatutoryConfig::default();
/// let result = calculate_professional_tax(
///     Decimal::from(7501),
///     true,
///     Some("maharashtra"),
///     &config.professional_tax,
///     6,
/// );
/// assert_eq!(result.amount, Decimal::from(175));
/// ```
pub fn calculate_professional_tax(
    gross_salary: Decimal,
    pt_applicable: bool,
    jurisdiction: Option<&str>,
    config: &ProfessionalTaxConfig,
    step_number: u32,
) -> ProfessionalTaxResult {
    let input = serde_json::json!({
        "gross_salary": gross_salary.normalize().to_string(),
        "pt_applicable": pt_applicable,
        "jurisdiction": jurisdiction
    });
    let step = |output: serde_json::Value, reasoning: String| AuditStep {
        step_number,
        rule_id: "professional_tax".to_string(),
        rule_name: "Professional Tax".to_string(),
        statute_ref: config.statute_ref.clone(),
        input: input.clone(),
        output,
        reasoning,
    };

    if !pt_applicable {
        return ProfessionalTaxResult {
            amount: Decimal::ZERO,
            warning: None,
            audit_step: step(
                serde_json::json!({"amount": "0"}),
                "Professional tax not applicable to officer".to_string(),
            ),
        };
    }

    let Some((name, table)) =
        jurisdiction.and_then(|j| config.table(j).map(|table| (j, table)))
    else {
        let name = jurisdiction.unwrap_or("<none>");
        return ProfessionalTaxResult {
            amount: Decimal::ZERO,
            warning: Some(AuditWarning {
                code: UNKNOWN_PT_JURISDICTION.to_string(),
                message: format!(
                    "No professional tax table for jurisdiction '{}'; charged 0",
                    name
                ),
                severity: "medium".to_string(),
            }),
            audit_step: step(
                serde_json::json!({"amount": "0", "jurisdiction_known": false}),
                format!("Unknown jurisdiction '{}' defaults to 0", name),
            ),
        };
    };

    let evaluation = evaluate_slabs(table, gross_salary);
    let amount = round_currency(evaluation.amount);

    ProfessionalTaxResult {
        amount,
        warning: None,
        audit_step: step(
            serde_json::json!({
                "amount": amount.normalize().to_string(),
                "slab_index": evaluation.slab_index,
                "jurisdiction_known": true
            }),
            format!(
                "Gross {} falls in {} slab {} = {}",
                gross_salary.normalize(),
                name,
                evaluation.slab_index,
                amount.normalize()
            ),
        ),
    }
}
