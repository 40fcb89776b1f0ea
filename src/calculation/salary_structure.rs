//! Salary structure resolution.
//!
//! Produces an officer's unprorated monthly components, either from an
//! explicit [`SalaryStructure`] or by splitting a single monthly salary with
//! the configured default split.

use rust_decimal::Decimal;

use crate::config::SalarySplitConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, CalculationType, ComponentType, PercentageBase, SalaryComponent, SalaryStructure,
};

/// Where the resolved components came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureSource {
    /// The officer's explicit structure.
    Explicit,
    /// The default split of the monthly salary.
    DefaultSplit,
}

/// The result of resolving a salary structure.
#[derive(Debug, Clone)]
pub struct StructureResolution {
    /// Unprorated components, in structure order.
    pub components: Vec<SalaryComponent>,
    /// Where the components came from.
    pub source: StructureSource,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Resolves the officer's unprorated components.
///
/// With an explicit structure, `fixed` templates keep their amount, and
/// `percentage` templates take their share of basic pay or of the
/// structure's monthly salary. Without one, `monthly_salary` is split by
/// `split`. Amounts are not rounded here; rounding happens after proration.
///
/// # Returns
///
/// A `Validation` error if:
/// - `monthly_salary` or any fixed amount is negative
/// - a percentage template lacks `percentage` or `percentage_of`
/// - a template is percentage-of-basic but the structure has no basic pay
///   that resolves without it
/// - a template uses a `computed` or `statutory` calculation type
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{resolve_salary_structure, StructureSource};
/// use payroll_engine::config::StatutoryConfig;
/// use rust_decimal::Decimal;
///
/// let config = StatutoryConfig::default();
/// let result = resolve_salary_structure(None, Decimal::from(30000), &config.salary_split, 1).unwrap();
///
/// assert_eq!(result.source, StructureSource::DefaultSplit);
/// assert_eq!(result.components[0].amount, Decimal::from(12000));
/// ```
pub fn resolve_salary_structure(
    structure: Option<&SalaryStructure>,
    monthly_salary: Decimal,
    split: &SalarySplitConfig,
    step_number: u32,
) -> EngineResult<StructureResolution> {
    let (components, source, base) = match structure {
        Some(structure) => (
            resolve_explicit(structure)?,
            StructureSource::Explicit,
            structure.monthly_salary,
        ),
        None => (
            split_monthly_salary(monthly_salary, split)?,
            StructureSource::DefaultSplit,
            monthly_salary,
        ),
    };

    let source_str = match source {
        StructureSource::Explicit => "explicit_structure",
        StructureSource::DefaultSplit => "default_split",
    };
    let total: Decimal = components.iter().map(|c| c.amount).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "salary_structure".to_string(),
        rule_name: "Salary Structure Resolution".to_string(),
        statute_ref: "salary policy".to_string(),
        input: serde_json::json!({
            "monthly_salary": base.normalize().to_string(),
            "source": source_str
        }),
        output: serde_json::json!(
            components
                .iter()
                .map(|c| (c.component_type.as_str().to_string(), c.amount.normalize().to_string()))
                .collect::<std::collections::BTreeMap<_, _>>()
        ),
        reasoning: format!(
            "Resolved {} components from {} totalling {}",
            components.len(),
            source_str,
            total.normalize()
        ),
    };

    Ok(StructureResolution {
        components,
        source,
        audit_step,
    })
}

fn split_monthly_salary(
    monthly_salary: Decimal,
    split: &SalarySplitConfig,
) -> EngineResult<Vec<SalaryComponent>> {
    if monthly_salary < Decimal::ZERO {
        return Err(EngineError::validation(
            "monthly_salary",
            format!("{} is negative", monthly_salary),
        ));
    }

    Ok(split
        .components
        .iter()
        .map(|entry| SalaryComponent {
            component_type: entry.component_type,
            amount: monthly_salary * entry.percentage / Decimal::ONE_HUNDRED,
            is_taxable: entry.is_taxable,
            calculation_type: CalculationType::Percentage,
            percentage_of: Some(PercentageBase::GrossSalary),
            percentage: Some(entry.percentage),
        })
        .collect())
}

fn resolve_explicit(structure: &SalaryStructure) -> EngineResult<Vec<SalaryComponent>> {
    if structure.monthly_salary < Decimal::ZERO {
        return Err(EngineError::validation(
            "monthly_salary",
            format!("{} is negative", structure.monthly_salary),
        ));
    }

    // Basic pay first, since percentage-of-basic templates depend on it.
    let basic = structure
        .components
        .iter()
        .find(|t| t.component_type == ComponentType::BasicPay)
        .map(|t| resolve_template(t, None, structure.monthly_salary))
        .transpose()?;

    structure
        .components
        .iter()
        .map(|template| {
            let amount = resolve_template(template, basic, structure.monthly_salary)?;
            Ok(SalaryComponent {
                amount,
                ..template.clone()
            })
        })
        .collect()
}

fn resolve_template(
    template: &SalaryComponent,
    basic: Option<Decimal>,
    monthly_salary: Decimal,
) -> EngineResult<Decimal> {
    let field = template.component_type.as_str();
    match template.calculation_type {
        CalculationType::Fixed => {
            if template.amount < Decimal::ZERO {
                return Err(EngineError::validation(
                    field,
                    format!("fixed amount {} is negative", template.amount),
                ));
            }
            Ok(template.amount)
        }
        CalculationType::Percentage => {
            let (Some(percentage), Some(of)) = (template.percentage, template.percentage_of)
            else {
                return Err(EngineError::validation(
                    field,
                    "percentage component needs both percentage and percentage_of",
                ));
            };
            let base = match of {
                PercentageBase::GrossSalary => monthly_salary,
                PercentageBase::BasicPay => basic.ok_or_else(|| {
                    EngineError::validation(
                        field,
                        "percentage of basic_pay requires a basic_pay component",
                    )
                })?,
            };
            Ok(base * percentage / Decimal::ONE_HUNDRED)
        }
        CalculationType::Computed | CalculationType::Statutory => Err(EngineError::validation(
            field,
            "computed and statutory amounts cannot appear in a salary structure",
        )),
    }
}
