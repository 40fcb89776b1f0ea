//! Configuration types for statutory payroll rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every table here is data:
//! adding a jurisdiction or a tax year means adding rows, not code.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::ComponentType;

/// Provident fund parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidentFundConfig {
    /// Reference to the governing statute.
    pub statute_ref: String,
    /// Ceiling on basic + DA that contributions are computed on.
    pub wage_ceiling: Decimal,
    /// Employee contribution rate (e.g. 0.12).
    pub employee_rate: Decimal,
    /// Employer contribution rate (e.g. 0.12).
    pub employer_rate: Decimal,
}

/// State insurance parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInsuranceConfig {
    /// Reference to the governing statute.
    pub statute_ref: String,
    /// Gross salary above which no contribution is due.
    pub wage_threshold: Decimal,
    /// Employee contribution rate (e.g. 0.0075).
    pub employee_rate: Decimal,
    /// Employer contribution rate (e.g. 0.0325).
    pub employer_rate: Decimal,
}

/// Overtime parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeConfig {
    /// Reference to the governing policy.
    pub policy_ref: String,
    /// Standard working hours per month used to derive the hourly rate.
    pub standard_monthly_hours: Decimal,
    /// Multiplier applied to the hourly rate.
    pub multiplier: Decimal,
}

/// One row of a slab table.
///
/// The row covers incomes up to and including `up_to`; `None` means the
/// row is open-ended and must be last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabRow {
    /// Inclusive upper bound, or `None` for the top slab.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Flat amount due on entering the slab.
    #[serde(default)]
    pub base_amount: Decimal,
    /// Rate applied to the income above the previous slab's bound.
    #[serde(default)]
    pub rate: Decimal,
}

/// An ordered slab table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabTable {
    /// Rows ordered by ascending upper bound.
    pub slabs: Vec<SlabRow>,
}

impl SlabTable {
    /// Checks that bounds ascend strictly and that only the last row is open.
    pub fn validate(&self) -> Result<(), String> {
        if self.slabs.is_empty() {
            return Err("slab table has no rows".to_string());
        }
        let mut previous: Option<Decimal> = None;
        for (index, slab) in self.slabs.iter().enumerate() {
            match slab.up_to {
                Some(bound) => {
                    if previous.is_some_and(|p| bound <= p) {
                        return Err(format!("slab {} bound {} is not ascending", index, bound));
                    }
                    previous = Some(bound);
                }
                None if index + 1 != self.slabs.len() => {
                    return Err(format!("open-ended slab {} is not the last row", index));
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// Professional tax tables keyed by jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalTaxConfig {
    /// Reference to the governing statute.
    pub statute_ref: String,
    /// Slab tables keyed by lowercase jurisdiction name.
    pub jurisdictions: BTreeMap<String, SlabTable>,
}

impl ProfessionalTaxConfig {
    /// The slab table for a jurisdiction, matched case-insensitively.
    pub fn table(&self, jurisdiction: &str) -> Option<&SlabTable> {
        self.jurisdictions.get(&jurisdiction.trim().to_lowercase())
    }
}

/// Income tax withholding parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxConfig {
    /// Reference to the governing statute.
    pub statute_ref: String,
    /// Months a monthly gross is multiplied by to annualize it, and the
    /// annual tax divided by to get the monthly withholding.
    pub annualization_months: u32,
    /// Progressive slabs over annual income.
    pub slabs: SlabTable,
}

/// One entry in the default salary split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEntry {
    /// The component produced.
    pub component_type: ComponentType,
    /// Share of the monthly salary, in percent.
    pub percentage: Decimal,
    /// Whether the component is taxable.
    #[serde(default = "default_taxable")]
    pub is_taxable: bool,
}

fn default_taxable() -> bool {
    true
}

/// The split applied to an officer's single monthly figure when no explicit
/// structure exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySplitConfig {
    /// Split entries, in payslip order.
    pub components: Vec<SplitEntry>,
}

impl SalarySplitConfig {
    /// Checks that the percentages sum to exactly 100.
    pub fn validate(&self) -> Result<(), String> {
        let total: Decimal = self.components.iter().map(|c| c.percentage).sum();
        if total != Decimal::ONE_HUNDRED {
            return Err(format!("salary split sums to {}%, expected 100%", total));
        }
        Ok(())
    }
}

/// Calculator parameters stored in `statutory.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryRates {
    /// Provident fund parameters.
    pub provident_fund: ProvidentFundConfig,
    /// State insurance parameters.
    pub state_insurance: StateInsuranceConfig,
    /// Overtime parameters.
    pub overtime: OvertimeConfig,
}

/// The complete statutory configuration.
///
/// `Default` carries the reference tables so calculators work without any
/// configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatutoryConfig {
    /// Provident fund parameters.
    pub provident_fund: ProvidentFundConfig,
    /// State insurance parameters.
    pub state_insurance: StateInsuranceConfig,
    /// Overtime parameters.
    pub overtime: OvertimeConfig,
    /// Professional tax tables.
    pub professional_tax: ProfessionalTaxConfig,
    /// Income tax withholding slabs.
    pub income_tax: IncomeTaxConfig,
    /// Default salary split.
    pub salary_split: SalarySplitConfig,
}

fn flat(up_to: Option<i64>, amount: i64) -> SlabRow {
    SlabRow {
        up_to: up_to.map(Decimal::from),
        base_amount: Decimal::from(amount),
        rate: Decimal::ZERO,
    }
}

fn progressive(up_to: Option<i64>, base: i64, rate_percent: i64) -> SlabRow {
    SlabRow {
        up_to: up_to.map(Decimal::from),
        base_amount: Decimal::from(base),
        rate: Decimal::new(rate_percent, 2),
    }
}

fn split(component_type: ComponentType, percentage: i64) -> SplitEntry {
    SplitEntry {
        component_type,
        percentage: Decimal::from(percentage),
        is_taxable: true,
    }
}

impl Default for StatutoryConfig {
    fn default() -> Self {
        let mut jurisdictions = BTreeMap::new();
        jurisdictions.insert(
            "maharashtra".to_string(),
            SlabTable {
                slabs: vec![flat(Some(7500), 0), flat(Some(10000), 175), flat(None, 200)],
            },
        );

        Self {
            provident_fund: ProvidentFundConfig {
                statute_ref: "EPF Act 1952 s.6".to_string(),
                wage_ceiling: Decimal::from(15000),
                employee_rate: Decimal::new(12, 2),
                employer_rate: Decimal::new(12, 2),
            },
            state_insurance: StateInsuranceConfig {
                statute_ref: "ESI Act 1948 s.39".to_string(),
                wage_threshold: Decimal::from(21000),
                employee_rate: Decimal::new(75, 4),
                employer_rate: Decimal::new(325, 4),
            },
            overtime: OvertimeConfig {
                policy_ref: "staff overtime policy".to_string(),
                standard_monthly_hours: Decimal::from(208),
                multiplier: Decimal::from(2),
            },
            professional_tax: ProfessionalTaxConfig {
                statute_ref: "state professional tax schedule".to_string(),
                jurisdictions,
            },
            income_tax: IncomeTaxConfig {
                statute_ref: "Income Tax Act 1961 s.192".to_string(),
                annualization_months: 12,
                slabs: SlabTable {
                    slabs: vec![
                        progressive(Some(250_000), 0, 0),
                        progressive(Some(500_000), 0, 5),
                        progressive(Some(1_000_000), 12_500, 20),
                        progressive(None, 112_500, 30),
                    ],
                },
            },
            salary_split: SalarySplitConfig {
                components: vec![
                    split(ComponentType::BasicPay, 40),
                    split(ComponentType::Hra, 20),
                    split(ComponentType::Da, 10),
                    split(ComponentType::TransportAllowance, 5),
                    split(ComponentType::SpecialAllowance, 20),
                    split(ComponentType::MedicalAllowance, 5),
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        let config = StatutoryConfig::default();
        assert!(config.salary_split.validate().is_ok());
        assert!(config.income_tax.slabs.validate().is_ok());
        for table in config.professional_tax.jurisdictions.values() {
            assert!(table.validate().is_ok());
        }
    }

    #[test]
    fn test_split_not_summing_to_hundred_is_invalid() {
        let mut config = StatutoryConfig::default();
        config.salary_split.components.pop();
        let err = config.salary_split.validate().unwrap_err();
        assert!(err.contains("95"));
    }

    #[test]
    fn test_descending_bounds_are_invalid() {
        let table = SlabTable {
            slabs: vec![flat(Some(10000), 175), flat(Some(7500), 0), flat(None, 200)],
        };
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_open_slab_must_be_last() {
        let table = SlabTable {
            slabs: vec![flat(None, 200), flat(Some(7500), 0)],
        };
        assert!(table.validate().unwrap_err().contains("not the last row"));
    }

    #[test]
    fn test_jurisdiction_lookup_is_case_insensitive() {
        let config = StatutoryConfig::default();
        assert!(config.professional_tax.table("Maharashtra").is_some());
        assert!(config.professional_tax.table("atlantis").is_none());
    }
}
