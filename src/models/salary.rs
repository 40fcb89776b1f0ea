//! Salary components, deductions and officer salary structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of earning a salary component represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Basic pay.
    BasicPay,
    /// House rent allowance.
    Hra,
    /// Dearness allowance.
    Da,
    /// Transport allowance.
    TransportAllowance,
    /// Special allowance.
    SpecialAllowance,
    /// Medical allowance.
    MedicalAllowance,
    /// Overtime pay.
    Overtime,
    /// Bonus.
    Bonus,
    /// Incentive.
    Incentive,
}

impl ComponentType {
    /// Returns the wire name of the component type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::BasicPay => "basic_pay",
            ComponentType::Hra => "hra",
            ComponentType::Da => "da",
            ComponentType::TransportAllowance => "transport_allowance",
            ComponentType::SpecialAllowance => "special_allowance",
            ComponentType::MedicalAllowance => "medical_allowance",
            ComponentType::Overtime => "overtime",
            ComponentType::Bonus => "bonus",
            ComponentType::Incentive => "incentive",
        }
    }
}

/// How a component or deduction amount was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    /// A fixed amount.
    Fixed,
    /// A percentage of another figure.
    Percentage,
    /// Computed by a rule (e.g. overtime).
    Computed,
    /// Computed by a statutory calculator.
    Statutory,
}

/// The figure a percentage component is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageBase {
    /// Percentage of basic pay.
    BasicPay,
    /// Percentage of the monthly gross salary.
    GrossSalary,
}

/// One earning line on a payroll record.
///
/// Owned exclusively by its [`PayrollRecord`](super::PayrollRecord).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    /// The kind of earning.
    pub component_type: ComponentType,
    /// The amount, in whole currency units once prorated.
    pub amount: Decimal,
    /// Whether the component counts as taxable income.
    pub is_taxable: bool,
    /// How the amount was obtained.
    pub calculation_type: CalculationType,
    /// The base figure for percentage components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_of: Option<PercentageBase>,
    /// The percentage for percentage components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
}

impl SalaryComponent {
    /// Creates a fixed, taxable component.
    pub fn fixed(component_type: ComponentType, amount: Decimal) -> Self {
        Self {
            component_type,
            amount,
            is_taxable: true,
            calculation_type: CalculationType::Fixed,
            percentage_of: None,
            percentage: None,
        }
    }
}

/// An entry in an officer's explicit salary structure.
///
/// Templates share the shape of [`SalaryComponent`]; `amount` is only read
/// for fixed templates.
pub type ComponentTemplate = SalaryComponent;

/// An officer's explicit salary structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryStructure {
    /// The monthly gross figure that `gross_salary` percentages refer to.
    pub monthly_salary: Decimal,
    /// The component templates.
    pub components: Vec<ComponentTemplate>,
}

/// The kind of deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionType {
    /// Provident fund, employee share.
    Pf,
    /// State insurance, employee share.
    Esi,
    /// Income tax withheld at source.
    Tds,
    /// Professional tax.
    ProfessionalTax,
    /// Loan repayment.
    Loan,
    /// Salary advance recovery.
    Advance,
    /// Anything else.
    Other,
}

/// One deduction line on a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    /// The kind of deduction.
    pub deduction_type: DeductionType,
    /// The amount deducted.
    pub amount: Decimal,
    /// How the amount was obtained.
    pub calculation_type: CalculationType,
    /// The rate, for percentage deductions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Deduction {
    /// Creates a statutory deduction.
    pub fn statutory(deduction_type: DeductionType, amount: Decimal, notes: &str) -> Self {
        Self {
            deduction_type,
            amount,
            calculation_type: CalculationType::Statutory,
            percentage: None,
            notes: Some(notes.to_string()),
        }
    }

    /// Creates a fixed deduction supplied by a caller.
    pub fn fixed(deduction_type: DeductionType, amount: Decimal) -> Self {
        Self {
            deduction_type,
            amount,
            calculation_type: CalculationType::Fixed,
            percentage: None,
            notes: None,
        }
    }
}
