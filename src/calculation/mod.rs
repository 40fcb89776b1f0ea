//! Calculation logic for the Payroll Engine.
//!
//! This module contains the pure calculation functions for a monthly
//! payroll: attendance aggregation and approved-leave backfill, salary
//! structure resolution, attendance proration, overtime, the four statutory
//! calculators (provident fund, state insurance, professional tax and income
//! tax withholding) built on shared slab evaluation, and payroll assembly.

mod attendance_aggregation;
mod income_tax;
mod overtime;
mod payroll_assembly;
mod professional_tax;
mod proration;
mod provident_fund;
mod rounding;
mod salary_structure;
mod slab;
mod state_insurance;

pub use attendance_aggregation::{
    AttendanceAggregationResult, aggregate_attendance, backfill_approved_leave,
};
pub use income_tax::{IncomeTaxResult, annualize, calculate_income_tax_withholding};
pub use overtime::{OvertimeResult, calculate_overtime};
pub use payroll_assembly::{NEGATIVE_NET_PAY, PayrollInputs, assemble_payroll};
pub use professional_tax::{
    ProfessionalTaxResult, UNKNOWN_PT_JURISDICTION, calculate_professional_tax,
};
pub use proration::{ProrationResult, prorate_components};
pub use provident_fund::{ProvidentFundResult, calculate_provident_fund};
pub use rounding::round_currency;
pub use salary_structure::{StructureResolution, StructureSource, resolve_salary_structure};
pub use slab::{SlabEvaluation, evaluate_slabs};
pub use state_insurance::{StateInsuranceResult, calculate_state_insurance};
