//! Officer master data read by the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Which statutory deductions apply to an officer.
///
/// Owned by officer master data; read-only to the calculators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryProfile {
    /// Provident fund applies.
    pub pf_applicable: bool,
    /// State insurance applies (still subject to the wage ceiling).
    pub esi_applicable: bool,
    /// Professional tax applies.
    pub pt_applicable: bool,
    /// Income tax is withheld at source.
    #[serde(default = "default_true")]
    pub tds_applicable: bool,
    /// Jurisdiction key for the professional tax slab table.
    #[serde(default)]
    pub pt_jurisdiction: Option<String>,
    /// Provident fund account number.
    #[serde(default)]
    pub pf_number: Option<String>,
    /// Universal account number.
    #[serde(default)]
    pub uan: Option<String>,
    /// State insurance number.
    #[serde(default)]
    pub esi_number: Option<String>,
    /// Permanent account number for income tax.
    #[serde(default)]
    pub pan: Option<String>,
}

impl StatutoryProfile {
    /// A profile with only the three applicability flags set.
    pub fn new(pf_applicable: bool, esi_applicable: bool, pt_applicable: bool) -> Self {
        Self {
            pf_applicable,
            esi_applicable,
            pt_applicable,
            tds_applicable: true,
            pt_jurisdiction: None,
            pf_number: None,
            uan: None,
            esi_number: None,
            pan: None,
        }
    }

    /// Sets the professional tax jurisdiction.
    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.pt_jurisdiction = Some(jurisdiction.into());
        self
    }
}

/// Identity and pay facts about an officer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerProfile {
    /// Unique identifier for the officer.
    pub officer_id: String,
    /// Display name.
    pub officer_name: String,
    /// Staff number printed on payslips.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Job title.
    #[serde(default)]
    pub designation: Option<String>,
    /// The institution the officer is attached to.
    #[serde(default)]
    pub institution_id: Option<String>,
    /// Delivery address for payslips and notifications.
    #[serde(default)]
    pub email: Option<String>,
    /// Single monthly figure split by the default table when the officer
    /// has no explicit structure.
    pub monthly_salary: Decimal,
    /// Inactive officers are skipped by bulk generation.
    #[serde(default = "default_true")]
    pub active: bool,
}
