//! Payslip snapshot model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayrollRecord;

/// Delivery state of a payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Generated, not yet handed to a delivery channel.
    Generated,
    /// Handed to a delivery channel.
    Sent,
    /// Delivery failed.
    Failed,
}

/// Where and how a payslip is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryMetadata {
    /// Delivery address, if the officer has one.
    #[serde(default)]
    pub recipient: Option<String>,
    /// Delivery state.
    pub status: DeliveryStatus,
}

/// A point-in-time snapshot of one payroll record.
///
/// A payslip is never recomputed; a changed record needs a new payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier for the payslip.
    pub id: Uuid,
    /// The record as it stood when the payslip was generated.
    pub record: PayrollRecord,
    /// When the payslip was generated.
    pub generated_date: DateTime<Utc>,
    /// The rendered document.
    #[serde(skip)]
    pub document: Vec<u8>,
    /// Delivery information.
    pub delivery: DeliveryMetadata,
}

impl Payslip {
    /// Returns true if the snapshot still matches `current`.
    ///
    /// A stale payslip must be replaced by a newly generated one.
    pub fn is_current_for(&self, current: &PayrollRecord) -> bool {
        self.record == *current
    }
}
