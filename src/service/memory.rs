//! In-memory stores.
//!
//! Each store keeps its rows in insertion order behind a
//! [`parking_lot::RwLock`]. Compare-and-set takes the write lock for both
//! the status check and the replacement, so concurrent transitions on the
//! same id serialize and exactly one wins.

use parking_lot::RwLock;
use uuid::Uuid;

use super::ports::{LeaveStore, PayrollStore, PayslipStore};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DeliveryStatus, LeaveApplication, LeaveStatus, PayrollMonth, PayrollRecord, PayrollStatus,
    Payslip,
};

fn duplicate_id(entity: &str, id: Uuid) -> EngineError {
    EngineError::StateConflict {
        entity: entity.to_string(),
        id: id.to_string(),
        expected: "absent".to_string(),
        actual: "present".to_string(),
    }
}

fn stale(entity: &str, id: Uuid, expected: &str, actual: &str) -> EngineError {
    EngineError::StateConflict {
        entity: entity.to_string(),
        id: id.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

/// Payroll records held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    rows: RwLock<Vec<PayrollRecord>>,
}

impl InMemoryPayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl PayrollStore for InMemoryPayrollStore {
    fn insert(&self, record: PayrollRecord) -> EngineResult<()> {
        let mut rows = self.rows.write();
        if rows.iter().any(|r| r.id == record.id) {
            return Err(duplicate_id("payroll_record", record.id));
        }
        if let Some(active) = rows.iter().find(|r| {
            r.officer_id == record.officer_id
                && r.month == record.month
                && r.status != PayrollStatus::Rejected
        }) {
            return Err(stale(
                "payroll_record",
                active.id,
                PayrollStatus::Rejected.as_str(),
                active.status.as_str(),
            ));
        }
        rows.push(record);
        Ok(())
    }

    fn get(&self, id: Uuid) -> EngineResult<PayrollRecord> {
        self.rows
            .read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("payroll_record", id.to_string()))
    }

    fn find(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Vec<PayrollRecord>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| r.officer_id == officer_id && r.month == month)
            .cloned()
            .collect())
    }

    fn compare_and_set(
        &self,
        id: Uuid,
        expected: PayrollStatus,
        next: PayrollRecord,
    ) -> EngineResult<PayrollRecord> {
        let mut rows = self.rows.write();
        let slot = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| EngineError::not_found("payroll_record", id.to_string()))?;
        if slot.status != expected {
            return Err(stale(
                "payroll_record",
                id,
                expected.as_str(),
                slot.status.as_str(),
            ));
        }
        *slot = next;
        Ok(slot.clone())
    }
}

/// Leave applications held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLeaveStore {
    rows: RwLock<Vec<LeaveApplication>>,
}

impl InMemoryLeaveStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaveStore for InMemoryLeaveStore {
    fn insert(&self, application: LeaveApplication) -> EngineResult<()> {
        let mut rows = self.rows.write();
        if rows.iter().any(|a| a.id == application.id) {
            return Err(duplicate_id("leave_application", application.id));
        }
        rows.push(application);
        Ok(())
    }

    fn get(&self, id: Uuid) -> EngineResult<LeaveApplication> {
        self.rows
            .read()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("leave_application", id.to_string()))
    }

    fn find(&self, officer_id: &str) -> EngineResult<Vec<LeaveApplication>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|a| a.officer_id == officer_id)
            .cloned()
            .collect())
    }

    fn compare_and_set(
        &self,
        id: Uuid,
        expected: LeaveStatus,
        next: LeaveApplication,
    ) -> EngineResult<LeaveApplication> {
        let mut rows = self.rows.write();
        let slot = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::not_found("leave_application", id.to_string()))?;
        if slot.status != expected {
            return Err(stale(
                "leave_application",
                id,
                expected.as_str(),
                slot.status.as_str(),
            ));
        }
        *slot = next;
        Ok(slot.clone())
    }
}

/// Payslips held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPayslipStore {
    rows: RwLock<Vec<Payslip>>,
}

impl InMemoryPayslipStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payslips.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

fn delivery_name(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Generated => "generated",
        DeliveryStatus::Sent => "sent",
        DeliveryStatus::Failed => "failed",
    }
}

impl PayslipStore for InMemoryPayslipStore {
    fn insert(&self, payslip: Payslip) -> EngineResult<()> {
        let mut rows = self.rows.write();
        if rows.iter().any(|p| p.id == payslip.id) {
            return Err(duplicate_id("payslip", payslip.id));
        }
        rows.push(payslip);
        Ok(())
    }

    fn get(&self, id: Uuid) -> EngineResult<Payslip> {
        self.rows
            .read()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("payslip", id.to_string()))
    }

    fn find(&self, officer_id: &str, month: PayrollMonth) -> EngineResult<Vec<Payslip>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|p| p.record.officer_id == officer_id && p.record.month == month)
            .cloned()
            .collect())
    }

    fn compare_and_set(
        &self,
        id: Uuid,
        expected: DeliveryStatus,
        next: Payslip,
    ) -> EngineResult<Payslip> {
        let mut rows = self.rows.write();
        let slot = rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::not_found("payslip", id.to_string()))?;
        if slot.delivery.status != expected {
            return Err(stale(
                "payslip",
                id,
                delivery_name(expected),
                delivery_name(slot.delivery.status),
            ));
        }
        *slot = next;
        Ok(slot.clone())
    }
}
