//! Configuration loading and management for the Payroll Engine.
//!
//! This module provides functionality to load statutory configurations from
//! YAML files: provident fund and state insurance parameters, overtime
//! constants, professional tax and income tax slab tables, and the default
//! salary split.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/india").unwrap();
//! println!("{} PT jurisdictions", loader.config().professional_tax.jurisdictions.len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    IncomeTaxConfig, OvertimeConfig, ProfessionalTaxConfig, ProvidentFundConfig,
    SalarySplitConfig, SlabRow, SlabTable, SplitEntry, StateInsuranceConfig, StatutoryConfig,
    StatutoryRates,
};
