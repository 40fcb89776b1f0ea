//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading statutory
//! configurations from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    IncomeTaxConfig, ProfessionalTaxConfig, SalarySplitConfig, SlabTable, StatutoryConfig,
    StatutoryRates,
};

/// Loads and provides access to statutory configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates every table, and exposes the resulting [`StatutoryConfig`].
///
/// # Directory Structure
///
/// ```text
/// config/india/
/// ├── statutory.yaml         # PF, ESI and overtime parameters
/// ├── salary_split.yaml      # Default component split
/// ├── professional_tax.yaml  # Slab tables keyed by jurisdiction
/// └── income_tax.yaml        # Withholding slabs
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/india").unwrap();
/// let ceiling = loader.config().provident_fund.wage_ceiling;
/// println!("PF wage ceiling: {}", ceiling);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: StatutoryConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - A table fails validation (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rates_path = path.join("statutory.yaml");
        let rates = Self::load_yaml::<StatutoryRates>(&rates_path)?;
        if rates.overtime.standard_monthly_hours <= Decimal::ZERO {
            return Err(Self::invalid(
                &rates_path,
                "overtime.standard_monthly_hours must be positive",
            ));
        }

        let split_path = path.join("salary_split.yaml");
        let salary_split = Self::load_yaml::<SalarySplitConfig>(&split_path)?;
        salary_split
            .validate()
            .map_err(|message| Self::invalid(&split_path, message))?;

        let pt_path = path.join("professional_tax.yaml");
        let mut professional_tax = Self::load_yaml::<ProfessionalTaxConfig>(&pt_path)?;
        professional_tax.jurisdictions = professional_tax
            .jurisdictions
            .into_iter()
            .map(|(key, table)| (key.trim().to_lowercase(), table))
            .collect();
        for (jurisdiction, table) in &professional_tax.jurisdictions {
            Self::validate_table(&pt_path, jurisdiction, table)?;
        }

        let it_path = path.join("income_tax.yaml");
        let income_tax = Self::load_yaml::<IncomeTaxConfig>(&it_path)?;
        Self::validate_table(&it_path, "income_tax", &income_tax.slabs)?;
        if income_tax.annualization_months == 0 {
            return Err(Self::invalid(&it_path, "annualization_months must be positive"));
        }

        let config = StatutoryConfig {
            provident_fund: rates.provident_fund,
            state_insurance: rates.state_insurance,
            overtime: rates.overtime,
            professional_tax,
            income_tax,
            salary_split,
        };

        tracing::debug!(
            path = %path.display(),
            jurisdictions = config.professional_tax.jurisdictions.len(),
            "Loaded statutory configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: StatutoryConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_table(path: &Path, name: &str, table: &SlabTable) -> EngineResult<()> {
        table
            .validate()
            .map_err(|message| Self::invalid(path, format!("{}: {}", name, message)))
    }

    fn invalid(path: &Path, message: impl Into<String>) -> EngineError {
        EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Returns the underlying statutory configuration.
    pub fn config(&self) -> &StatutoryConfig {
        &self.config
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::from_config(StatutoryConfig::default())
    }
}
