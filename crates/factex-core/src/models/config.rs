//! Configuration for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Vendor name appearing on the letterhead. Customer-name candidates
    /// containing it are rejected as letterhead false positives.
    pub vendor_name: String,

    /// Assumed tax rate when the document states only a tax-inclusive
    /// price, as a decimal fraction (0.20 for 20%).
    pub default_tax_rate: Decimal,

    /// Tolerance for monetary equality checks.
    pub amount_epsilon: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            vendor_name: "NOMADS".to_string(),
            default_tax_rate: Decimal::new(20, 2),
            amount_epsilon: Decimal::new(1, 2),
        }
    }
}

impl ExtractionConfig {
    /// Set the vendor letterhead name.
    pub fn with_vendor_name(mut self, name: impl Into<String>) -> Self {
        self.vendor_name = name.into();
        self
    }

    /// Set the assumed tax rate (decimal fraction).
    pub fn with_default_tax_rate(mut self, rate: Decimal) -> Self {
        self.default_tax_rate = rate;
        self
    }

    /// Set the tolerance for monetary equality checks.
    pub fn with_amount_epsilon(mut self, epsilon: Decimal) -> Self {
        self.amount_epsilon = epsilon;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Multiplier applied to a tax-exclusive amount to obtain the
    /// tax-inclusive one (1 + rate).
    pub fn gross_factor(&self) -> Decimal {
        Decimal::ONE + self.default_tax_rate
    }

    /// Default tax rate expressed as a percentage (20.0).
    pub fn default_tax_percent(&self) -> Decimal {
        self.default_tax_rate * Decimal::ONE_HUNDRED
    }
}
