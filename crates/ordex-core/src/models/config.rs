//! Configuration structures for the extraction pipeline.
//!
//! Every empirically tuned threshold lives here rather than as a hard-coded
//! invariant, so deployments can adjust them without a rebuild.

use serde::{Deserialize, Serialize};

/// Main configuration for the ordex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdexConfig {
    /// Format classification configuration.
    pub classify: ClassifyConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Validation configuration.
    pub validation: ValidationConfig,

    /// Recovery configuration.
    pub recovery: RecoveryConfig,
}

/// Format classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Minimum signature score for a format to be considered resolved.
    pub ambiguity_cutoff: u32,

    /// Confidence penalty applied when both formats score above the cutoff.
    pub ambiguity_penalty: u8,

    /// Floor for banded confidence after penalties.
    pub confidence_floor: u8,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            ambiguity_cutoff: 25,
            ambiguity_penalty: 15,
            confidence_floor: 15,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Correct unit prices that look like a dropped thousands separator.
    pub correct_separator_artifacts: bool,

    /// Derive the subtotal from line item totals when no labeled subtotal
    /// is present.
    pub derive_subtotal: bool,

    /// Maximum lines to scan after a catalog id when gathering item prices.
    pub item_price_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            correct_separator_artifacts: true,
            derive_subtotal: true,
            item_price_window: 3,
        }
    }
}

/// Validation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Absolute tolerance for the total = subtotal + shipping + tax check.
    pub math_tolerance: f64,

    /// Tolerance multiplier for orders detected as multi-shipment.
    pub multi_shipment_multiplier: f64,

    /// Absolute tolerance for item totals vs the subtotal.
    pub item_subtotal_tolerance: f64,

    /// Floor below which item/subtotal deviations are ignored.
    pub item_subtotal_floor: f64,

    /// Relative deviation (fraction of subtotal) that escalates an
    /// item/subtotal mismatch to critical.
    pub item_subtotal_critical_ratio: f64,

    /// Unit price above which a warning is raised.
    pub price_warn_threshold: f64,

    /// Unit price above which a critical error is raised.
    pub price_critical_threshold: f64,

    /// Earliest plausible order year (platform inception).
    pub earliest_order_year: i32,

    /// Largest plausible order total.
    pub max_plausible_total: f64,

    /// Score penalty per error finding.
    pub error_penalty: u8,

    /// Score penalty per warning finding.
    pub warning_penalty: u8,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            math_tolerance: 0.05,
            multi_shipment_multiplier: 4.0,
            item_subtotal_tolerance: 1.00,
            item_subtotal_floor: 0.10,
            item_subtotal_critical_ratio: 0.10,
            price_warn_threshold: 10_000.0,
            price_critical_threshold: 100_000.0,
            earliest_order_year: 1995,
            max_plausible_total: 1_000_000.0,
            error_penalty: 20,
            warning_penalty: 5,
        }
    }
}

/// Error recovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Minimum overall confidence for a recovery record to be usable.
    pub min_usable_confidence: f32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            min_usable_confidence: 0.3,
        }
    }
}

impl OrdexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
