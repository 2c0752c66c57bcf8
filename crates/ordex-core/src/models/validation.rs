//! Validation result types.

use serde::{Deserialize, Serialize};

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// A single data-quality finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Machine-readable finding kind, e.g. `duplicate_item_different_prices`.
    pub kind: String,

    /// Severity of the finding.
    pub severity: Severity,

    /// Human-readable description.
    pub message: String,

    /// Invoice fields involved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl Finding {
    pub fn new(kind: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            severity,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}

/// Result of cross-field validation. Fresh per validation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Data quality score, 0-100. Never negative; only decreases as
    /// findings accumulate.
    pub score: u8,

    /// False whenever any error exists or a check forced invalidity.
    pub is_valid: bool,

    /// Non-fatal findings, in check order.
    pub warnings: Vec<Finding>,

    /// Fatal findings, in check order.
    pub errors: Vec<Finding>,

    /// One-line summary of the outcome.
    pub summary: String,
}

impl ValidationResult {
    /// Look up a finding by kind across both lists.
    pub fn finding(&self, kind: &str) -> Option<&Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .find(|f| f.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_finding_lookup() {
        let result = ValidationResult {
            score: 80,
            is_valid: false,
            warnings: vec![Finding::new("missing_order_date", Severity::Medium, "no date")],
            errors: vec![Finding::new("missing_total", Severity::High, "no total")],
            summary: String::new(),
        };
        assert!(result.finding("missing_total").is_some());
        assert!(result.finding("missing_order_date").is_some());
        assert!(result.finding("nonexistent").is_none());
    }
}
