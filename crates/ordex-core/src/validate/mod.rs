//! Cross-field validation and data-quality scoring.
//!
//! Validation never fails: anything it cannot evaluate becomes a warning
//! on the result, not an error out of the engine. The score starts at 100
//! and only moves down as findings accumulate.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::extract::rules::amounts::{detect_currency, parse_amount_str};
use crate::models::config::ValidationConfig;
use crate::models::invoice::ExtractedInvoice;
use crate::models::validation::{Finding, Severity, ValidationResult};

/// Cross-field consistency checker.
pub struct ValidationEngine {
    config: ValidationConfig,
}

/// Mutable state threaded through the individual checks.
#[derive(Default)]
struct Collector {
    warnings: Vec<Finding>,
    errors: Vec<Finding>,
    extra_penalty: u32,
    forced_invalid: bool,
}

impl Collector {
    fn warn(&mut self, finding: Finding) {
        self.warnings.push(finding);
    }

    fn error(&mut self, finding: Finding) {
        self.errors.push(finding);
    }
}

impl ValidationEngine {
    /// Create an engine with default tolerances.
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Create an engine with explicit tolerances.
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate an extracted invoice.
    pub fn validate(&self, invoice: &ExtractedInvoice) -> ValidationResult {
        let mut c = Collector::default();

        self.check_math(invoice, &mut c);
        self.check_items_vs_subtotal(invoice, &mut c);
        self.check_duplicate_items(invoice, &mut c);
        self.check_price_sanity(invoice, &mut c);
        self.check_date(invoice, &mut c);
        self.check_currencies(invoice, &mut c);
        self.check_completeness(invoice, &mut c);

        let penalized_warnings = c
            .warnings
            .iter()
            .filter(|f| f.severity != Severity::Info)
            .count() as u32;
        let penalty = c.errors.len() as u32 * self.config.error_penalty as u32
            + penalized_warnings * self.config.warning_penalty as u32
            + c.extra_penalty;
        let score = 100u32.saturating_sub(penalty) as u8;

        let is_valid = c.errors.is_empty() && !c.forced_invalid;
        let summary = if c.errors.is_empty() && c.warnings.is_empty() {
            format!("no issues found; score {}/100", score)
        } else {
            format!(
                "{} error(s), {} warning(s); score {}/100",
                c.errors.len(),
                c.warnings.len(),
                score
            )
        };

        debug!(score, is_valid, "validation finished");

        ValidationResult {
            score,
            is_valid,
            warnings: c.warnings,
            errors: c.errors,
            summary,
        }
    }

    /// Check 1: total = subtotal + shipping + tax - discount.
    fn check_math(&self, invoice: &ExtractedInvoice, c: &mut Collector) {
        let (Some(subtotal), Some(total)) = (
            parsed(&invoice.subtotal, c),
            parsed(&invoice.total, c),
        ) else {
            return;
        };
        let shipping = parsed(&invoice.shipping, c).unwrap_or(Decimal::ZERO);
        let tax = parsed(&invoice.tax, c).unwrap_or(Decimal::ZERO);
        let discount = parsed(&invoice.discount, c).unwrap_or(Decimal::ZERO);

        let expected = subtotal + shipping + tax - discount;
        let diff = (expected - total).abs();

        // Multi-shipment orders repeat the subtotal block per shipment, so
        // the arithmetic gets a wider tolerance and a softer finding.
        let multi_shipment = invoice.processing.multi_shipment_hint()
            || (total > Decimal::ZERO && subtotal > total * dec(1.5));
        let tolerance = if multi_shipment {
            dec(self.config.math_tolerance * self.config.multi_shipment_multiplier)
        } else {
            dec(self.config.math_tolerance)
        };

        if diff <= tolerance {
            return;
        }

        if multi_shipment {
            c.warn(
                Finding::new(
                    "mathematical_inconsistency",
                    Severity::Low,
                    format!(
                        "totals differ by {} on a multi-shipment order (expected {}, found {})",
                        diff, expected, total
                    ),
                )
                .with_fields(&["subtotal", "shipping", "tax", "total"]),
            );
        } else {
            c.warn(
                Finding::new(
                    "mathematical_inconsistency",
                    Severity::Medium,
                    format!(
                        "subtotal + shipping + tax - discount = {}, but total is {}",
                        expected, total
                    ),
                )
                .with_fields(&["subtotal", "shipping", "tax", "total"]),
            );
            // Large relative deviations cost extra.
            if expected > Decimal::ZERO && diff / expected > dec(0.25) {
                c.extra_penalty += self.config.warning_penalty as u32;
            }
        }
    }

    /// Check 2: item totals vs the subtotal.
    fn check_items_vs_subtotal(&self, invoice: &ExtractedInvoice, c: &mut Collector) {
        let Some(subtotal) = parsed(&invoice.subtotal, c) else {
            return;
        };
        let item_totals: Vec<Decimal> = invoice
            .items
            .iter()
            .filter_map(|i| i.effective_total())
            .collect();
        if item_totals.is_empty() {
            return;
        }

        let sum: Decimal = item_totals.iter().sum();
        let diff = (sum - subtotal).abs();

        if diff > dec(self.config.item_subtotal_tolerance) {
            let critical = subtotal > Decimal::ZERO
                && diff / subtotal > dec(self.config.item_subtotal_critical_ratio);
            let severity = if critical {
                c.forced_invalid = true;
                Severity::Critical
            } else {
                Severity::High
            };
            c.error(
                Finding::new(
                    "item_subtotal_mismatch",
                    severity,
                    format!("line items sum to {}, subtotal is {}", sum, subtotal),
                )
                .with_fields(&["items", "subtotal"]),
            );
        } else if diff > dec(self.config.item_subtotal_floor) {
            c.warn(
                Finding::new(
                    "item_subtotal_drift",
                    Severity::Low,
                    format!("line items sum to {}, subtotal is {}", sum, subtotal),
                )
                .with_fields(&["items", "subtotal"]),
            );
        }
    }

    /// Check 3: items sharing a catalog id must share a unit price.
    fn check_duplicate_items(&self, invoice: &ExtractedInvoice, c: &mut Collector) {
        use std::collections::HashMap;

        let mut by_catalog: HashMap<&str, Vec<Decimal>> = HashMap::new();
        for item in &invoice.items {
            if let (Some(id), Some(price)) = (&item.catalog_id, item.unit_price) {
                by_catalog.entry(id).or_default().push(price);
            }
        }

        for (id, prices) in by_catalog {
            let divergent = prices.windows(2).any(|w| w[0] != w[1]);
            if divergent {
                c.forced_invalid = true;
                c.error(
                    Finding::new(
                        "duplicate_item_different_prices",
                        Severity::Critical,
                        format!("catalog id {} appears with differing unit prices", id),
                    )
                    .with_fields(&["items"]),
                );
            }
        }
    }

    /// Check 4: unit price magnitude, second line of defense against
    /// separator artifacts that slipped through extraction.
    fn check_price_sanity(&self, invoice: &ExtractedInvoice, c: &mut Collector) {
        for item in &invoice.items {
            let Some(price) = item.unit_price else {
                continue;
            };
            if price > dec(self.config.price_critical_threshold) {
                c.forced_invalid = true;
                c.error(
                    Finding::new(
                        "implausible_unit_price",
                        Severity::Critical,
                        format!("unit price {} for \"{}\"", price, item.description),
                    )
                    .with_fields(&["items"]),
                );
            } else if price > dec(self.config.price_warn_threshold) {
                c.warn(
                    Finding::new(
                        "suspicious_unit_price",
                        Severity::Medium,
                        format!("unit price {} for \"{}\"", price, item.description),
                    )
                    .with_fields(&["items"]),
                );
            }
        }
    }

    /// Check 5: order date presence and plausibility.
    fn check_date(&self, invoice: &ExtractedInvoice, c: &mut Collector) {
        let Some(raw) = &invoice.order_date else {
            c.warn(
                Finding::new("missing_order_date", Severity::Medium, "no order date extracted")
                    .with_fields(&["order_date"]),
            );
            return;
        };

        let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
            c.error(
                Finding::new(
                    "invalid_order_date",
                    Severity::High,
                    format!("order date \"{}\" is not a calendar date", raw),
                )
                .with_fields(&["order_date"]),
            );
            return;
        };

        // The epoch is a placeholder, never a real order date.
        if date == NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default() {
            c.error(
                Finding::new(
                    "invalid_order_date",
                    Severity::High,
                    "order date is the epoch placeholder",
                )
                .with_fields(&["order_date"]),
            );
            return;
        }

        let year = date.year();
        let current_year = Utc::now().year();
        if year > current_year + 1 || year < self.config.earliest_order_year {
            c.warn(
                Finding::new(
                    "implausible_order_year",
                    Severity::Low,
                    format!("order year {} is outside the plausible range", year),
                )
                .with_fields(&["order_date"]),
            );
        }
    }

    /// Check 6: currency consistency.
    fn check_currencies(&self, invoice: &ExtractedInvoice, c: &mut Collector) {
        use std::collections::BTreeSet;

        let invoice_currencies: BTreeSet<String> = [
            &invoice.subtotal,
            &invoice.shipping,
            &invoice.tax,
            &invoice.total,
            &invoice.discount,
        ]
        .into_iter()
        .flatten()
        .filter_map(|raw| detect_currency(raw))
        .collect();

        if invoice_currencies.len() > 1 {
            c.warn(
                Finding::new(
                    "mixed_invoice_currencies",
                    Severity::Medium,
                    format!("invoice fields mix currencies: {:?}", invoice_currencies),
                )
                .with_fields(&["subtotal", "shipping", "tax", "total"]),
            );
            return;
        }

        let item_currencies: BTreeSet<&str> = invoice
            .items
            .iter()
            .filter_map(|i| i.currency.as_deref())
            .collect();
        if item_currencies.len() > 1 {
            c.warn(
                Finding::new(
                    "mixed_item_currencies",
                    Severity::Info,
                    format!("item prices mix currencies: {:?}", item_currencies),
                )
                .with_fields(&["items"]),
            );
        }
    }

    /// Check 7: completeness and magnitude.
    fn check_completeness(&self, invoice: &ExtractedInvoice, c: &mut Collector) {
        if invoice.order_number.is_none() {
            c.error(
                Finding::new("missing_order_number", Severity::High, "no order number extracted")
                    .with_fields(&["order_number"]),
            );
        }
        if invoice.total.is_none() {
            c.error(
                Finding::new("missing_total", Severity::High, "no order total extracted")
                    .with_fields(&["total"]),
            );
        }

        if invoice.items.is_empty() {
            if let Some(subtotal) = parsed_quiet(&invoice.subtotal) {
                if subtotal > Decimal::ZERO {
                    c.warn(
                        Finding::new(
                            "empty_items_with_subtotal",
                            Severity::Medium,
                            "no line items despite a nonzero subtotal",
                        )
                        .with_fields(&["items", "subtotal"]),
                    );
                }
            }
        }

        if let Some(total) = parsed_quiet(&invoice.total) {
            if total <= Decimal::ZERO || total > dec(self.config.max_plausible_total) {
                c.warn(
                    Finding::new(
                        "implausible_total",
                        Severity::Low,
                        format!("order total {} is outside the plausible magnitude", total),
                    )
                    .with_fields(&["total"]),
                );
            }
        }
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a formatted monetary field; an unparsable value degrades to a
/// warning instead of failing the engine.
fn parsed(raw: &Option<String>, c: &mut Collector) -> Option<Decimal> {
    let raw = raw.as_ref()?;
    match parse_amount_str(raw) {
        Some(m) => Some(m.value),
        None => {
            c.warn(Finding::new(
                "unparsable_amount",
                Severity::Low,
                format!("monetary value \"{}\" could not be parsed", raw),
            ));
            None
        }
    }
}

fn parsed_quiet(raw: &Option<String>) -> Option<Decimal> {
    raw.as_ref()
        .and_then(|r| parse_amount_str(r))
        .map(|m| m.value)
}

fn dec(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::LineItem;
    use std::str::FromStr;

    fn money(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn item(desc: &str, price: &str, qty: u32) -> LineItem {
        let mut item = LineItem::new(desc);
        item.quantity = qty;
        item.unit_price = Some(Decimal::from_str(price).unwrap());
        item.total_price = item.unit_price.map(|p| p * Decimal::from(qty));
        item.currency = Some("$".to_string());
        item
    }

    /// Clean single-item domestic order used as a baseline.
    fn clean_invoice() -> ExtractedInvoice {
        let mut invoice = ExtractedInvoice::new();
        invoice.order_number = Some("123-4567890-1234567".to_string());
        invoice.order_date = Some("2023-12-15".to_string());
        invoice.items = vec![item("Echo Dot", "129.99", 1)];
        invoice.subtotal = money("$129.99");
        invoice.shipping = money("$0.00");
        invoice.tax = money("$10.40");
        invoice.total = money("$140.39");
        invoice
    }

    #[test]
    fn test_clean_invoice_is_valid() {
        let result = ValidationEngine::new().validate(&clean_invoice());
        assert!(result.is_valid);
        assert!(result.score >= 90, "score was {}", result.score);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_one_error_drops_score_and_validity() {
        let mut invoice = clean_invoice();
        invoice.order_number = None;
        let result = ValidationEngine::new().validate(&invoice);
        assert!(!result.is_valid);
        assert!(result.score <= 80);
        assert!(result.finding("missing_order_number").is_some());
    }

    #[test]
    fn test_math_inconsistency_is_warning_not_error() {
        // Scenario: 100 + 10 + 5 vs a total of 200, no multi-shipment hints.
        let mut invoice = clean_invoice();
        invoice.subtotal = money("$100.00");
        invoice.shipping = money("$10.00");
        invoice.tax = money("$5.00");
        invoice.total = money("$200.00");
        invoice.items = vec![item("Echo Dot", "100.00", 1)];

        let result = ValidationEngine::new().validate(&invoice);
        let finding = result.finding("mathematical_inconsistency").unwrap();
        assert_eq!(finding.severity, Severity::Medium);
        assert!(result.score < 100);
        assert!(result.errors.is_empty());
        assert!(result.is_valid);
    }

    #[test]
    fn test_multi_shipment_widens_tolerance() {
        let mut invoice = clean_invoice();
        invoice.subtotal = money("$100.00");
        invoice.shipping = money("$0.00");
        invoice.tax = money("$0.00");
        invoice.total = money("$100.15");
        invoice.items = vec![item("Echo Dot", "100.00", 1)];
        invoice.processing.subtotal_markers = 2;

        // 0.15 is beyond the base tolerance but inside the widened one.
        let result = ValidationEngine::new().validate(&invoice);
        assert!(result.finding("mathematical_inconsistency").is_none());
    }

    #[test]
    fn test_multi_shipment_mismatch_is_soft() {
        let mut invoice = clean_invoice();
        invoice.subtotal = money("$300.00");
        invoice.shipping = money("$0.00");
        invoice.tax = money("$0.00");
        invoice.total = money("$100.00");
        invoice.items.clear();
        invoice.processing.subtotal_markers = 3;

        let result = ValidationEngine::new().validate(&invoice);
        let finding = result.finding("mathematical_inconsistency").unwrap();
        assert_eq!(finding.severity, Severity::Low);
    }

    #[test]
    fn test_item_subtotal_mismatch_critical() {
        let mut invoice = clean_invoice();
        invoice.items = vec![item("Echo Dot", "100.00", 1)];
        invoice.subtotal = money("$129.99");

        let result = ValidationEngine::new().validate(&invoice);
        let finding = result.finding("item_subtotal_mismatch").unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_item_subtotal_small_drift_is_low_warning() {
        let mut invoice = clean_invoice();
        invoice.items = vec![item("Echo Dot", "129.49", 1)];

        let result = ValidationEngine::new().validate(&invoice);
        let finding = result.finding("item_subtotal_drift").unwrap();
        assert_eq!(finding.severity, Severity::Low);
        assert!(result.is_valid);
    }

    #[test]
    fn test_duplicate_catalog_ids_with_different_prices() {
        let mut invoice = clean_invoice();
        let mut a = item("Widget", "50.00", 1);
        a.catalog_id = Some("B0ABCD1234".to_string());
        let mut b = item("Widget", "60.00", 1);
        b.catalog_id = Some("B0ABCD1234".to_string());
        invoice.items = vec![a, b];
        invoice.subtotal = money("$110.00");
        invoice.total = money("$120.40");

        let result = ValidationEngine::new().validate(&invoice);
        assert!(!result.is_valid);
        assert!(result.finding("duplicate_item_different_prices").is_some());
    }

    #[test]
    fn test_price_sanity_thresholds() {
        let mut invoice = clean_invoice();
        invoice.items = vec![item("Server rack", "20000.00", 1)];
        invoice.subtotal = money("$20000.00");
        invoice.tax = money("$0.00");
        invoice.shipping = money("$0.00");
        invoice.total = money("$20000.00");
        let result = ValidationEngine::new().validate(&invoice);
        assert!(result.finding("suspicious_unit_price").is_some());
        assert!(result.is_valid);

        invoice.items = vec![item("Typo", "117646.00", 1)];
        invoice.subtotal = money("$117646.00");
        invoice.total = money("$117646.00");
        let result = ValidationEngine::new().validate(&invoice);
        assert!(result.finding("implausible_unit_price").is_some());
        assert!(!result.is_valid);
    }

    #[test]
    fn test_missing_date_warns_and_placeholder_errors() {
        let mut invoice = clean_invoice();
        invoice.order_date = None;
        let result = ValidationEngine::new().validate(&invoice);
        assert!(result.finding("missing_order_date").is_some());
        assert!(result.is_valid);

        invoice.order_date = Some("1970-01-01".to_string());
        let result = ValidationEngine::new().validate(&invoice);
        assert!(result.finding("invalid_order_date").is_some());
        assert!(!result.is_valid);
    }

    #[test]
    fn test_implausible_year_is_low_warning() {
        let mut invoice = clean_invoice();
        invoice.order_date = Some("1993-06-01".to_string());
        let result = ValidationEngine::new().validate(&invoice);
        let finding = result.finding("implausible_order_year").unwrap();
        assert_eq!(finding.severity, Severity::Low);
        assert!(result.is_valid);
    }

    #[test]
    fn test_mixed_invoice_currencies() {
        let mut invoice = clean_invoice();
        invoice.tax = money("12,80 €");
        let result = ValidationEngine::new().validate(&invoice);
        let finding = result.finding("mixed_invoice_currencies").unwrap();
        assert_eq!(finding.severity, Severity::Medium);
    }

    #[test]
    fn test_mixed_item_currencies_is_informational() {
        let mut invoice = clean_invoice();
        let mut other = item("Adapter", "0.00", 1);
        other.currency = Some("€".to_string());
        invoice.items.push(other);
        invoice.subtotal = money("$129.99");

        let before = ValidationEngine::new().validate(&clean_invoice());
        let result = ValidationEngine::new().validate(&invoice);
        let finding = result.finding("mixed_item_currencies").unwrap();
        assert_eq!(finding.severity, Severity::Info);
        // Informational findings carry no penalty.
        assert_eq!(result.score, before.score);
    }

    #[test]
    fn test_empty_items_with_subtotal() {
        let mut invoice = clean_invoice();
        invoice.items.clear();
        let result = ValidationEngine::new().validate(&invoice);
        assert!(result.finding("empty_items_with_subtotal").is_some());
    }

    #[test]
    fn test_implausible_total_magnitude() {
        let mut invoice = clean_invoice();
        invoice.total = money("$2,000,000.00");
        let result = ValidationEngine::new().validate(&invoice);
        assert!(result.finding("implausible_total").is_some());
    }
}
