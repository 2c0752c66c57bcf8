//! Parser variants.
//!
//! All variants drive the same rule-table engine; a dedicated type exists
//! only where control flow genuinely differs (domestic list vs the two
//! international layouts, plus the last-resort minimal pass).

use rust_decimal::Decimal;
use tracing::debug;

use crate::extract::locale::{rules_for, LocaleRules, DE_RULES, EN_RULES};
use crate::extract::rules::amounts::{extract_totals, find_amounts, format_amount};
use crate::extract::rules::dates::{extract_order_date, to_iso};
use crate::extract::rules::items::{extract_items, ItemLayout};
use crate::extract::rules::order_number::extract_order_number;
use crate::language::Language;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::ExtractedInvoice;

/// Trait for invoice field extraction strategies.
///
/// Extraction never fails: fields that do not match are simply absent from
/// the result.
pub trait InvoiceExtractor {
    /// Variant name recorded in processing metadata.
    fn name(&self) -> &'static str;

    /// Extract an invoice from preprocessed text.
    fn extract(&self, text: &str, config: &ExtractionConfig) -> ExtractedInvoice;
}

/// Shared rule-table engine behind every variant.
fn extract_with_rules(
    text: &str,
    rules: &LocaleRules,
    layout: ItemLayout,
    config: &ExtractionConfig,
    variant: &'static str,
) -> ExtractedInvoice {
    let mut invoice = ExtractedInvoice::new();
    invoice.processing.parser_variant = variant.to_string();

    if let Some(m) = extract_order_number(text, rules) {
        invoice.order_number = Some(m.value);
    }
    if let Some(m) = extract_order_date(text, rules) {
        invoice.order_date = Some(to_iso(m.value));
    }

    let totals = extract_totals(text, rules);
    invoice.processing.subtotal_markers = totals.subtotal_markers;

    let context_amounts: Vec<Decimal> = totals
        .subtotal
        .iter()
        .chain(totals.total.iter())
        .map(|m| m.value)
        .collect();

    invoice.items = extract_items(text, rules, layout, config, &context_amounts);

    invoice.subtotal = totals.subtotal.map(|m| m.raw);
    invoice.shipping = totals.shipping.map(|m| m.raw);
    invoice.tax = totals.tax.map(|m| m.raw);
    invoice.total = totals.total.map(|m| m.raw);
    invoice.discount = totals.discount.map(|m| m.raw);

    // No labeled subtotal: derive one from the item totals.
    if invoice.subtotal.is_none() && config.derive_subtotal {
        let item_totals: Vec<Decimal> = invoice
            .items
            .iter()
            .filter_map(|i| i.effective_total())
            .collect();
        if !item_totals.is_empty() {
            let sum: Decimal = item_totals.iter().sum();
            invoice.subtotal = Some(format_amount(sum, rules));
            invoice.processing.subtotal_derived = true;
        }
    }

    debug!(
        variant,
        order_number = ?invoice.order_number,
        items = invoice.items.len(),
        "extraction finished"
    );
    invoice
}

/// Parser for the US-domestic order summary layout.
pub struct DomesticParser;

impl InvoiceExtractor for DomesticParser {
    fn name(&self) -> &'static str {
        "domestic"
    }

    fn extract(&self, text: &str, config: &ExtractionConfig) -> ExtractedInvoice {
        extract_with_rules(text, &EN_RULES, ItemLayout::DomesticList, config, self.name())
    }
}

/// Parser for internationally-formatted invoices, in business or consumer
/// layout mode.
pub struct InternationalParser {
    rules: &'static LocaleRules,
    business: bool,
}

impl InternationalParser {
    /// Business (tabular) layout for the given language; German rules are
    /// the default for unsupported languages.
    pub fn business(language: Language) -> Self {
        Self {
            rules: international_rules(language),
            business: true,
        }
    }

    /// Consumer (block) layout for the given language.
    pub fn consumer(language: Language) -> Self {
        Self {
            rules: international_rules(language),
            business: false,
        }
    }
}

fn international_rules(language: Language) -> &'static LocaleRules {
    match language {
        Language::German | Language::French | Language::Spanish | Language::Italian => {
            rules_for(language)
        }
        _ => &DE_RULES,
    }
}

impl InvoiceExtractor for InternationalParser {
    fn name(&self) -> &'static str {
        if self.business {
            "international_business"
        } else {
            "international_consumer"
        }
    }

    fn extract(&self, text: &str, config: &ExtractionConfig) -> ExtractedInvoice {
        let layout = if self.business {
            ItemLayout::BusinessTable
        } else {
            ItemLayout::ConsumerBlocks
        };
        extract_with_rules(text, self.rules, layout, config, self.name())
    }
}

/// Last-resort parser: shape-validated order number, any calendar-valid
/// date, largest amount as the total. No items.
pub struct MinimalParser;

impl InvoiceExtractor for MinimalParser {
    fn name(&self) -> &'static str {
        "minimal"
    }

    fn extract(&self, text: &str, _config: &ExtractionConfig) -> ExtractedInvoice {
        let mut invoice = ExtractedInvoice::new();
        invoice.processing.parser_variant = self.name().to_string();

        for rules in [&*EN_RULES, &*DE_RULES] {
            if invoice.order_number.is_none() {
                if let Some(m) = extract_order_number(text, rules) {
                    invoice.order_number = Some(m.value);
                }
            }
            if invoice.order_date.is_none() {
                if let Some(m) = extract_order_date(text, rules) {
                    invoice.order_date = Some(to_iso(m.value));
                }
            }
        }

        // Whichever number style yields more hits is the document's style;
        // the largest amount is the best guess for the total.
        let us = find_amounts(text, &EN_RULES);
        let eu = find_amounts(text, &DE_RULES);
        let amounts = if eu.len() > us.len() { eu } else { us };
        invoice.total = amounts
            .into_iter()
            .max_by(|a, b| a.value.cmp(&b.value))
            .map(|m| m.raw);

        invoice
    }
}
