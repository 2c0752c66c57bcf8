//! Line item extraction.
//!
//! Three layouts share one item model: the domestic "N of: description"
//! list, the international consumer block (catalog id line followed by
//! prices), and the international business table (one row per line).

use rust_decimal::Decimal;
use tracing::debug;

use crate::extract::locale::LocaleRules;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::LineItem;

use super::amounts::{find_amount, find_amounts, MoneyMatch};
use super::patterns::{CATALOG_ID, QUANTITY_MARKER, QUANTITY_OF};

/// Item listing layout, decided by the routed parser variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLayout {
    /// "1 of: Echo Dot   $129.99" lists.
    DomesticList,
    /// Catalog-id-anchored blocks with prices on following lines.
    ConsumerBlocks,
    /// Tabular rows with several amounts per line.
    BusinessTable,
}

/// Extract the ordered item list.
///
/// `context_amounts` carries invoice-level subtotal/total values used to
/// disambiguate unit prices that look like a dropped thousands separator.
pub fn extract_items(
    text: &str,
    rules: &LocaleRules,
    layout: ItemLayout,
    config: &ExtractionConfig,
    context_amounts: &[Decimal],
) -> Vec<LineItem> {
    let items = match layout {
        ItemLayout::DomesticList => extract_domestic_list(text, rules, config),
        ItemLayout::ConsumerBlocks => extract_consumer_blocks(text, rules, config, context_amounts),
        ItemLayout::BusinessTable => extract_business_table(text, rules, config, context_amounts),
    };

    debug!(count = items.len(), ?layout, "extracted line items");
    items
}

fn extract_domestic_list(
    text: &str,
    rules: &LocaleRules,
    config: &ExtractionConfig,
) -> Vec<LineItem> {
    let lines: Vec<&str> = text.lines().collect();
    let mut items = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = QUANTITY_OF.captures(line) else {
            continue;
        };
        let quantity: u32 = caps[1].parse().unwrap_or(1).max(1);
        let remainder = caps[2].to_string();

        // Price on the same line, or within the lookahead window.
        let mut price = find_amount(&remainder, rules);
        if price.is_none() {
            for follow in lines.iter().skip(i + 1).take(config.item_price_window) {
                price = find_amount(follow, rules);
                if price.is_some() {
                    break;
                }
            }
        }

        let description = match &price {
            Some(m) => remainder.replace(&m.raw, "").trim().to_string(),
            None => remainder.trim().to_string(),
        };
        if description.is_empty() {
            continue;
        }

        let mut item = LineItem::new(description);
        item.quantity = quantity;
        item.catalog_id = CATALOG_ID
            .captures(line)
            .map(|caps| caps[1].to_string());
        if let Some(price) = price {
            item.unit_price = Some(price.value);
            item.total_price = Some(price.value * Decimal::from(quantity));
            item.currency = price.currency;
        }
        items.push(item);
    }

    items
}

fn extract_consumer_blocks(
    text: &str,
    rules: &LocaleRules,
    config: &ExtractionConfig,
    context_amounts: &[Decimal],
) -> Vec<LineItem> {
    let lines: Vec<&str> = text.lines().collect();
    let mut items = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = CATALOG_ID.captures(line) else {
            continue;
        };
        let catalog_id = caps[1].to_string();

        // Description: the catalog line minus the id, or the previous
        // non-empty line when the id stands alone.
        let mut description = line.replace(&catalog_id, "").trim().to_string();
        if description.is_empty() {
            description = lines[..i]
                .iter()
                .rev()
                .find(|l| !l.trim().is_empty())
                .map(|l| l.trim().to_string())
                .unwrap_or_default();
        }
        if description.is_empty() {
            description = catalog_id.clone();
        }

        // Gather amounts on the catalog line and the window below it; the
        // next item or a summary label ends the window.
        let mut amounts: Vec<MoneyMatch> = find_amounts(line, rules);
        for follow in lines.iter().skip(i + 1).take(config.item_price_window) {
            if CATALOG_ID.is_match(follow)
                || rules.subtotal_label.is_match(follow)
                || rules.total_label.is_match(follow)
                || rules.shipping_label.is_match(follow)
            {
                break;
            }
            amounts.extend(find_amounts(follow, rules));
        }

        let quantity = window_quantity(&lines, i, config).unwrap_or(1);

        let mut item = LineItem::new(description);
        item.quantity = quantity;
        item.catalog_id = Some(catalog_id);

        if let Some(first) = amounts.first() {
            let mut neighbors: Vec<Decimal> =
                amounts.iter().skip(1).map(|m| m.value).collect();
            neighbors.extend_from_slice(context_amounts);

            let unit = if config.correct_separator_artifacts {
                correct_dropped_separator(first.value, &neighbors)
            } else {
                first.value
            };
            item.unit_price = Some(unit);
            item.currency = first.currency.clone();
            item.total_price = amounts
                .get(1)
                .map(|m| m.value)
                .or(Some(unit * Decimal::from(quantity)));
        }

        items.push(item);
    }

    items
}

fn extract_business_table(
    text: &str,
    rules: &LocaleRules,
    config: &ExtractionConfig,
    context_amounts: &[Decimal],
) -> Vec<LineItem> {
    use crate::classify::signatures::ITEM_TABLE_HEADER;

    let Some(header) = ITEM_TABLE_HEADER.find(text) else {
        // No table header; the consumer block strategy is the fallback.
        return extract_consumer_blocks(text, rules, config, context_amounts);
    };

    let mut items = Vec::new();
    for line in text[header.end()..].lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Summary rows end the table.
        if rules.subtotal_label.is_match(line) || rules.total_label.is_match(line) {
            break;
        }

        let amounts = find_amounts(line, rules);
        let Some(first) = amounts.first() else {
            continue;
        };

        let mut description = line[..line.find(first.raw.as_str()).unwrap_or(line.len())]
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ' ')
            .trim()
            .to_string();
        description = QUANTITY_MARKER.replace(&description, "").trim().to_string();
        let catalog_id = CATALOG_ID.captures(line).map(|caps| caps[1].to_string());
        if let Some(id) = &catalog_id {
            description = description.replace(id, "").trim().to_string();
        }
        if description.is_empty() {
            continue;
        }

        let quantity = QUANTITY_MARKER
            .captures(line)
            .and_then(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .and_then(|m| m.as_str().parse().ok())
            })
            .unwrap_or(1);

        let mut neighbors: Vec<Decimal> = amounts.iter().skip(1).map(|m| m.value).collect();
        neighbors.extend_from_slice(context_amounts);
        let unit = if config.correct_separator_artifacts {
            correct_dropped_separator(first.value, &neighbors)
        } else {
            first.value
        };

        let mut item = LineItem::new(description);
        item.quantity = quantity;
        item.catalog_id = catalog_id;
        item.unit_price = Some(unit);
        item.total_price = amounts
            .last()
            .filter(|_| amounts.len() >= 2)
            .map(|m| m.value)
            .or(Some(unit * Decimal::from(quantity)));
        item.currency = first.currency.clone();
        items.push(item);
    }

    items
}

fn window_quantity(lines: &[&str], index: usize, config: &ExtractionConfig) -> Option<u32> {
    lines
        .iter()
        .skip(index)
        .take(config.item_price_window + 1)
        .find_map(|line| {
            QUANTITY_MARKER.captures(line).and_then(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .and_then(|m| m.as_str().parse().ok())
            })
        })
}

/// Correct a unit price whose thousands separator was dropped upstream.
///
/// "1176,46" printed next to a line total of "176,46" is really "1 176,46"
/// misread: the candidate minus an adjacent sub-1000 amount leaves an exact
/// multiple of 1000, so the adjacent amount is the true unit price.
pub fn correct_dropped_separator(candidate: Decimal, neighbors: &[Decimal]) -> Decimal {
    let thousand = Decimal::from(1000);
    if candidate < thousand {
        return candidate;
    }
    for neighbor in neighbors {
        if *neighbor < thousand && *neighbor > Decimal::ZERO && candidate > *neighbor {
            let diff = candidate - *neighbor;
            if diff % thousand == Decimal::ZERO {
                debug!(%candidate, corrected = %neighbor, "corrected dropped thousands separator");
                return *neighbor;
            }
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::locale::{DE_RULES, EN_RULES};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn test_domestic_list() {
        let text = "Items Ordered\n1 of: Echo Dot (4th Gen) $129.99\n2 of: USB-C Cable $14.99";
        let items = extract_items(text, &EN_RULES, ItemLayout::DomesticList, &config(), &[]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "Echo Dot (4th Gen)");
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].unit_price, Some(dec("129.99")));
        assert_eq!(items[1].quantity, 2);
        assert_eq!(items[1].total_price, Some(dec("29.98")));
    }

    #[test]
    fn test_domestic_price_on_following_line() {
        let text = "1 of: Kindle Paperwhite\n$149.99";
        let items = extract_items(text, &EN_RULES, ItemLayout::DomesticList, &config(), &[]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, Some(dec("149.99")));
    }

    #[test]
    fn test_consumer_blocks() {
        let text = "B0ABCD1234 Kaffeemaschine\n1 x\n89,99 €\n89,99 €";
        let items = extract_items(text, &DE_RULES, ItemLayout::ConsumerBlocks, &config(), &[]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].catalog_id.as_deref(), Some("B0ABCD1234"));
        assert_eq!(items[0].description, "Kaffeemaschine");
        assert_eq!(items[0].unit_price, Some(dec("89.99")));
        assert_eq!(items[0].total_price, Some(dec("89.99")));
    }

    #[test]
    fn test_dropped_separator_corrected_by_adjacent_total() {
        let text = "B0XY12ZT9Q Monitorhalterung\n1176,46 €\n176,46 €";
        let items = extract_items(text, &DE_RULES, ItemLayout::ConsumerBlocks, &config(), &[]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, Some(dec("176.46")));
    }

    #[test]
    fn test_dropped_separator_left_alone_without_evidence() {
        // Both amounts agree at 1176,46; nothing says the separator dropped.
        let text = "B0XY12ZT9Q Monitorhalterung\n1176,46 €\n1176,46 €";
        let items = extract_items(text, &DE_RULES, ItemLayout::ConsumerBlocks, &config(), &[]);
        assert_eq!(items[0].unit_price, Some(dec("1176.46")));
    }

    #[test]
    fn test_correct_dropped_separator_math() {
        assert_eq!(
            correct_dropped_separator(dec("1176.46"), &[dec("176.46")]),
            dec("176.46")
        );
        // Not an exact multiple of 1000 apart: leave it.
        assert_eq!(
            correct_dropped_separator(dec("1176.46"), &[dec("176.45")]),
            dec("1176.46")
        );
        // Candidate below 1000 is never touched.
        assert_eq!(correct_dropped_separator(dec("176.46"), &[dec("76.46")]), dec("176.46"));
    }

    #[test]
    fn test_business_table() {
        let text = "Pos. Artikel Menge Preis Summe\n\
                    1 B0AAAA1111 Druckerpapier Menge: 2 24,50 € 49,00 €\n\
                    2 B0BBBB2222 Toner Menge: 1 89,00 € 89,00 €\n\
                    Zwischensumme: 138,00 €";
        let items = extract_items(text, &DE_RULES, ItemLayout::BusinessTable, &config(), &[]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].unit_price, Some(dec("24.50")));
        assert_eq!(items[0].total_price, Some(dec("49.00")));
        assert_eq!(items[1].catalog_id.as_deref(), Some("B0BBBB2222"));
    }

    #[test]
    fn test_empty_text_yields_no_items() {
        let items = extract_items("", &EN_RULES, ItemLayout::DomesticList, &config(), &[]);
        assert!(items.is_empty());
    }
}
