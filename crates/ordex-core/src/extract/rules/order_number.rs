//! Order number extraction and shape validation.

use crate::extract::locale::LocaleRules;

use super::patterns::{ORDER_NUMBER, ORDER_NUMBER_CANDIDATE};
use super::ExtractionMatch;

/// Check the 3-7-7 digit-group shape of a marketplace order number.
///
/// Near-misses (wrong group count, wrong group length, non-digits) are
/// rejected; the caller treats that as a silent no-match.
pub fn is_valid_order_number(candidate: &str) -> bool {
    let groups: Vec<&str> = candidate.split('-').collect();
    if groups.len() != 3 {
        return false;
    }
    let lengths = [3, 7, 7];
    groups
        .iter()
        .zip(lengths.iter())
        .all(|(group, len)| group.len() == *len && group.chars().all(|c| c.is_ascii_digit()))
}

/// Extract the order number, labeled line first, standalone pattern second.
pub fn extract_order_number(text: &str, rules: &LocaleRules) -> Option<ExtractionMatch<String>> {
    // Labeled: anything after the label is a candidate, but it still has
    // to decompose into the 3-7-7 shape.
    if let Some(caps) = rules.order_number_label.captures(text) {
        if let Some(candidate) = ORDER_NUMBER_CANDIDATE.captures(&caps[1]) {
            let value = candidate[1].to_string();
            if is_valid_order_number(&value) {
                return Some(ExtractionMatch::new(value, 0.95, caps[1].trim()));
            }
        }
    }

    // Standalone: the strict pattern already encodes the shape.
    ORDER_NUMBER.captures(text).map(|caps| {
        let full = caps.get(0).unwrap();
        ExtractionMatch::new(full.as_str().to_string(), 0.8, full.as_str())
            .with_position(full.start(), full.end())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::locale::{DE_RULES, EN_RULES};

    #[test]
    fn test_shape_validation() {
        assert!(is_valid_order_number("123-4567890-1234567"));
        assert!(!is_valid_order_number("123-456789-1234567")); // short middle group
        assert!(!is_valid_order_number("1234-567890-1234567")); // wrong lengths
        assert!(!is_valid_order_number("123-4567890")); // two groups
        assert!(!is_valid_order_number("123-4567890-1234567-8")); // four groups
        assert!(!is_valid_order_number("abc-4567890-1234567")); // non-digits
    }

    #[test]
    fn test_labeled_extraction() {
        let text = "Order #123-4567890-1234567\nOrder Placed: December 15, 2023";
        let m = extract_order_number(text, &EN_RULES).unwrap();
        assert_eq!(m.value, "123-4567890-1234567");
        assert!(m.confidence > 0.9);
    }

    #[test]
    fn test_labeled_extraction_german() {
        let text = "Bestellnummer: 304-1234567-7654321";
        let m = extract_order_number(text, &DE_RULES).unwrap();
        assert_eq!(m.value, "304-1234567-7654321");
    }

    #[test]
    fn test_near_miss_rejected_falls_back() {
        // The labeled candidate is malformed; the standalone pattern later
        // in the text still matches.
        let text = "Order #12-345\nref 123-4567890-1234567 enclosed";
        let m = extract_order_number(text, &EN_RULES).unwrap();
        assert_eq!(m.value, "123-4567890-1234567");
    }

    #[test]
    fn test_no_match() {
        assert!(extract_order_number("no identifiers here", &EN_RULES).is_none());
        assert!(extract_order_number("almost: 123-456789-1234567", &EN_RULES).is_none());
    }
}
