//! HTML heuristics that turn auction pages into vehicle records.
//!
//! Nothing in here returns an error: a field that cannot be read is simply
//! left at its default.

pub mod detail;
pub mod fields;
pub mod links;

pub use detail::parse_vehicle;
pub use fields::{Field, FieldRule, FieldTable, Strategy};
pub use links::{collect_lot_links, LinkRules};

use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Collapse runs of whitespace into single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element, whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Visible text of the whole document, one space between text nodes
pub fn document_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    normalize_whitespace(&out)
}

/// Put a `, ` between a lowercase letter directly followed by an uppercase one.
///
/// List items rendered without separators come out of the DOM as
/// "Air ConditioningPower Steering".
pub fn split_case_boundaries(text: &str) -> String {
    CASE_BOUNDARY.replace_all(text, "$1, $2").into_owned()
}

/// Parse a number after dropping everything but digits and dots
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse the leading run of digits, e.g. "12 bids" -> 12
pub fn leading_digits<T: std::str::FromStr>(text: &str) -> Option<T> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_strips_currency() {
        assert_eq!(parse_number("$12,345"), Some(12345.0));
        assert_eq!(parse_number("123,456 km"), Some(123456.0));
        assert_eq!(parse_number("AU $1,250.50"), Some(1250.5));
    }

    #[test]
    fn parse_number_without_digits_is_none() {
        assert_eq!(parse_number("Contact seller"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("1.2.3"), None);
    }

    #[test]
    fn case_boundaries_get_separated() {
        assert_eq!(
            split_case_boundaries("Air ConditioningPower SteeringCruise Control"),
            "Air Conditioning, Power Steering, Cruise Control"
        );
        assert_eq!(split_case_boundaries("JTDBR32E"), "JTDBR32E");
    }

    #[test]
    fn document_text_skips_scripts() {
        let doc = Html::parse_document(
            "<html><body><p>3 bids</p><script>var x = '99 bids';</script><p>Lot</p></body></html>",
        );
        let text = document_text(&doc);
        assert!(text.contains("3 bids"));
        assert!(!text.contains("99"));
    }

    #[test]
    fn leading_digits_reads_prefix() {
        assert_eq!(leading_digits::<u32>("14 bids"), Some(14));
        assert_eq!(leading_digits::<u32>("bids"), None);
    }
}
