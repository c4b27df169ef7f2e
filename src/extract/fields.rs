//! Label-to-field mapping table and the strategies that read each field.
//!
//! Markup changes on the site should only require editing
//! [`FieldTable::default`], not the extraction code.

use super::{element_text, split_case_boundaries};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static LABEL_CONTAINERS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, div, li, td, th, dt, dd").expect("valid selector"));
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, strong, b").expect("valid selector"));

/// Detail page attributes read through the field table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BodyType,
    FuelType,
    Transmission,
    Colour,
    Odometer,
    Vin,
    Seats,
    Location,
    Features,
    Condition,
}

/// How a field is located in the page
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Text of a block or table cell starting with `<label>:`, any of the aliases
    Label(Vec<String>),
    /// Bulleted list following a heading that matches `heading`
    SiblingList { heading: Regex, separator: String },
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: Field,
    pub strategy: Strategy,
}

impl FieldRule {
    pub fn label(field: Field, aliases: &[&str]) -> Self {
        Self {
            field,
            strategy: Strategy::Label(aliases.iter().map(|a| a.to_string()).collect()),
        }
    }

    /// `heading` is matched case-insensitively
    pub fn sibling_list(field: Field, heading: &str, separator: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            field,
            strategy: Strategy::SiblingList {
                heading: Regex::new(&format!("(?i){}", heading))?,
                separator: separator.to_string(),
            },
        })
    }
}

/// Ordered rules; the first rule for a field that yields a value wins
#[derive(Debug, Clone)]
pub struct FieldTable {
    rules: Vec<FieldRule>,
}

impl FieldTable {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn extract(&self, document: &Html, field: Field) -> Option<String> {
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .find_map(|rule| match &rule.strategy {
                Strategy::Label(aliases) => aliases.iter().find_map(|a| extract_label(document, a)),
                Strategy::SiblingList { heading, separator } => {
                    extract_sibling_list(document, heading, separator)
                }
            })
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        let mut rules = vec![
            FieldRule::label(Field::BodyType, &["Body Type", "Body"]),
            FieldRule::label(Field::FuelType, &["Fuel Type", "Fuel"]),
            FieldRule::label(Field::Transmission, &["Transmission", "Gearbox"]),
            FieldRule::label(Field::Colour, &["Exterior Colour", "Colour", "Color"]),
            FieldRule::label(
                Field::Odometer,
                &["Indicated Odometer Reading", "Odometer Reading", "Odometer"],
            ),
            FieldRule::label(Field::Vin, &["VIN", "Chassis No"]),
            FieldRule::label(Field::Seats, &["No. of Seats", "Number of Seats", "Seats"]),
            FieldRule::label(Field::Location, &["Location", "Lot Location"]),
        ];
        rules.extend(
            [
                FieldRule::sibling_list(Field::Features, r"^\s*features", ", "),
                FieldRule::sibling_list(Field::Condition, r"condition\s+assessment", "\n"),
            ]
            .into_iter()
            .map(|rule| rule.expect("valid heading pattern")),
        );
        Self::new(rules)
    }
}

/// Remainder after `label:` when `text` starts with it, ignoring ASCII case
fn strip_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let head = text.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    text[label.len()..].trim_start().strip_prefix(':').map(str::trim)
}

fn is_cell(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "td" | "th" | "dt")
}

fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Scan block and table-cell elements for `label: value`.
///
/// Nested containers all start with the same text, so the match with the
/// shortest text (the innermost element) is used.
pub fn extract_label(document: &Html, label: &str) -> Option<String> {
    let mut best: Option<(usize, String)> = None;

    for element in document.select(&LABEL_CONTAINERS) {
        let text = element_text(element);
        let Some(rest) = strip_label(&text, label) else {
            continue;
        };

        let value = if rest.is_empty() && is_cell(element) {
            match next_element_sibling(element) {
                Some(cell) => element_text(cell),
                None => continue,
            }
        } else {
            rest.to_string()
        };

        if value.is_empty() {
            continue;
        }
        if best.as_ref().is_none_or(|(len, _)| text.len() < *len) {
            best = Some((text.len(), value));
        }
    }

    best.map(|(_, value)| split_case_boundaries(&value))
}

/// Items of the first list after a heading matching `heading`.
///
/// When the heading sits inside a paragraph, the list is looked up among the
/// paragraph's following siblings.
pub fn extract_sibling_list(document: &Html, heading: &Regex, separator: &str) -> Option<String> {
    for title in document.select(&HEADINGS) {
        if !heading.is_match(&element_text(title)) {
            continue;
        }

        let anchor = title
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|parent| parent.value().name() == "p")
            .unwrap_or(title);

        for sibling in anchor.next_siblings().filter_map(ElementRef::wrap) {
            match sibling.value().name() {
                "ul" | "ol" => {
                    let items: Vec<String> = sibling
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|li| li.value().name() == "li")
                        .map(element_text)
                        .filter(|item| !item.is_empty())
                        .collect();
                    if !items.is_empty() {
                        return Some(items.join(separator));
                    }
                    break;
                }
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => break,
                _ => {}
            }
        }
    }
    None
}
