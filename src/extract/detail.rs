use super::fields::{Field, FieldTable};
use super::{document_text, element_text, leading_digits, parse_number};
use crate::models::{ListingStatus, VehicleRecord};
use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static TITLE_HEADINGS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    ["h1", "h2", "h3"].map(|tag| Selector::parse(tag).expect("valid selector"))
});
static PRICE_TAG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="price"]"#).expect("valid selector"));
static COUNTDOWN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#lot-closing-countdown").expect("valid selector"));
static DOLLAR_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([0-9,]+)").expect("valid regex"));
static BID_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+bids?\b").expect("valid regex"));
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+h\s+\d+m\s+\d+s|\d+\s+days?|\d+\s+hours?)").expect("valid regex")
});

/// Australian state and territory codes accepted as a lot location
pub const REGIONS: &[&str] = &["ACT", "NSW", "NT", "QLD", "SA", "TAS", "VIC", "WA"];

/// Year, make, model and variant read from a heading like "2019 Toyota Corolla Ascent"
#[derive(Debug, Clone, PartialEq)]
pub struct TitleParts {
    pub year: Option<u16>,
    pub make: String,
    pub model: String,
    pub variant: String,
}

pub fn split_title(title: &str) -> TitleParts {
    let tokens: Vec<&str> = title.split_whitespace().collect();

    let year = tokens
        .first()
        .filter(|t| t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()))
        .and_then(|t| t.parse().ok());

    TitleParts {
        year,
        make: tokens.get(1).unwrap_or(&"Unknown").to_string(),
        model: tokens.get(2).unwrap_or(&"Unknown").to_string(),
        variant: tokens.get(3..).map(|rest| rest.join(" ")).unwrap_or_default(),
    }
}

fn title(document: &Html) -> String {
    TITLE_HEADINGS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .map(element_text)
        .unwrap_or_default()
}

/// Tagged price element first, then the first dollar amount on the page
fn price(document: &Html, text: &str) -> Option<f64> {
    match document.select(&PRICE_TAG).next() {
        Some(tagged) => parse_number(&element_text(tagged)),
        None => DOLLAR_AMOUNT
            .captures(text)
            .and_then(|caps| parse_number(&caps[1])),
    }
}

fn bids(text: &str) -> u32 {
    BID_COUNT
        .captures(text)
        .and_then(|caps| leading_digits(&caps[1]))
        .unwrap_or(0)
}

fn time_remaining(document: &Html, text: &str) -> String {
    if let Some(countdown) = document.select(&COUNTDOWN).next() {
        let value = element_text(countdown);
        if !value.is_empty() {
            return value;
        }
    }

    if let Some(caps) = DURATION.captures(text) {
        return caps[1].to_string();
    }

    if text.to_lowercase().contains("auction ended") {
        "Auction Ended".to_string()
    } else {
        "Unknown".to_string()
    }
}

/// Region code from an address like "12 Smith St, Dandenong, VIC, 3175".
///
/// The second-to-last comma separated part must be a known region.
pub fn region_from_address(address: &str) -> Option<String> {
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return None;
    }
    let candidate = parts[parts.len() - 2].to_uppercase();
    if REGIONS.contains(&candidate.as_str()) {
        Some(candidate)
    } else {
        None
    }
}

/// Build a full vehicle record from a detail page. Never fails; fields that
/// cannot be read keep their defaults.
pub fn parse_vehicle(document: &Html, url: &str, fields: &FieldTable) -> VehicleRecord {
    let text = document_text(document);
    let title = title(document);
    let parts = split_title(&title);

    let price = price(document, &text);
    let bids = bids(&text);
    let time_remaining = time_remaining(document, &text);
    let status = ListingStatus::infer(&time_remaining, price, bids);

    let field = |f: Field| fields.extract(document, f);

    VehicleRecord {
        url: url.to_string(),
        title,
        make: parts.make,
        model: parts.model,
        year: parts.year,
        variant: parts.variant,
        body_type: field(Field::BodyType).unwrap_or_default(),
        seats: field(Field::Seats).and_then(|s| leading_digits(&s)),
        vin: field(Field::Vin).unwrap_or_default(),
        fuel_type: field(Field::FuelType).unwrap_or_default(),
        transmission: field(Field::Transmission).unwrap_or_default(),
        odometer: field(Field::Odometer)
            .and_then(|s| parse_number(&s))
            .map(|km| km as u64),
        colour: field(Field::Colour).unwrap_or_default(),
        location: field(Field::Location).and_then(|a| region_from_address(&a)),
        price,
        bids,
        time_remaining_or_date_sold: time_remaining,
        status,
        features: field(Field::Features).unwrap_or_default(),
        condition: field(Field::Condition).unwrap_or_default(),
        scraped_at: Utc::now(),
    }
}
