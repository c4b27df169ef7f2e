use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an auction listing as inferred from its detail page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Sold,
    Referred,
}

impl ListingStatus {
    /// Infer the status from the countdown text, price and bid count.
    ///
    /// A countdown containing any digit means the lot is still running.
    /// Without one, the lot counts as sold only when it has both a price and
    /// at least one bid; otherwise it was referred to the vendor. The
    /// sold/referred split is a best-effort guess, the site never says so.
    pub fn infer(time_remaining: &str, price: Option<f64>, bids: u32) -> Self {
        if time_remaining.chars().any(|c| c.is_ascii_digit()) {
            return Self::Active;
        }

        match price {
            Some(p) if p > 0.0 && bids > 0 => Self::Sold,
            _ => Self::Referred,
        }
    }
}

/// One scraped vehicle lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleRecord {
    pub url: String,
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: Option<u16>,
    pub variant: String,
    pub body_type: String,
    pub seats: Option<u32>,
    pub vin: String,
    pub fuel_type: String,
    pub transmission: String,
    pub odometer: Option<u64>,
    pub colour: String,
    /// State/territory abbreviation taken from the lot address
    pub location: Option<String>,
    pub price: Option<f64>,
    pub bids: u32,
    pub time_remaining_or_date_sold: String,
    pub status: ListingStatus,
    pub features: String,
    pub condition: String,
    pub scraped_at: DateTime<Utc>,
}

impl VehicleRecord {
    /// A record carrying only its URL, every other field at its default
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            make: "Unknown".to_string(),
            model: "Unknown".to_string(),
            year: None,
            variant: String::new(),
            body_type: String::new(),
            seats: None,
            vin: String::new(),
            fuel_type: String::new(),
            transmission: String::new(),
            odometer: None,
            colour: String::new(),
            location: None,
            price: None,
            bids: 0,
            time_remaining_or_date_sold: "Unknown".to_string(),
            status: ListingStatus::Referred,
            features: String::new(),
            condition: String::new(),
            scraped_at: Utc::now(),
        }
    }
}

/// Status reported by a listing refresh; `Error` marks a failed fetch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Active,
    Sold,
    Referred,
    Error,
}

impl From<ListingStatus> for UpdateStatus {
    fn from(status: ListingStatus) -> Self {
        match status {
            ListingStatus::Active => Self::Active,
            ListingStatus::Sold => Self::Sold,
            ListingStatus::Referred => Self::Referred,
        }
    }
}

/// The volatile fields of a listing, re-read without touching the stored record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingUpdate {
    pub url: String,
    pub price: Option<f64>,
    pub bids: u32,
    pub time_remaining: String,
    pub status: UpdateStatus,
}

impl ListingUpdate {
    pub fn from_record(record: &VehicleRecord) -> Self {
        Self {
            url: record.url.clone(),
            price: record.price,
            bids: record.bids,
            time_remaining: record.time_remaining_or_date_sold.clone(),
            status: record.status.into(),
        }
    }

    /// Placeholder for a URL that could not be refreshed
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            price: None,
            bids: 0,
            time_remaining: "Error".to_string(),
            status: UpdateStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_with_digits_is_active() {
        assert_eq!(
            ListingStatus::infer("2h 15m 30s", None, 0),
            ListingStatus::Active
        );
    }

    #[test]
    fn no_countdown_with_price_and_bids_is_sold() {
        assert_eq!(
            ListingStatus::infer("Auction Ended", Some(5000.0), 3),
            ListingStatus::Sold
        );
    }

    #[test]
    fn no_countdown_without_price_is_referred() {
        assert_eq!(
            ListingStatus::infer("Unknown", None, 0),
            ListingStatus::Referred
        );
        assert_eq!(
            ListingStatus::infer("", Some(5000.0), 0),
            ListingStatus::Referred
        );
    }

    #[test]
    fn failed_update_serializes_error_status() {
        let json = serde_json::to_value(ListingUpdate::failed("https://x/lot/1")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["time_remaining"], "Error");
        assert!(json["price"].is_null());
    }
}
