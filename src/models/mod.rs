use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One listing extracted from a marketplace search results page.
///
/// Fields are free text exactly as rendered on the page, trimmed of
/// surrounding whitespace. A field whose selector finds nothing is an empty
/// string, never an error: a card without a price is still a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    /// Price as rendered, currency symbols and separators included.
    pub price: String,
    pub location: String,
    /// Relative posting date ("2 days ago"), when the card shows one.
    pub date: String,
    pub year: String,
    pub mileage: String,
    /// Absolute link to the listing, or empty when the card carries none.
    pub url: String,
    /// Display name of the marketplace the listing came from.
    pub marketplace: String,
}

/// Result bundle the binary saves to disk after a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutReport {
    pub query: String,
    pub location: String,
    pub marketplace: String,
    pub scraped_at: DateTime<Utc>,
    pub listings: Vec<Listing>,
}
