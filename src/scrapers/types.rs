use serde::{Deserialize, Serialize};

/// Location slug used when the caller does not supply one.
pub const DEFAULT_LOCATION: &str = "kothamangalam";

/// Search parameters for a marketplace query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text search query
    pub query: String,
    /// City or area slug interpolated into the search URL
    pub location: String,
}

impl SearchParams {
    /// Build parameters, falling back to the default location when none is
    /// given.
    pub fn new(query: impl Into<String>, location: Option<String>) -> Self {
        Self {
            query: query.into(),
            location: location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        }
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}
