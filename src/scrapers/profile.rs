use anyhow::{anyhow, Result};
use scraper::Selector;
use std::collections::HashMap;

/// Pre-parsed structural queries for the field roles of one marketplace.
///
/// `listing` locates the top-level listing fragments; every other selector
/// is searched within a single fragment and may legitimately match nothing.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub listing: Selector,
    pub title: Selector,
    pub price: Selector,
    pub location: Selector,
    pub subtitle: Selector,
    pub link: Selector,
}

/// Raw selector strings a profile is built from.
#[derive(Debug, Clone, Copy)]
pub struct SelectorRules<'a> {
    pub listing: &'a str,
    pub title: &'a str,
    pub price: &'a str,
    pub location: &'a str,
    pub subtitle: &'a str,
    pub link: &'a str,
}

/// Immutable configuration for one marketplace: display name, field
/// selectors, and the base URL prepended to relative listing links.
#[derive(Debug, Clone)]
pub struct MarketplaceProfile {
    pub name: String,
    pub selectors: SelectorSet,
    pub base_url: String,
}

impl MarketplaceProfile {
    pub fn new(name: &str, base_url: &str, rules: SelectorRules<'_>) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            selectors: SelectorSet {
                listing: parse_selector("listing", rules.listing)?,
                title: parse_selector("title", rules.title)?,
                price: parse_selector("price", rules.price)?,
                location: parse_selector("location", rules.location)?,
                subtitle: parse_selector("subtitle", rules.subtitle)?,
                link: parse_selector("link", rules.link)?,
            },
            base_url: base_url.to_string(),
        })
    }

    /// Selector table for olx.in search result pages.
    pub fn olx() -> Result<Self> {
        Self::new(
            "OLX",
            "https://www.olx.in",
            SelectorRules {
                listing: r#"li[data-aut-id="itemBox"], li[data-aut-id="itemBox2"]"#,
                title: r#"div[data-aut-id="itemTitle"]"#,
                price: r#"span[data-aut-id="itemPrice"]"#,
                location: r#"div[data-aut-id="itemDetails"]"#,
                subtitle: r#"div[data-aut-id="itemSubTitle"]"#,
                // Restricted to listing links so other anchors inside the
                // card are never picked up.
                link: r#"a[href*="/item/"]"#,
            },
        )
    }
}

fn parse_selector(role: &str, source: &str) -> Result<Selector> {
    Selector::parse(source).map_err(|e| anyhow!("Invalid {} selector {:?}: {}", role, source, e))
}

/// Profiles keyed by lowercase marketplace id, built once at startup and
/// passed to the service explicitly rather than looked up through globals.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, MarketplaceProfile>,
}

impl ProfileRegistry {
    /// Registry containing the built-in marketplaces (currently OLX only).
    pub fn builtin() -> Result<Self> {
        let mut registry = Self {
            profiles: HashMap::new(),
        };
        registry.insert("olx", MarketplaceProfile::olx()?);
        Ok(registry)
    }

    pub fn insert(&mut self, id: &str, profile: MarketplaceProfile) {
        self.profiles.insert(id.to_lowercase(), profile);
    }

    /// Case-insensitive lookup by marketplace id.
    pub fn get(&self, id: &str) -> Option<&MarketplaceProfile> {
        self.profiles.get(&id.to_lowercase())
    }
}
