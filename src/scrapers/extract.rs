use crate::models::Listing;
use crate::scrapers::profile::MarketplaceProfile;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Extract listing records from raw search-page markup.
///
/// Pure function of `(html, profile)`: no network, no input mutation, and
/// the output preserves document order. Empty markup means "no results"
/// rather than failure, since a fetch error is reported separately. A
/// fragment whose field selectors miss still produces a record with empty
/// fields instead of being skipped.
pub fn extract(html: &str, profile: &MarketplaceProfile) -> Vec<Listing> {
    if html.is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    // The relative date sits in a span nested inside the location container.
    let date_selector = Selector::parse("span").unwrap();

    let listings: Vec<Listing> = document
        .select(&profile.selectors.listing)
        .map(|fragment| {
            let (location, date) = split_location(&fragment, profile, &date_selector);
            let (year, mileage) = split_subtitle(&fragment, profile);

            Listing {
                title: first_text(&fragment, &profile.selectors.title),
                price: first_text(&fragment, &profile.selectors.price),
                location,
                date,
                year,
                mileage,
                url: resolve_link(&fragment, profile),
                marketplace: profile.name.clone(),
            }
        })
        .collect();

    debug!("Extracted {} listings for {}", listings.len(), profile.name);

    listings
}

/// Trimmed text of the first element matching `selector` inside `fragment`.
fn first_text(fragment: &ElementRef, selector: &Selector) -> String {
    fragment
        .select(selector)
        .next()
        .map(|el| text_of(&el).trim().to_string())
        .unwrap_or_default()
}

/// Full descendant text of an element, textContent-style.
fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>()
}

/// Split the location container into `(location, date)`.
///
/// When a span is nested inside the container its text is the posting date,
/// and the bare location is the container text with that one occurrence
/// removed. If several spans exist the first one is taken as the date.
fn split_location(
    fragment: &ElementRef,
    profile: &MarketplaceProfile,
    date_selector: &Selector,
) -> (String, String) {
    let container = match fragment.select(&profile.selectors.location).next() {
        Some(container) => container,
        None => return (String::new(), String::new()),
    };

    let full_text = text_of(&container);
    match container.select(date_selector).next() {
        Some(span) => {
            let span_text = text_of(&span);
            let location = full_text.replacen(&span_text, "", 1).trim().to_string();
            (location, span_text.trim().to_string())
        }
        None => (full_text.trim().to_string(), String::new()),
    }
}

/// Split the subtitle into `(year, mileage)` on the literal `" - "`.
///
/// The tooltip attribute carries the untruncated subtitle and wins over the
/// visible text whenever it is non-empty. A subtitle with no separator maps
/// entirely to the year; segments past the second are ignored.
fn split_subtitle(fragment: &ElementRef, profile: &MarketplaceProfile) -> (String, String) {
    let subtitle = match fragment.select(&profile.selectors.subtitle).next() {
        Some(el) => match el.value().attr("title").filter(|t| !t.is_empty()) {
            Some(tooltip) => tooltip.to_string(),
            None => text_of(&el).trim().to_string(),
        },
        None => return (String::new(), String::new()),
    };
    if subtitle.is_empty() {
        return (String::new(), String::new());
    }

    let mut parts = subtitle.split(" - ");
    let year = parts.next().unwrap_or("").trim().to_string();
    let mileage = parts.next().unwrap_or("").trim().to_string();
    (year, mileage)
}

/// Absolute listing URL, or empty when the fragment carries no usable link.
fn resolve_link(fragment: &ElementRef, profile: &MarketplaceProfile) -> String {
    fragment
        .select(&profile.selectors.link)
        .next()
        .and_then(|el| el.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|href| format!("{}{}", profile.base_url, href))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::profile::MarketplaceProfile;

    const SEARCH_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <ul data-aut-id="itemsList">
      <li data-aut-id="itemBox">
        <a href="/item/maruti-swift-vdi-iid-1780234261">
          <span data-aut-id="itemPrice">₹ 4,25,000</span>
          <div data-aut-id="itemSubTitle" title="2018 - 45,000 km">2018 - 45,0...</div>
          <div data-aut-id="itemTitle">Maruti Suzuki Swift VDI</div>
          <div data-aut-id="itemDetails">Kothamangalam<span>2 days ago</span></div>
        </a>
      </li>
      <li data-aut-id="itemBox2">
        <a href="/item/hyundai-i20-sportz-iid-1780298712">
          <span data-aut-id="itemPrice">₹ 5,10,000</span>
          <div data-aut-id="itemSubTitle" title="2019 - 30,000 km">2019 - 30,0...</div>
          <div data-aut-id="itemTitle">Hyundai i20 Sportz</div>
          <div data-aut-id="itemDetails">Ernakulam<span>Yesterday</span></div>
        </a>
      </li>
    </ul>
  </body>
</html>
"#;

    fn olx() -> MarketplaceProfile {
        MarketplaceProfile::olx().unwrap()
    }

    fn listing_page(fragment: &str) -> String {
        format!("<html><body><ul>{}</ul></body></html>", fragment)
    }

    #[test]
    fn extracts_full_listing_records() {
        let listings = extract(SEARCH_PAGE, &olx());
        assert_eq!(listings.len(), 2);

        let first = &listings[0];
        assert_eq!(first.title, "Maruti Suzuki Swift VDI");
        assert_eq!(first.price, "₹ 4,25,000");
        assert_eq!(first.location, "Kothamangalam");
        assert_eq!(first.date, "2 days ago");
        assert_eq!(first.year, "2018");
        assert_eq!(first.mileage, "45,000 km");
        assert_eq!(
            first.url,
            "https://www.olx.in/item/maruti-swift-vdi-iid-1780234261"
        );
        assert_eq!(first.marketplace, "OLX");
    }

    #[test]
    fn output_preserves_document_order() {
        let titles: Vec<String> = extract(SEARCH_PAGE, &olx())
            .into_iter()
            .map(|listing| listing.title)
            .collect();
        assert_eq!(titles, vec!["Maruti Suzuki Swift VDI", "Hyundai i20 Sportz"]);
    }

    #[test]
    fn empty_markup_yields_empty_sequence() {
        assert!(extract("", &olx()).is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let profile = olx();
        assert_eq!(extract(SEARCH_PAGE, &profile), extract(SEARCH_PAGE, &profile));
    }

    #[test]
    fn location_without_date_span_is_taken_whole() {
        let html = listing_page(
            r#"<li data-aut-id="itemBox">
                 <div data-aut-id="itemDetails">  Kochi  </div>
               </li>"#,
        );
        let listings = extract(&html, &olx());
        assert_eq!(listings[0].location, "Kochi");
        assert_eq!(listings[0].date, "");
    }

    #[test]
    fn first_nested_span_is_taken_as_the_date() {
        let html = listing_page(
            r#"<li data-aut-id="itemBox">
                 <div data-aut-id="itemDetails">Aluva<span>5 days ago</span><span>Featured</span></div>
               </li>"#,
        );
        let listings = extract(&html, &olx());
        assert_eq!(listings[0].date, "5 days ago");
        assert!(listings[0].location.starts_with("Aluva"));
    }

    #[test]
    fn subtitle_tooltip_wins_over_truncated_text() {
        let html = listing_page(
            r#"<li data-aut-id="itemBox">
                 <div data-aut-id="itemSubTitle" title="2018 - 45,000 km">2018 - 45,0...</div>
               </li>"#,
        );
        let listings = extract(&html, &olx());
        assert_eq!(listings[0].year, "2018");
        assert_eq!(listings[0].mileage, "45,000 km");
    }

    #[test]
    fn subtitle_without_tooltip_uses_visible_text() {
        let html = listing_page(
            r#"<li data-aut-id="itemBox">
                 <div data-aut-id="itemSubTitle">2016 - 82,000 km</div>
               </li>"#,
        );
        let listings = extract(&html, &olx());
        assert_eq!(listings[0].year, "2016");
        assert_eq!(listings[0].mileage, "82,000 km");
    }

    #[test]
    fn single_segment_subtitle_maps_to_year_only() {
        let html = listing_page(
            r#"<li data-aut-id="itemBox">
                 <div data-aut-id="itemSubTitle" title="2018">2018</div>
               </li>"#,
        );
        let listings = extract(&html, &olx());
        assert_eq!(listings[0].year, "2018");
        assert_eq!(listings[0].mileage, "");
    }

    #[test]
    fn missing_fields_yield_empty_strings_not_skipped_records() {
        let html = listing_page(
            r#"<li data-aut-id="itemBox">
                 <div data-aut-id="itemTitle">Bare listing</div>
               </li>"#,
        );
        let listings = extract(&html, &olx());
        assert_eq!(listings.len(), 1);
        assert_eq!(
            listings[0],
            Listing {
                title: "Bare listing".to_string(),
                marketplace: "OLX".to_string(),
                ..Listing::default()
            }
        );
    }

    #[test]
    fn non_listing_links_are_not_resolved() {
        let html = listing_page(
            r#"<li data-aut-id="itemBox">
                 <a href="/profile/seller-123">Seller</a>
                 <div data-aut-id="itemTitle">No item link</div>
               </li>"#,
        );
        let listings = extract(&html, &olx());
        assert_eq!(listings[0].url, "");
    }

    #[test]
    fn malformed_markup_degrades_gracefully() {
        let html = r#"<ul><li data-aut-id="itemBox"><div data-aut-id="itemTitle">Broken"#;
        let listings = extract(html, &olx());
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Broken");
    }

    #[test]
    fn markup_without_listings_yields_empty_sequence() {
        let listings = extract("<html><body><p>No results</p></body></html>", &olx());
        assert!(listings.is_empty());
    }
}
