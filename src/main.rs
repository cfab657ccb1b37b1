mod models;
mod relay;
mod scrapers;

use anyhow::Context;
use chrono::Utc;
use models::ScoutReport;
use relay::{ScoutPayload, ScoutService};
use scrapers::{ProfileRegistry, DEFAULT_LOCATION};
use tracing::{info, warn, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let raw = args.iter().any(|arg| arg == "--raw");
    let mut positional = args.iter().filter(|arg| !arg.starts_with("--"));
    let query = positional
        .next()
        .cloned()
        .context("Usage: marketplace-scout <query> [location] [marketplace] [--raw]")?;
    let location = positional.next().cloned();
    let marketplace = positional.next().cloned();

    info!("🔎 Marketplace Scout");
    info!("====================");
    info!("");

    let profiles = ProfileRegistry::builtin()?;
    let scout = ScoutService::new(profiles)?.spawn();

    info!("Searching for {:?}...", query);
    let response = if raw {
        scout.search_raw(&query, location.clone()).await?
    } else if let Some(marketplace) = &marketplace {
        scout
            .search_marketplace(marketplace, &query, location.clone())
            .await?
    } else {
        scout.search(&query, location.clone()).await?
    };

    match response.payload {
        ScoutPayload::Records { data } => {
            info!("✅ Found {} listings\n", data.len());

            for (i, listing) in data.iter().enumerate() {
                println!("{}. {} ({})", i + 1, listing.title, listing.price);
                if !listing.location.is_empty() {
                    println!("   {}", listing.location);
                }
                if !listing.year.is_empty() {
                    if listing.mileage.is_empty() {
                        println!("   {}", listing.year);
                    } else {
                        println!("   {} - {}", listing.year, listing.mileage);
                    }
                }
                if !listing.date.is_empty() {
                    println!("   Posted: {}", listing.date);
                }
                if !listing.url.is_empty() {
                    println!("   URL: {}", listing.url);
                }
                println!();
            }

            let report = ScoutReport {
                query,
                location: location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
                marketplace: response.marketplace,
                scraped_at: Utc::now(),
                listings: data,
            };
            let json = serde_json::to_string_pretty(&report)?;
            tokio::fs::write("scout_listings.json", json).await?;
            info!("💾 Saved report to scout_listings.json");
        }
        ScoutPayload::Html { error: Some(err), .. } => {
            warn!("Search failed: {}", err);
        }
        ScoutPayload::Html { markup, .. } => {
            info!("Received {} bytes of raw markup", markup.len());
        }
    }

    Ok(())
}
