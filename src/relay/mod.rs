use crate::models::Listing;
use crate::scrapers::{extract, MarketplaceScraper, OlxScraper, ProfileRegistry, SearchParams};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Marketplace consulted when a request does not name one.
const DEFAULT_MARKETPLACE: &str = "olx";

/// Search request crossing into the privileged fetching context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutRequest {
    /// Echoed on the response so concurrent searches can be told apart.
    pub request_id: u64,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace: Option<String>,
    /// Deliver the unparsed page instead of extracted records.
    #[serde(default)]
    pub raw: bool,
}

/// Response payload: either the raw page or the extracted records.
///
/// Records is the success shape; the html variant carries raw markup when
/// the caller asked for it, and the fetch error (with empty markup) when
/// the fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScoutPayload {
    Html {
        markup: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Records {
        data: Vec<Listing>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutResponse {
    pub request_id: u64,
    pub marketplace: String,
    pub payload: ScoutPayload,
}

/// Privileged side of the relay: owns the fetchers and the profile table
/// and turns one request into one response. `handle` is total; failures
/// ride the response envelope, never a panic or an Err.
pub struct ScoutService {
    scrapers: HashMap<String, Box<dyn MarketplaceScraper>>,
    profiles: ProfileRegistry,
}

impl ScoutService {
    pub fn new(profiles: ProfileRegistry) -> Result<Self> {
        let mut service = Self {
            scrapers: HashMap::new(),
            profiles,
        };
        service.register(Box::new(OlxScraper::new()?));
        Ok(service)
    }

    /// Replace or add the fetcher for one marketplace.
    pub fn register(&mut self, scraper: Box<dyn MarketplaceScraper>) {
        self.scrapers.insert(scraper.marketplace().to_string(), scraper);
    }

    pub async fn handle(&self, request: ScoutRequest) -> ScoutResponse {
        let marketplace = request
            .marketplace
            .as_deref()
            .unwrap_or(DEFAULT_MARKETPLACE)
            .to_lowercase();

        let (scraper, profile) = match (
            self.scrapers.get(&marketplace),
            self.profiles.get(&marketplace),
        ) {
            (Some(scraper), Some(profile)) => (scraper, profile),
            _ => {
                warn!("No scraper or profile configured for marketplace: {}", marketplace);
                return ScoutResponse {
                    request_id: request.request_id,
                    marketplace,
                    payload: ScoutPayload::Records { data: Vec::new() },
                };
            }
        };

        let params = SearchParams::new(request.query, request.location);
        info!(
            "Scouting {} for {:?} in {}",
            profile.name, params.query, params.location
        );

        let markup = match scraper.search(&params).await {
            Ok(markup) => markup,
            Err(err) => {
                warn!("Fetch failed for {}: {:#}", profile.name, err);
                return ScoutResponse {
                    request_id: request.request_id,
                    marketplace: profile.name.clone(),
                    payload: ScoutPayload::Html {
                        markup: String::new(),
                        error: Some(format!("{:#}", err)),
                    },
                };
            }
        };

        let payload = if request.raw {
            ScoutPayload::Html {
                markup,
                error: None,
            }
        } else {
            let data = extract(&markup, profile);
            info!("Extracted {} listings from {}", data.len(), profile.name);
            ScoutPayload::Records { data }
        };

        ScoutResponse {
            request_id: request.request_id,
            marketplace: profile.name.clone(),
            payload,
        }
    }

    /// Move the service onto its own task and hand back a channel-based
    /// handle. Requests are processed one at a time; each caller resolves
    /// through its own oneshot, so concurrent searches cannot cross wires.
    pub fn spawn(self) -> ScoutHandle {
        let (tx, mut rx) = mpsc::channel::<(ScoutRequest, oneshot::Sender<ScoutResponse>)>(16);

        tokio::spawn(async move {
            while let Some((request, reply)) = rx.recv().await {
                let response = self.handle(request).await;
                // Receiver gone means the caller stopped waiting.
                let _ = reply.send(response);
            }
        });

        ScoutHandle {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// Caller side of the relay. Cloneable; every request gets a fresh id and
/// its own reply channel.
#[derive(Clone)]
pub struct ScoutHandle {
    tx: mpsc::Sender<(ScoutRequest, oneshot::Sender<ScoutResponse>)>,
    next_id: Arc<AtomicU64>,
}

impl ScoutHandle {
    /// Search the default marketplace and get extracted records back.
    pub async fn search(&self, query: &str, location: Option<String>) -> Result<ScoutResponse> {
        self.dispatch(query, location, None, false).await
    }

    /// Ask for the unparsed page instead of extracted records.
    pub async fn search_raw(&self, query: &str, location: Option<String>) -> Result<ScoutResponse> {
        self.dispatch(query, location, None, true).await
    }

    /// Search a named marketplace.
    pub async fn search_marketplace(
        &self,
        marketplace: &str,
        query: &str,
        location: Option<String>,
    ) -> Result<ScoutResponse> {
        self.dispatch(query, location, Some(marketplace.to_string()), false)
            .await
    }

    async fn dispatch(
        &self,
        query: &str,
        location: Option<String>,
        marketplace: Option<String>,
        raw: bool,
    ) -> Result<ScoutResponse> {
        let request = ScoutRequest {
            request_id: self.next_id.fetch_add(1, Ordering::Relaxed),
            query: query.to_string(),
            location,
            marketplace,
            raw,
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .ok()
            .context("Scout service is no longer running")?;
        reply_rx.await.context("Scout service dropped the request")
    }
}
