use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::config::{AdSourceConfig, HttpConfig, MarketConfig};
use crate::types::{Niche, RawAdListing, Result, ScoutError, ScrapeRun};

/// Trait for pulling raw advertisement listings for a niche.
///
/// Any transport or service error is a hard failure: scoring an incomplete
/// ad list is not meaningful, so there is no partial result here.
#[async_trait]
pub trait AdSource: Send + Sync {
    /// Human-readable name for this source.
    fn source_name(&self) -> String;

    /// Fetch up to the configured limit of listings for the niche.
    async fn fetch(&self, niche: Niche) -> Result<Vec<RawAdListing>>;
}

/// Ad source backed by the ads-library scraping actor.
///
/// The actor is invoked through its synchronous run endpoint, which blocks
/// until the dataset materializes and returns the items directly.
pub struct MetaAdsSource {
    client: Client,
    config: AdSourceConfig,
    market: MarketConfig,
}

impl MetaAdsSource {
    pub fn new(http: &HttpConfig, config: AdSourceConfig, market: MarketConfig) -> Self {
        let client = Client::builder()
            .user_agent(&http.user_agent)
            .timeout(Duration::from_secs(http.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            market,
        }
    }

    /// Ads-library search URL the scraper starts from.
    fn search_url(&self, niche: Niche) -> Result<Url> {
        let url = Url::parse_with_params(
            "https://www.facebook.com/ads/library/",
            &[
                ("active_status", "active"),
                ("ad_type", "all"),
                ("country", self.market.country_code.as_str()),
                ("is_targeted_country", "false"),
                ("media_type", "video"),
                ("q", niche.label()),
                ("search_type", "keyword_unordered"),
            ],
        )?;
        Ok(url)
    }

    fn run_sync_url(&self) -> Result<Url> {
        let base = Url::parse(&self.config.base_url)?;
        let url = base.join(&format!(
            "/v2/acts/{}/run-sync-get-dataset-items",
            self.config.actor
        ))?;
        Ok(url)
    }
}

#[async_trait]
impl AdSource for MetaAdsSource {
    fn source_name(&self) -> String {
        format!("meta ads ({})", self.config.actor)
    }

    async fn fetch(&self, niche: Niche) -> Result<Vec<RawAdListing>> {
        let run_id = Uuid::new_v4();
        let requested_at = Utc::now();

        let search_url = self.search_url(niche)?;
        let run_input = json!({
            "startUrls": [{ "url": search_url.as_str() }],
            "resultsLimit": self.config.results_limit,
        });

        debug!("Starting scrape run {} for niche {}", run_id, niche);

        let response = self
            .client
            .post(self.run_sync_url()?)
            .query(&[("token", self.config.token.as_str())])
            .json(&run_input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::UpstreamStatus {
                service: "ad source",
                status: status.as_u16(),
            });
        }

        let mut items: Vec<RawAdListing> = response.json().await?;
        items.truncate(self.config.results_limit);

        let run = ScrapeRun {
            id: run_id,
            niche,
            requested_at,
            items_found: items.len(),
        };
        info!(
            "Scrape run {} for niche {} (requested at {}) returned {} listings",
            run.id, run.niche, run.requested_at, run.items_found
        );

        Ok(items)
    }
}

/// In-memory ad source for development and tests.
pub struct StaticAdSource {
    items: Vec<RawAdListing>,
    unavailable: Option<u16>,
    fetches: AtomicUsize,
}

impl StaticAdSource {
    pub fn new(items: Vec<RawAdListing>) -> Self {
        Self {
            items,
            unavailable: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with the given upstream status.
    pub fn unavailable(status: u16) -> Self {
        Self {
            items: Vec::new(),
            unavailable: Some(status),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdSource for StaticAdSource {
    fn source_name(&self) -> String {
        "static ads".to_string()
    }

    async fn fetch(&self, _niche: Niche) -> Result<Vec<RawAdListing>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.unavailable {
            return Err(ScoutError::UpstreamStatus {
                service: "ad source",
                status,
            });
        }

        Ok(self.items.clone())
    }
}
