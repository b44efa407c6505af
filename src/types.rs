use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scraped advertisement as returned by the ad source.
///
/// The scraper does not commit to a schema; the scoring agent is the only
/// consumer that interprets these fields.
pub type RawAdListing = serde_json::Map<String, serde_json::Value>;

/// Supported product niches. Labels follow the storefront catalogue,
/// which is French-language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Niche {
    #[serde(rename = "Fitness")]
    Fitness,
    #[serde(rename = "Beauté")]
    Beauty,
    #[serde(rename = "Mode")]
    Fashion,
    #[serde(rename = "Maison")]
    Home,
    #[serde(rename = "Animaux")]
    Pets,
    #[serde(rename = "Cuisine")]
    Kitchen,
    #[serde(rename = "Gadgets")]
    Gadgets,
    #[serde(rename = "Électronique")]
    Electronics,
    #[serde(rename = "Sports")]
    Sports,
    #[serde(rename = "Jouets")]
    Toys,
    #[serde(rename = "Voyage")]
    Travel,
    #[serde(rename = "Automobile")]
    Automotive,
    #[serde(rename = "Santé")]
    Health,
    #[serde(rename = "Jardin")]
    Garden,
    #[serde(rename = "Extérieur")]
    Outdoors,
}

impl Niche {
    /// Catalogue label, used in search queries and agent prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Niche::Fitness => "Fitness",
            Niche::Beauty => "Beauté",
            Niche::Fashion => "Mode",
            Niche::Home => "Maison",
            Niche::Pets => "Animaux",
            Niche::Kitchen => "Cuisine",
            Niche::Gadgets => "Gadgets",
            Niche::Electronics => "Électronique",
            Niche::Sports => "Sports",
            Niche::Toys => "Jouets",
            Niche::Travel => "Voyage",
            Niche::Automotive => "Automobile",
            Niche::Health => "Santé",
            Niche::Garden => "Jardin",
            Niche::Outdoors => "Extérieur",
        }
    }

    /// Parse a niche from either the catalogue label or the English
    /// variant name, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|niche| {
                niche.label().to_lowercase() == needle || niche.english_name() == needle
            })
            .copied()
    }

    fn english_name(&self) -> &'static str {
        match self {
            Niche::Fitness => "fitness",
            Niche::Beauty => "beauty",
            Niche::Fashion => "fashion",
            Niche::Home => "home",
            Niche::Pets => "pets",
            Niche::Kitchen => "kitchen",
            Niche::Gadgets => "gadgets",
            Niche::Electronics => "electronics",
            Niche::Sports => "sports",
            Niche::Toys => "toys",
            Niche::Travel => "travel",
            Niche::Automotive => "automotive",
            Niche::Health => "health",
            Niche::Garden => "garden",
            Niche::Outdoors => "outdoors",
        }
    }

    pub const ALL: [Niche; 15] = [
        Niche::Fitness,
        Niche::Beauty,
        Niche::Fashion,
        Niche::Home,
        Niche::Pets,
        Niche::Kitchen,
        Niche::Gadgets,
        Niche::Electronics,
        Niche::Sports,
        Niche::Toys,
        Niche::Travel,
        Niche::Automotive,
        Niche::Health,
        Niche::Garden,
        Niche::Outdoors,
    ];
}

impl std::fmt::Display for Niche {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the advertisement data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Meta,
    Tiktok,
}

impl Source {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "meta" => Some(Source::Meta),
            "tiktok" => Some(Source::Tiktok),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Meta => f.write_str("meta"),
            Source::Tiktok => f.write_str("tiktok"),
        }
    }
}

/// Structured scoring result for a single ad.
///
/// `score` is expected to lie in 0-100; the scoring agent is instructed to
/// keep it there and the pipeline compares whatever comes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAd {
    pub title: String,
    pub description: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A product proposed by the suggestion agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub supplier: String,
    /// Expected to follow the "city, country" pattern.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Terminal artifact of the winning-product pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningProductResult {
    pub winning_product: ScoredAd,
    pub suggestions: Vec<CandidateProduct>,
}

/// One marketing rendition of a product, written from a single perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingVariant {
    pub perspective: String,
    pub html: String,
    pub buy_button_message: String,
    pub announcement_bar: String,
}

/// Payload pushed to the landing-page service.
///
/// `price` stays a string in decimal form; the copy agent may propose one
/// when the caller left it open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCopyBundle {
    pub name: String,
    pub price: String,
    pub photos: Vec<String>,
    pub versions: Vec<MarketingVariant>,
}

/// Incoming landing-page request, as handed over by the routing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingPageRequest {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub photos: Vec<String>,
    /// Marketing perspectives to write from. Falls back to the configured
    /// defaults when absent.
    #[serde(default)]
    pub perspectives: Option<Vec<String>>,
}

/// Fully-resolved input to the copy generation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyRequest {
    pub product_name: String,
    pub price: String,
    pub photos: Vec<String>,
    pub perspectives: Vec<String>,
    pub lang: String,
}

/// Result of pushing a copy bundle downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The landing-page service acknowledged the bundle with 201 Created.
    Accepted,
    /// Any other response status.
    Rejected { status: u16 },
}

impl PublishOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PublishOutcome::Accepted)
    }
}

/// Bookkeeping record for one scrape call, kept for logs only.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeRun {
    pub id: Uuid,
    pub niche: Niche,
    pub requested_at: DateTime<Utc>,
    pub items_found: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    UpstreamStatus { service: &'static str, status: u16 },

    #[error("agent output did not match the expected shape: {0}")]
    AgentOutput(String),

    #[error("no ads survived scoring, cannot select a winner")]
    NoWinner,

    #[error("image batch mismatch: expected {expected} urls, generator returned {got}")]
    ImageCountMismatch { expected: usize, got: usize },

    #[error("copy bundle covers {got} of {expected} requested perspectives")]
    PerspectiveMismatch { expected: usize, got: usize },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScoutError>;
