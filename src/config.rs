use serde::Deserialize;
use std::env;

use crate::types::{Result, ScoutError};

/// Process-wide configuration, established at startup and read-only after.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScoutConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ads: AdSourceConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "product-scout/0.1".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdSourceConfig {
    /// Base URL of the scraping service.
    pub base_url: String,
    /// Actor identifier of the ads-library scraper.
    pub actor: String,
    /// API token for the scraping service.
    pub token: String,
    /// Upper bound on scraped listings per run.
    pub results_limit: usize,
}

impl Default for AdSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.apify.com".to_string(),
            actor: "apify~facebook-ads-scraper".to_string(),
            token: String::new(),
            results_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub base_url: String,
    pub api_key: String,
    pub winner_model: String,
    pub winner_size: String,
    pub suggestion_model: String,
    pub suggestion_size: String,
    pub quality: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            winner_model: "dall-e-3".to_string(),
            winner_size: "1024x1024".to_string(),
            suggestion_model: "dall-e-2".to_string(),
            suggestion_size: "256x256".to_string(),
            quality: "standard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PublishConfig {
    /// Base URL of the landing-page service.
    pub base_url: String,
    /// Bearer credential for the landing-page service.
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// ISO country code used in the ads-library search.
    pub country_code: String,
    /// Human-readable target market, interpolated into agent instructions.
    pub market_name: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            country_code: "DZ".to_string(),
            market_name: "Algeria".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Concurrent in-flight scoring calls. 1 means strictly sequential.
    pub scoring_concurrency: usize,
    /// Fixed size of the suggestion list.
    pub suggestion_count: usize,
    /// Perspectives used when a landing-page request names none.
    pub default_perspectives: Vec<String>,
    /// Locale for generated marketing copy.
    pub prompt_lang: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scoring_concurrency: 4,
            suggestion_count: 4,
            default_perspectives: vec![
                "urgency".to_string(),
                "social proof".to_string(),
                "self-care".to_string(),
            ],
            prompt_lang: "en".to_string(),
        }
    }
}

impl ScoutConfig {
    /// Build configuration from `SCOUT_*` environment variables on top of
    /// the defaults. Secrets have no defaults and must come from the
    /// environment in real deployments.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = env::var("SCOUT_ADS_BASE_URL") {
            config.ads.base_url = value;
        }
        if let Ok(value) = env::var("SCOUT_ADS_ACTOR") {
            config.ads.actor = value;
        }
        if let Ok(value) = env::var("SCOUT_ADS_TOKEN") {
            config.ads.token = value;
        }
        if let Ok(value) = env::var("SCOUT_ADS_RESULTS_LIMIT") {
            config.ads.results_limit = value
                .parse()
                .map_err(|_| ScoutError::Config(format!("bad SCOUT_ADS_RESULTS_LIMIT: {value}")))?;
        }

        if let Ok(value) = env::var("SCOUT_OPENAI_BASE_URL") {
            config.agent.base_url = value.clone();
            config.images.base_url = value;
        }
        if let Ok(value) = env::var("SCOUT_OPENAI_API_KEY") {
            config.agent.api_key = value.clone();
            config.images.api_key = value;
        }
        if let Ok(value) = env::var("SCOUT_AGENT_MODEL") {
            config.agent.model = value;
        }

        if let Ok(value) = env::var("SCOUT_PUBLISH_BASE_URL") {
            config.publish.base_url = value;
        }
        if let Ok(value) = env::var("SCOUT_PUBLISH_TOKEN") {
            config.publish.token = value;
        }

        if let Ok(value) = env::var("SCOUT_MARKET_COUNTRY") {
            config.market.country_code = value;
        }
        if let Ok(value) = env::var("SCOUT_MARKET_NAME") {
            config.market.market_name = value;
        }

        if let Ok(value) = env::var("SCOUT_SCORING_CONCURRENCY") {
            config.pipeline.scoring_concurrency = value.parse().map_err(|_| {
                ScoutError::Config(format!("bad SCOUT_SCORING_CONCURRENCY: {value}"))
            })?;
        }
        if let Ok(value) = env::var("SCOUT_PROMPT_LANG") {
            config.pipeline.prompt_lang = value;
        }

        Ok(config)
    }
}
