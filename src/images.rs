use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::config::{HttpConfig, ImageConfig};
use crate::types::{CandidateProduct, Result, ScoredAd, ScoutError};

/// Trait for generating product imagery.
///
/// A conforming implementation returns exactly `count` URLs, in request
/// order; the enrichment step checks and refuses anything else.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        size: &str,
        count: usize,
    ) -> Result<Vec<String>>;
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: String,
}

/// Image-generation API client.
pub struct OpenAiImageGenerator {
    client: Client,
    config: ImageConfig,
}

impl OpenAiImageGenerator {
    pub fn new(http: &HttpConfig, config: ImageConfig) -> Self {
        let client = Client::builder()
            .user_agent(&http.user_agent)
            .timeout(Duration::from_secs(http.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        size: &str,
        count: usize,
    ) -> Result<Vec<String>> {
        debug!("Requesting {} {} image(s) from {}", count, size, model);

        let body = json!({
            "model": model,
            "prompt": prompt,
            "n": count,
            "size": size,
            "quality": self.config.quality,
            "response_format": "url",
        });

        let response = self
            .client
            .post(format!(
                "{}/images/generations",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::UpstreamStatus {
                service: "image generator",
                status: status.as_u16(),
            });
        }

        let parsed: ImageResponse = response.json().await?;
        Ok(parsed.data.into_iter().map(|datum| datum.url).collect())
    }
}

/// Attach generated image URLs to the winner and the suggestion list.
///
/// The suggestion batch is keyed positionally, so the generator must return
/// exactly one URL per suggestion; a shorter or longer batch fails the stage
/// rather than leaving fields mismatched by index.
pub async fn enrich(
    generator: &dyn ImageGenerator,
    config: &ImageConfig,
    mut winner: ScoredAd,
    mut suggestions: Vec<CandidateProduct>,
) -> Result<(ScoredAd, Vec<CandidateProduct>)> {
    let prompt = format!(
        "Create a product image for the winning product: {} - {}",
        winner.title, winner.description
    );

    let winner_images = generator
        .generate(&prompt, &config.winner_model, &config.winner_size, 1)
        .await?;
    let winner_url = winner_images
        .into_iter()
        .next()
        .ok_or(ScoutError::ImageCountMismatch {
            expected: 1,
            got: 0,
        })?;
    winner.image_url = Some(winner_url);

    if !suggestions.is_empty() {
        let batch = generator
            .generate(
                &prompt,
                &config.suggestion_model,
                &config.suggestion_size,
                suggestions.len(),
            )
            .await?;

        if batch.len() != suggestions.len() {
            return Err(ScoutError::ImageCountMismatch {
                expected: suggestions.len(),
                got: batch.len(),
            });
        }

        for (product, url) in suggestions.iter_mut().zip(batch) {
            product.image_url = Some(url);
        }
    }

    Ok((winner, suggestions))
}

/// Canned image generator for development and tests.
pub struct MockImageGenerator {
    /// Batches larger than one come back short by this many URLs, to
    /// exercise the count invariant. Single-image requests stay intact.
    short_by: usize,
    calls: AtomicUsize,
}

impl MockImageGenerator {
    pub fn new() -> Self {
        Self {
            short_by: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_short_batches(short_by: usize) -> Self {
        Self {
            short_by,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        model: &str,
        size: &str,
        count: usize,
    ) -> Result<Vec<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let produced = if count > 1 {
            count.saturating_sub(self.short_by)
        } else {
            count
        };

        Ok((0..produced)
            .map(|i| format!("https://images.test/{model}/{size}/{call}-{i}.png"))
            .collect())
    }
}
