use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::config::{AgentConfig, HttpConfig, MarketConfig};
use crate::types::{
    CandidateProduct, CopyRequest, MarketingVariant, Niche, ProductCopyBundle, RawAdListing,
    Result, ScoredAd, ScoutError,
};

/// The LLM agent seam shared by the scoring, suggestion and copywriting
/// stages. One method per agent persona; every method either returns the
/// declared typed shape or fails.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Name of this runtime, for logs.
    fn runtime_name(&self) -> String;

    /// Score one raw ad for the niche, returning the structured result.
    async fn score_ad(&self, niche: Niche, ad: &RawAdListing) -> Result<ScoredAd>;

    /// Propose `count` candidate products for the niche, anchored on the
    /// winning ad's description.
    async fn suggest_products(
        &self,
        niche: Niche,
        winner_description: &str,
        count: usize,
    ) -> Result<Vec<CandidateProduct>>;

    /// Write one marketing variant per requested perspective.
    async fn generate_copy(&self, request: &CopyRequest) -> Result<ProductCopyBundle>;
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat-completions-backed agent runtime.
pub struct OpenAiAgentRuntime {
    client: Client,
    config: AgentConfig,
    market: MarketConfig,
}

impl OpenAiAgentRuntime {
    pub fn new(http: &HttpConfig, config: AgentConfig, market: MarketConfig) -> Self {
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

    /// One chat-completion round trip: returns the assistant reply text.
    async fn complete(&self, instructions: &str, prompt: &str) -> Result<String> {
        debug!(
            "Calling agent runtime at {} with model {}",
            self.config.base_url, self.config.model
        );

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": instructions },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::UpstreamStatus {
                service: "agent runtime",
                status: status.as_u16(),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ScoutError::AgentOutput("reply carried no content".to_string()))?;

        Ok(content)
    }
}

/// Strip markdown code fences some models wrap JSON replies in.
fn strip_fences(reply: &str) -> &str {
    reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse an agent reply into its declared shape, keeping a snippet of the
/// raw reply for diagnostics.
fn parse_reply<T: serde::de::DeserializeOwned>(reply: &str) -> Result<T> {
    let payload = strip_fences(reply);
    serde_json::from_str(payload).map_err(|e| {
        let snippet: String = payload.chars().take(200).collect();
        ScoutError::AgentOutput(format!("{e}; reply started with: {snippet}"))
    })
}

#[async_trait]
impl AgentRuntime for OpenAiAgentRuntime {
    fn runtime_name(&self) -> String {
        format!("chat completions ({})", self.config.model)
    }

    async fn score_ad(&self, niche: Niche, ad: &RawAdListing) -> Result<ScoredAd> {
        let instructions = format!(
            "You are a product research agent. Your task is to find the winning product \
             for a given niche. Make sure the provided information is related to {}. \
             Make sure the score is between 0 and 100. \
             Reply with a single JSON object and nothing else.",
            self.market.market_name
        );

        let prompt = format!(
            "Score this ad for the niche \"{niche}\".\n\
             Ad details: {}\n\
             Return a JSON object with:\n\
             - 'title': ad page name\n\
             - 'description': short ad text or caption\n\
             - 'score': relevance score from 0 to 100",
            serde_json::Value::Object(ad.clone())
        );

        let reply = self.complete(&instructions, &prompt).await?;
        parse_reply(&reply)
    }

    async fn suggest_products(
        &self,
        niche: Niche,
        winner_description: &str,
        count: usize,
    ) -> Result<Vec<CandidateProduct>> {
        let instructions = format!(
            "You are a product suggestion agent. Your task is to generate products for \
             a given niche. Make sure the location is of this format: 'city, country'. \
             Make sure the provided information is related to {}. \
             Reply with a single JSON array and nothing else. Each element must have \
             'name', 'description', 'price', 'supplier' and 'location' fields.",
            self.market.market_name
        );

        let prompt = format!(
            "Suggest me {count} products for the niche {niche} and description {winner_description}"
        );

        let reply = self.complete(&instructions, &prompt).await?;
        parse_reply(&reply)
    }

    async fn generate_copy(&self, request: &CopyRequest) -> Result<ProductCopyBundle> {
        let instructions = "You are an expert e-commerce copywriter. \
             For each marketing perspective in the input, produce: \
             a <h2> headline reflecting that perspective; a <p> block of at least 300 \
             words that opens with a compelling introduction, uses bullet-style points \
             and emojis to highlight features and benefits, incorporates persuasive \
             power words, and concludes with a strong call-to-action; a concise \
             'buy_button_message' button label; and a short 'announcement_bar' text \
             suitable for a site banner. \
             Tailor tone and vocabulary to the 'prompt_lang' locale. Vary structure \
             per perspective. Output only valid HTML inside 'html' and plain text in \
             the other fields. \
             Assemble a single JSON object with exactly these fields: 'name' (same as \
             the input name), 'price' (the input price, or propose a reasonable one, \
             as a string in decimal form), 'photos' (the input photos list), and \
             'versions' (one object per perspective with 'perspective', 'html', \
             'buy_button_message', 'announcement_bar'). \
             Your final output must be only that JSON object, no commentary, no code \
             fences.";

        let prompt = serde_json::to_string(&json!({
            "product_name": request.product_name,
            "product_price": request.price,
            "photos": request.photos,
            "marketing_perspectives": request.perspectives,
            "prompt_lang": request.lang,
        }))?;

        let reply = self.complete(instructions, &prompt).await?;
        parse_reply(&reply)
    }
}

/// Scripted agent runtime for development and tests.
///
/// Scores are handed out in call order; selected calls can be made to fail
/// to exercise the per-item isolation of the scoring stage.
pub struct MockAgentRuntime {
    scores: Vec<f64>,
    failing_scores: HashSet<usize>,
    score_calls: AtomicUsize,
    suggest_requests: Mutex<Vec<String>>,
    copy_calls: AtomicUsize,
    copy_short_by: usize,
    fail_copy: bool,
}

impl MockAgentRuntime {
    pub fn new(scores: Vec<f64>) -> Self {
        Self {
            scores,
            failing_scores: HashSet::new(),
            score_calls: AtomicUsize::new(0),
            suggest_requests: Mutex::new(Vec::new()),
            copy_calls: AtomicUsize::new(0),
            copy_short_by: 0,
            fail_copy: false,
        }
    }

    /// Make the scoring calls at these indices (in call order) fail.
    pub fn with_failing_scores(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.failing_scores = indices.into_iter().collect();
        self
    }

    /// Return this many fewer marketing variants than perspectives asked for.
    pub fn with_copy_short_by(mut self, short_by: usize) -> Self {
        self.copy_short_by = short_by;
        self
    }

    pub fn with_failing_copy(mut self) -> Self {
        self.fail_copy = true;
        self
    }

    pub fn score_call_count(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }

    pub fn copy_call_count(&self) -> usize {
        self.copy_calls.load(Ordering::SeqCst)
    }

    /// Winner descriptions the suggestion agent was invoked with.
    pub fn suggest_descriptions(&self) -> Vec<String> {
        self.suggest_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentRuntime for MockAgentRuntime {
    fn runtime_name(&self) -> String {
        "mock agent runtime".to_string()
    }

    async fn score_ad(&self, _niche: Niche, ad: &RawAdListing) -> Result<ScoredAd> {
        let call = self.score_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_scores.contains(&call) {
            return Err(ScoutError::AgentOutput(format!(
                "scripted failure for scoring call {call}"
            )));
        }

        let title = ad
            .get("page_name")
            .and_then(|value| value.as_str())
            .unwrap_or("Untitled ad")
            .to_string();
        let description = ad
            .get("caption")
            .and_then(|value| value.as_str())
            .unwrap_or("")
            .to_string();

        Ok(ScoredAd {
            title,
            description,
            score: self.scores.get(call).copied().unwrap_or(50.0),
            image_url: None,
        })
    }

    async fn suggest_products(
        &self,
        niche: Niche,
        winner_description: &str,
        count: usize,
    ) -> Result<Vec<CandidateProduct>> {
        self.suggest_requests
            .lock()
            .unwrap()
            .push(winner_description.to_string());

        Ok((0..count)
            .map(|i| CandidateProduct {
                name: format!("{} pick {}", niche, i + 1),
                description: format!("Alternative product {} for {}", i + 1, niche),
                price: 19.99 + i as f64,
                supplier: "Local supplier".to_string(),
                location: "Algiers, Algeria".to_string(),
                image_url: None,
            })
            .collect())
    }

    async fn generate_copy(&self, request: &CopyRequest) -> Result<ProductCopyBundle> {
        self.copy_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_copy {
            return Err(ScoutError::AgentOutput(
                "scripted copywriting failure".to_string(),
            ));
        }

        let keep = request.perspectives.len().saturating_sub(self.copy_short_by);
        let versions: Vec<MarketingVariant> = request
            .perspectives
            .iter()
            .take(keep)
            .map(|perspective| MarketingVariant {
                perspective: perspective.clone(),
                html: format!(
                    "<h2>{} ({})</h2><p>Why shoppers love it.</p>",
                    request.product_name, perspective
                ),
                buy_button_message: "Buy Now - Limited Stock!".to_string(),
                announcement_bar: "Hurry! 20% off today only".to_string(),
            })
            .collect();

        Ok(ProductCopyBundle {
            name: request.product_name.clone(),
            price: request.price.clone(),
            photos: request.photos.clone(),
            versions,
        })
    }
}
