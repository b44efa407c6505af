use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::ad_source::AdSource;
use crate::agent::AgentRuntime;
use crate::config::{ImageConfig, PipelineConfig};
use crate::copywriter::CopywriterStage;
use crate::images::{enrich, ImageGenerator};
use crate::publisher::CopyPublisher;
use crate::scoring::{select_winner, ScoringStage};
use crate::types::{
    CopyRequest, LandingPageRequest, Niche, PublishOutcome, Result, ScoutError, Source,
    WinningProductResult,
};

/// Stages of the winning-product pipeline, in walk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Fetching,
    Scoring,
    Selecting,
    Suggesting,
    Enriching,
    Done,
    Failed,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Fetching => "fetching",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Selecting => "selecting",
            PipelineStage::Suggesting => "suggesting",
            PipelineStage::Enriching => "enriching",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// End-to-end winning-product orchestrator.
///
/// Every collaborator is injected; the pipeline holds no state across runs
/// and each stage executes exactly once per invocation, with no retries.
pub struct WinningProductPipeline {
    ads: Arc<dyn AdSource>,
    scoring: ScoringStage,
    agent: Arc<dyn AgentRuntime>,
    images: Arc<dyn ImageGenerator>,
    image_config: ImageConfig,
    config: PipelineConfig,
}

impl WinningProductPipeline {
    pub fn new(
        ads: Arc<dyn AdSource>,
        agent: Arc<dyn AgentRuntime>,
        images: Arc<dyn ImageGenerator>,
        image_config: ImageConfig,
        config: PipelineConfig,
    ) -> Self {
        let scoring = ScoringStage::new(agent.clone(), config.scoring_concurrency);
        Self {
            ads,
            scoring,
            agent,
            images,
            image_config,
            config,
        }
    }

    /// Walk FETCHING -> SCORING -> SELECTING -> SUGGESTING -> ENRICHING.
    ///
    /// Any hard failure, including an empty winner selection, aborts the
    /// remainder of the run.
    pub async fn run(&self, niche: Niche, source: Source) -> Result<WinningProductResult> {
        let run_id = Uuid::new_v4();
        info!(
            "Run {}: finding winning product for niche {} (source {}, via {})",
            run_id,
            niche,
            source,
            self.ads.source_name()
        );

        let result = self.run_stages(run_id, niche).await;
        match &result {
            Ok(_) => info!("Run {}: {}", run_id, PipelineStage::Done),
            Err(e) => error!("Run {}: {}: {}", run_id, PipelineStage::Failed, e),
        }
        result
    }

    async fn run_stages(&self, run_id: Uuid, niche: Niche) -> Result<WinningProductResult> {
        info!("Run {}: {}", run_id, PipelineStage::Fetching);
        let ads = self.ads.fetch(niche).await?;

        info!("Run {}: {} {} listings", run_id, PipelineStage::Scoring, ads.len());
        let scored = self.scoring.score_all(niche, &ads).await;

        info!(
            "Run {}: {} among {} survivors",
            run_id,
            PipelineStage::Selecting,
            scored.len()
        );
        let winner = select_winner(&scored).cloned().ok_or(ScoutError::NoWinner)?;

        info!(
            "Run {}: {} for winner \"{}\" (score {})",
            run_id,
            PipelineStage::Suggesting,
            winner.title,
            winner.score
        );
        let suggestions = self
            .agent
            .suggest_products(niche, &winner.description, self.config.suggestion_count)
            .await?;
        if suggestions.len() != self.config.suggestion_count {
            return Err(ScoutError::AgentOutput(format!(
                "suggestion agent returned {} products, expected {}",
                suggestions.len(),
                self.config.suggestion_count
            )));
        }

        info!("Run {}: {}", run_id, PipelineStage::Enriching);
        let (winner, suggestions) =
            enrich(self.images.as_ref(), &self.image_config, winner, suggestions).await?;

        Ok(WinningProductResult {
            winning_product: winner,
            suggestions,
        })
    }
}

/// Copy-then-publish orchestrator for landing pages.
pub struct LandingPagePipeline {
    copywriter: CopywriterStage,
    publisher: Arc<dyn CopyPublisher>,
    config: PipelineConfig,
}

impl LandingPagePipeline {
    pub fn new(
        agent: Arc<dyn AgentRuntime>,
        publisher: Arc<dyn CopyPublisher>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            copywriter: CopywriterStage::new(agent),
            publisher,
            config,
        }
    }

    /// Generate marketing copy and push it downstream. The publish outcome
    /// is the pipeline outcome; copy generation is never retried after a
    /// rejected publish.
    pub async fn run(&self, request: LandingPageRequest) -> Result<PublishOutcome> {
        let run_id = Uuid::new_v4();

        let perspectives = match request.perspectives {
            Some(list) if !list.is_empty() => list,
            _ => self.config.default_perspectives.clone(),
        };

        info!(
            "Run {}: generating landing page for {} ({} perspectives)",
            run_id,
            request.name,
            perspectives.len()
        );

        let copy_request = CopyRequest {
            product_name: request.name,
            price: request.price,
            photos: request.photos,
            perspectives,
            lang: self.config.prompt_lang.clone(),
        };

        let bundle = self.copywriter.generate(&copy_request).await?;
        let outcome = self.publisher.publish(&bundle).await?;

        match outcome {
            PublishOutcome::Accepted => info!("Run {}: landing page published", run_id),
            PublishOutcome::Rejected { status } => {
                error!("Run {}: landing-page publish rejected with HTTP {}", run_id, status)
            }
        }

        Ok(outcome)
    }
}
