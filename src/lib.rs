pub mod ad_source;
pub mod agent;
pub mod config;
pub mod copywriter;
pub mod images;
pub mod pipeline;
pub mod publisher;
pub mod responses;
pub mod scoring;
pub mod types;

pub use ad_source::{AdSource, MetaAdsSource, StaticAdSource};
pub use agent::{AgentRuntime, MockAgentRuntime, OpenAiAgentRuntime};
pub use config::ScoutConfig;
pub use copywriter::CopywriterStage;
pub use images::{enrich, ImageGenerator, MockImageGenerator, OpenAiImageGenerator};
pub use pipeline::{LandingPagePipeline, PipelineStage, WinningProductPipeline};
pub use publisher::{CopyPublisher, HttpCopyPublisher, MockPublisher};
pub use responses::{landing_page_envelope, winning_product_envelope, JsendResponse, JsendStatus};
pub use scoring::{select_winner, ScoringStage};
pub use types::*;
