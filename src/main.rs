use anyhow::{bail, Context};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use product_scout::{
    winning_product_envelope, MetaAdsSource, Niche, OpenAiAgentRuntime, OpenAiImageGenerator,
    ScoutConfig, Source, WinningProductPipeline,
};

/// Run the winning-product pipeline once and print the JSEND envelope.
#[derive(Parser)]
#[command(name = "product-scout", version)]
struct Args {
    /// Niche to research, e.g. "fitness" or "Beauté".
    niche: String,

    /// Ad source to scrape.
    #[arg(long, default_value = "meta")]
    source: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let Some(niche) = Niche::parse(&args.niche) else {
        bail!("unknown niche: {}", args.niche);
    };
    let Some(source) = Source::parse(&args.source) else {
        bail!("unknown source: {}", args.source);
    };

    let config = ScoutConfig::from_env().context("loading configuration")?;

    let ads = Arc::new(MetaAdsSource::new(
        &config.http,
        config.ads.clone(),
        config.market.clone(),
    ));
    let agent = Arc::new(OpenAiAgentRuntime::new(
        &config.http,
        config.agent.clone(),
        config.market.clone(),
    ));
    let images = Arc::new(OpenAiImageGenerator::new(
        &config.http,
        config.images.clone(),
    ));

    let pipeline = WinningProductPipeline::new(
        ads,
        agent,
        images,
        config.images.clone(),
        config.pipeline.clone(),
    );

    info!("Researching winning product for niche {}", niche);

    let envelope = winning_product_envelope(pipeline.run(niche, source).await);
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    Ok(())
}
