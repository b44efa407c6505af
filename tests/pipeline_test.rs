use product_scout::config::{ImageConfig, PipelineConfig};
use product_scout::{
    landing_page_envelope, winning_product_envelope, JsendStatus, LandingPagePipeline,
    LandingPageRequest, MockAgentRuntime, MockImageGenerator, MockPublisher, Niche,
    PublishOutcome, RawAdListing, ScoutError, Source, StaticAdSource, WinningProductPipeline,
};
use serde_json::json;
use std::sync::Arc;

fn ad(page_name: &str, caption: &str) -> RawAdListing {
    let mut listing = RawAdListing::new();
    listing.insert("page_name".to_string(), json!(page_name));
    listing.insert("caption".to_string(), json!(caption));
    listing
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

#[tokio::test]
async fn winning_product_end_to_end() {
    init_tracing();

    let ads = Arc::new(StaticAdSource::new(vec![
        ad("Gym Gear", "resistance bands that actually resist"),
        ad("FitPro", "the smart jump rope everyone talks about"),
    ]));
    let agent = Arc::new(MockAgentRuntime::new(vec![40.0, 85.0]));
    let images = Arc::new(MockImageGenerator::new());

    let pipeline = WinningProductPipeline::new(
        ads,
        agent.clone(),
        images.clone(),
        ImageConfig::default(),
        PipelineConfig::default(),
    );

    let result = pipeline.run(Niche::Fitness, Source::Meta).await.unwrap();

    assert_eq!(result.winning_product.title, "FitPro");
    assert_eq!(result.winning_product.score, 85.0);
    assert!(result.winning_product.image_url.is_some());

    assert_eq!(result.suggestions.len(), 4);
    for suggestion in &result.suggestions {
        let url = suggestion.image_url.as_deref().unwrap();
        assert!(!url.is_empty());
    }

    // The suggestion agent ran exactly once, anchored on the winner.
    assert_eq!(
        agent.suggest_descriptions(),
        vec!["the smart jump rope everyone talks about".to_string()]
    );
    // One winner image call, one suggestion batch call.
    assert_eq!(images.call_count(), 2);
}

#[tokio::test]
async fn ad_source_failure_short_circuits_the_run() {
    init_tracing();

    let ads = Arc::new(StaticAdSource::unavailable(503));
    let agent = Arc::new(MockAgentRuntime::new(Vec::new()));
    let images = Arc::new(MockImageGenerator::new());

    let pipeline = WinningProductPipeline::new(
        ads,
        agent.clone(),
        images.clone(),
        ImageConfig::default(),
        PipelineConfig::default(),
    );

    let err = pipeline.run(Niche::Fitness, Source::Meta).await.unwrap_err();
    assert!(matches!(
        err,
        ScoutError::UpstreamStatus {
            service: "ad source",
            status: 503,
        }
    ));

    // Nothing downstream of the fetch ever ran.
    assert_eq!(agent.score_call_count(), 0);
    assert!(agent.suggest_descriptions().is_empty());
    assert_eq!(images.call_count(), 0);
}

#[tokio::test]
async fn all_failed_scoring_yields_no_winner() {
    init_tracing();

    let ads = Arc::new(StaticAdSource::new(vec![
        ad("One", "first"),
        ad("Two", "second"),
    ]));
    let agent = Arc::new(MockAgentRuntime::new(vec![10.0, 20.0]).with_failing_scores([0, 1]));
    let images = Arc::new(MockImageGenerator::new());

    let pipeline = WinningProductPipeline::new(
        ads,
        agent.clone(),
        images.clone(),
        ImageConfig::default(),
        PipelineConfig::default(),
    );

    let err = pipeline.run(Niche::Pets, Source::Meta).await.unwrap_err();
    assert!(matches!(err, ScoutError::NoWinner));

    // The pipeline declared failure instead of suggesting for a null winner.
    assert!(agent.suggest_descriptions().is_empty());
    assert_eq!(images.call_count(), 0);
}

#[tokio::test]
async fn landing_page_publish_accepted_and_rejected() {
    init_tracing();

    let agent = Arc::new(MockAgentRuntime::new(Vec::new()));
    let publisher = Arc::new(MockPublisher::answering(201));

    let pipeline = LandingPagePipeline::new(
        agent.clone(),
        publisher.clone(),
        PipelineConfig::default(),
    );

    let request = LandingPageRequest {
        name: "Posture Corrector".to_string(),
        price: "19.99".to_string(),
        photos: vec!["https://cdn.test/p1.png".to_string()],
        perspectives: Some(vec![
            "urgency".to_string(),
            "social proof".to_string(),
            "self-care".to_string(),
        ]),
    };

    let outcome = pipeline.run(request.clone()).await.unwrap();
    assert!(outcome.is_accepted());

    let bundles = publisher.received_bundles();
    assert_eq!(bundles.len(), 1);
    assert_eq!(bundles[0].versions.len(), 3);
    assert_eq!(bundles[0].name, "Posture Corrector");

    // A rejected publish is reported as-is; the copy is not regenerated.
    publisher.set_status(500);
    let outcome = pipeline.run(request).await.unwrap();
    assert_eq!(outcome, PublishOutcome::Rejected { status: 500 });
    assert_eq!(agent.copy_call_count(), 2);
}

#[tokio::test]
async fn landing_page_defaults_apply_when_no_perspectives_given() {
    init_tracing();

    let agent = Arc::new(MockAgentRuntime::new(Vec::new()));
    let publisher = Arc::new(MockPublisher::answering(201));
    let config = PipelineConfig::default();
    let default_count = config.default_perspectives.len();

    let pipeline = LandingPagePipeline::new(agent, publisher.clone(), config);

    let request = LandingPageRequest {
        name: "Blender Bottle".to_string(),
        price: "9.50".to_string(),
        photos: Vec::new(),
        perspectives: None,
    };

    let outcome = pipeline.run(request).await.unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(publisher.received_bundles()[0].versions.len(), default_count);
}

#[test]
fn envelopes_follow_the_jsend_contract() {
    let err: Result<product_scout::WinningProductResult, _> = Err(ScoutError::NoWinner);
    let envelope = winning_product_envelope(err);
    assert_eq!(envelope.status, JsendStatus::Fail);
    assert_eq!(envelope.code, 404);
    assert!(envelope.data.is_none());

    let err: Result<product_scout::WinningProductResult, _> = Err(ScoutError::UpstreamStatus {
        service: "ad source",
        status: 502,
    });
    let envelope = winning_product_envelope(err);
    assert_eq!(envelope.status, JsendStatus::Error);
    assert_eq!(envelope.code, 500);
    assert_eq!(envelope.message, "Failed to find a winning product.");

    let envelope = landing_page_envelope(Ok(PublishOutcome::Accepted));
    assert_eq!(envelope.status, JsendStatus::Success);
    assert_eq!(envelope.message, "Landing page generated.");

    let envelope = landing_page_envelope(Ok(PublishOutcome::Rejected { status: 500 }));
    assert_eq!(envelope.status, JsendStatus::Error);
    assert_eq!(envelope.message, "Failed to generate landing page.");
}
