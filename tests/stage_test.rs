use product_scout::config::ImageConfig;
use product_scout::copywriter::CopywriterStage;
use product_scout::{
    enrich, select_winner, CandidateProduct, CopyRequest, MockAgentRuntime, MockImageGenerator,
    Niche, RawAdListing, ScoredAd, ScoringStage, ScoutError,
};
use serde_json::json;
use std::sync::Arc;

fn scored(title: &str, score: f64) -> ScoredAd {
    ScoredAd {
        title: title.to_string(),
        description: format!("{title} description"),
        score,
        image_url: None,
    }
}

fn candidate(name: &str) -> CandidateProduct {
    CandidateProduct {
        name: name.to_string(),
        description: format!("{name} description"),
        price: 25.0,
        supplier: "Supplier".to_string(),
        location: "Oran, Algeria".to_string(),
        image_url: None,
    }
}

fn ad(page_name: &str, caption: &str) -> RawAdListing {
    let mut listing = RawAdListing::new();
    listing.insert("page_name".to_string(), json!(page_name));
    listing.insert("caption".to_string(), json!(caption));
    listing
}

#[test]
fn selector_returns_the_maximum_score() {
    let ads = vec![scored("a", 12.0), scored("b", 91.5), scored("c", 44.0)];
    let winner = select_winner(&ads).unwrap();
    assert_eq!(winner.title, "b");
}

#[test]
fn selector_breaks_ties_by_first_occurrence() {
    let ads = vec![scored("first", 70.0), scored("second", 70.0), scored("third", 70.0)];
    let winner = select_winner(&ads).unwrap();
    assert_eq!(winner.title, "first");
}

#[test]
fn selector_returns_none_on_empty_input() {
    assert!(select_winner(&[]).is_none());
}

#[tokio::test]
async fn scoring_skips_failed_items_and_preserves_order() {
    // Five ads; the third call errors. Survivors keep input order.
    let ads: Vec<RawAdListing> = ["one", "two", "three", "four", "five"]
        .iter()
        .map(|name| ad(name, "caption"))
        .collect();

    let runtime = Arc::new(
        MockAgentRuntime::new(vec![10.0, 20.0, 30.0, 40.0, 50.0]).with_failing_scores([2]),
    );
    let stage = ScoringStage::new(runtime.clone(), 1);

    let survivors = stage.score_all(Niche::Fitness, &ads).await;

    let titles: Vec<&str> = survivors.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["one", "two", "four", "five"]);
    assert_eq!(runtime.score_call_count(), 5);
}

#[tokio::test]
async fn concurrent_scoring_still_preserves_order() {
    let ads: Vec<RawAdListing> = (0..6).map(|i| ad(&format!("ad-{i}"), "caption")).collect();

    let runtime = Arc::new(MockAgentRuntime::new((0..6).map(|i| i as f64).collect()));
    let stage = ScoringStage::new(runtime, 4);

    let survivors = stage.score_all(Niche::Gadgets, &ads).await;

    let titles: Vec<&str> = survivors.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["ad-0", "ad-1", "ad-2", "ad-3", "ad-4", "ad-5"]);
}

#[tokio::test]
async fn enrichment_attaches_urls_by_position() {
    let generator = MockImageGenerator::new();
    let suggestions = vec![candidate("a"), candidate("b"), candidate("c")];

    let (winner, enriched) = enrich(
        &generator,
        &ImageConfig::default(),
        scored("winner", 90.0),
        suggestions,
    )
    .await
    .unwrap();

    assert!(winner.image_url.is_some());

    // The suggestion batch is the generator's second call; URLs land on
    // the product at the same index.
    for (index, product) in enriched.iter().enumerate() {
        let url = product.image_url.as_deref().unwrap();
        assert!(url.ends_with(&format!("1-{index}.png")), "got {url}");
    }
}

#[tokio::test]
async fn enrichment_fails_on_image_count_mismatch() {
    let generator = MockImageGenerator::with_short_batches(1);
    let suggestions = vec![candidate("a"), candidate("b"), candidate("c")];

    let err = enrich(
        &generator,
        &ImageConfig::default(),
        scored("winner", 90.0),
        suggestions,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        ScoutError::ImageCountMismatch {
            expected: 3,
            got: 2,
        }
    ));
}

#[tokio::test]
async fn copywriter_rejects_bundles_missing_perspectives() {
    let runtime = Arc::new(MockAgentRuntime::new(Vec::new()).with_copy_short_by(1));
    let stage = CopywriterStage::new(runtime);

    let request = CopyRequest {
        product_name: "Massage Gun".to_string(),
        price: "39.99".to_string(),
        photos: Vec::new(),
        perspectives: vec![
            "urgency".to_string(),
            "social proof".to_string(),
            "self-care".to_string(),
        ],
        lang: "en".to_string(),
    };

    let err = stage.generate(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ScoutError::PerspectiveMismatch {
            expected: 3,
            got: 2,
        }
    ));
}

#[tokio::test]
async fn copywriter_propagates_agent_failures() {
    let runtime = Arc::new(MockAgentRuntime::new(Vec::new()).with_failing_copy());
    let stage = CopywriterStage::new(runtime);

    let request = CopyRequest {
        product_name: "Massage Gun".to_string(),
        price: "39.99".to_string(),
        photos: Vec::new(),
        perspectives: vec!["urgency".to_string()],
        lang: "fr".to_string(),
    };

    let err = stage.generate(&request).await.unwrap_err();
    assert!(matches!(err, ScoutError::AgentOutput(_)));
}
