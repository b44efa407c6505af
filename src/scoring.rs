use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::agent::AgentRuntime;
use crate::types::{Niche, RawAdListing, ScoredAd};

/// Scoring stage: one agent call per ad, with per-item isolation.
///
/// A failed call is logged and skipped; it never aborts the batch. Output
/// preserves the input order of surviving items. Calls run concurrently up
/// to the configured limit; 1 means strictly sequential.
pub struct ScoringStage {
    runtime: Arc<dyn AgentRuntime>,
    concurrency: usize,
}

impl ScoringStage {
    pub fn new(runtime: Arc<dyn AgentRuntime>, concurrency: usize) -> Self {
        Self {
            runtime,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn score_all(&self, niche: Niche, ads: &[RawAdListing]) -> Vec<ScoredAd> {
        debug!(
            "Scoring {} ads for niche {} with {}",
            ads.len(),
            niche,
            self.runtime.runtime_name()
        );

        // buffered() yields results in input order regardless of which
        // call finishes first.
        let results: Vec<_> = stream::iter(ads.iter().map(|ad| self.runtime.score_ad(niche, ad)))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut survivors = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(scored) => survivors.push(scored),
                Err(e) => warn!("Skipping ad {} for niche {}: {}", index, niche, e),
            }
        }

        survivors
    }
}

/// Pick the highest-scored ad; ties keep the first occurrence.
///
/// Strict `>` makes the selection stable and keeps an incomparable (NaN)
/// score from ever displacing an incumbent.
pub fn select_winner(scored: &[ScoredAd]) -> Option<&ScoredAd> {
    let mut best: Option<&ScoredAd> = None;
    for ad in scored {
        match best {
            None => best = Some(ad),
            Some(current) if ad.score > current.score => best = Some(ad),
            Some(_) => {}
        }
    }
    best
}
