use std::sync::Arc;
use tracing::{debug, info};

use crate::agent::AgentRuntime;
use crate::types::{CopyRequest, ProductCopyBundle, Result, ScoutError};

/// Copy generation stage: one agent call covering every requested
/// perspective at once.
///
/// The HTML quality contract (headline, long-form body, bullet emphasis,
/// call-to-action) is enforced through the agent instructions; what this
/// stage checks programmatically is the structural contract, that every
/// perspective came back as a variant.
pub struct CopywriterStage {
    runtime: Arc<dyn AgentRuntime>,
}

impl CopywriterStage {
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self { runtime }
    }

    pub async fn generate(&self, request: &CopyRequest) -> Result<ProductCopyBundle> {
        if request.perspectives.is_empty() {
            return Err(ScoutError::Config(
                "no marketing perspectives requested and none configured".to_string(),
            ));
        }

        debug!(
            "Generating copy for {} across {} perspectives with {}",
            request.product_name,
            request.perspectives.len(),
            self.runtime.runtime_name()
        );

        let bundle = self.runtime.generate_copy(request).await?;

        if bundle.versions.len() != request.perspectives.len() {
            return Err(ScoutError::PerspectiveMismatch {
                expected: request.perspectives.len(),
                got: bundle.versions.len(),
            });
        }

        info!(
            "Copy bundle ready for {} with {} variants",
            bundle.name,
            bundle.versions.len()
        );

        Ok(bundle)
    }
}
