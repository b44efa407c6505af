use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{HttpConfig, PublishConfig};
use crate::types::{ProductCopyBundle, PublishOutcome, Result, ScoutError};

/// Trait for pushing a finished copy bundle to the landing-page service.
///
/// One attempt per bundle; a non-created status is an outcome, not an
/// error, so the caller can map it onto the user-visible response.
#[async_trait]
pub trait CopyPublisher: Send + Sync {
    async fn publish(&self, bundle: &ProductCopyBundle) -> Result<PublishOutcome>;
}

/// Publisher that POSTs the serialized bundle downstream.
pub struct HttpCopyPublisher {
    client: Client,
    config: PublishConfig,
}

impl HttpCopyPublisher {
    pub fn new(http: &HttpConfig, config: PublishConfig) -> Self {
        let client = Client::builder()
            .user_agent(&http.user_agent)
            .timeout(Duration::from_secs(http.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn endpoint(&self) -> Result<String> {
        if self.config.base_url.is_empty() {
            return Err(ScoutError::Config(
                "publish base URL is not configured".to_string(),
            ));
        }
        Ok(format!(
            "{}/agent-create-lps/",
            self.config.base_url.trim_end_matches('/')
        ))
    }
}

#[async_trait]
impl CopyPublisher for HttpCopyPublisher {
    async fn publish(&self, bundle: &ProductCopyBundle) -> Result<PublishOutcome> {
        let endpoint = self.endpoint()?;

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.token)
            .json(bundle)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            info!("Landing-page service accepted bundle for {}", bundle.name);
            Ok(PublishOutcome::Accepted)
        } else {
            warn!(
                "Landing-page service rejected bundle for {} with HTTP {}",
                bundle.name, status
            );
            Ok(PublishOutcome::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

/// Publisher double that records bundles and answers a fixed status.
pub struct MockPublisher {
    status: AtomicU16,
    received: Mutex<Vec<ProductCopyBundle>>,
}

impl MockPublisher {
    pub fn answering(status: u16) -> Self {
        Self {
            status: AtomicU16::new(status),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    pub fn received_bundles(&self) -> Vec<ProductCopyBundle> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl CopyPublisher for MockPublisher {
    async fn publish(&self, bundle: &ProductCopyBundle) -> Result<PublishOutcome> {
        self.received.lock().unwrap().push(bundle.clone());

        let status = self.status.load(Ordering::SeqCst);
        if status == 201 {
            Ok(PublishOutcome::Accepted)
        } else {
            Ok(PublishOutcome::Rejected { status })
        }
    }
}
