use serde::{Deserialize, Serialize};

use crate::types::{PublishOutcome, Result, ScoutError, WinningProductResult};

/// JSEND envelope statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsendStatus {
    Success,
    Fail,
    Error,
}

/// The JSEND wire envelope the routing layer serializes.
///
/// This shape is a fixed contract shared with the rest of the backend;
/// only the `data` payload varies per endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsendResponse<T> {
    pub status: JsendStatus,
    pub data: Option<T>,
    pub message: String,
    pub code: u16,
}

impl<T> JsendResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: JsendStatus::Success,
            data: Some(data),
            message: message.into(),
            code: 200,
        }
    }

    pub fn fail(message: impl Into<String>, code: u16) -> Self {
        Self {
            status: JsendStatus::Fail,
            data: None,
            message: message.into(),
            code,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: JsendStatus::Error,
            data: None,
            message: message.into(),
            code: 500,
        }
    }
}

/// Map a winning-product run onto its envelope.
///
/// Failures carry a generic message only; stage diagnostics stay in the
/// logs and never leak to the caller.
pub fn winning_product_envelope(
    result: Result<WinningProductResult>,
) -> JsendResponse<WinningProductResult> {
    match result {
        Ok(found) => JsendResponse::success(found, "Winning product found."),
        Err(ScoutError::NoWinner) => {
            JsendResponse::fail("No winning product could be selected.", 404)
        }
        Err(_) => JsendResponse::error("Failed to find a winning product."),
    }
}

/// Map a landing-page run onto its envelope.
pub fn landing_page_envelope(outcome: Result<PublishOutcome>) -> JsendResponse<()> {
    match outcome {
        Ok(PublishOutcome::Accepted) => {
            JsendResponse::success((), "Landing page generated.")
        }
        _ => JsendResponse::error("Failed to generate landing page."),
    }
}
