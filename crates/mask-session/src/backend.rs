//! Submission backend: where finished image + mask pairs are stored.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::BackendError;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// JSON body of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitPayload {
    pub provider: String,
    pub id: String,
    pub page: String,
    /// Base64 JPEG of the original pixels.
    pub image: String,
    /// Base64 PNG of the mask.
    pub mask: String,
    pub author: String,
}

#[async_trait]
pub trait SubmitBackend: Send + Sync {
    async fn submit(&self, payload: &SubmitPayload) -> Result<(), BackendError>;
}

/// `PUT`s submissions as JSON to a fixed endpoint.
pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmitBackend for HttpBackend {
    async fn submit(&self, payload: &SubmitPayload) -> Result<(), BackendError> {
        let response = self
            .http
            .put(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        log::info!(
            "submitted {}/{}/{} as {}",
            payload.provider,
            payload.id,
            payload.page,
            payload.author
        );
        Ok(())
    }
}
