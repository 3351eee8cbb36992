//! HTTP client for the remote segmentation prediction service.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::from_str;
use serde_with::{base64::Base64, serde_as};

use crate::error::Error;

/// Retry budget applied when a request never reaches the service.
pub const DEFAULT_RETRIES: u32 = 2;

const RETRY_DELAY: Duration = Duration::from_millis(250);

#[serde_as]
#[derive(Serialize, Debug)]
struct PredictRequest<'a> {
    #[serde_as(as = "Base64")]
    image: &'a [u8],
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct PredictResponse {
    #[serde_as(as = "Base64")]
    segmented_image: Vec<u8>,
}

/// Client for one prediction endpoint.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct PredictClient {
    http: reqwest::Client,
    endpoint: String,
    retries: u32,
}

impl PredictClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            retries: DEFAULT_RETRIES,
        }
    }

    /// Adjust the retry budget for transport-level failures.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a PNG payload to the service and return the predicted mask as
    /// PNG bytes.
    ///
    /// Only failures where no response was received are retried; any
    /// response the service actually produced is final. A non-200 status is
    /// reported with its body, and a 200 body that is missing the
    /// `segmented_image` key (or carries invalid base64) is a decode error,
    /// never a silent absence.
    pub async fn predict(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let request = PredictRequest { image: payload };

        let mut attempt = 0u32;
        let response = loop {
            match self.http.post(&self.endpoint).json(&request).send().await {
                Ok(response) => break response,
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        "request to {} failed ({err}), retry {attempt}/{}",
                        self.endpoint,
                        self.retries
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => return Err(Error::Transport(err)),
            }
        };

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: PredictResponse = from_str(&text)?;
        Ok(parsed.segmented_image)
    }
}
