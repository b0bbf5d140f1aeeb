use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::{IngestError, NormalizedBatch};
use crate::config::SourceConfig;
use crate::offers::normalizer::normalize_raw;
use crate::offers::raw::RawOffer;

const USER_AGENT_VALUE: &str = concat!("offer-insights/", env!("CARGO_PKG_VERSION"));

/// Remote JSON endpoint publishing the offer list.
#[derive(Debug, Clone)]
pub struct ApiSource {
    pub url: String,
    pub timeout: Duration,
    pub retries: u32,
}

impl ApiSource {
    pub fn new(url: impl Into<String>) -> Self {
        let defaults = SourceConfig::default();
        Self {
            url: url.into(),
            timeout: defaults.fetch_timeout,
            retries: defaults.fetch_retries,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            url: config.api_url.clone(),
            timeout: config.fetch_timeout,
            retries: config.fetch_retries,
        }
    }

    /// Fetches and normalizes the offer list.
    ///
    /// A non-success status means "no offers" and yields an empty batch. Transport
    /// failures are retried `retries` times before surfacing as [`IngestError::Http`].
    pub async fn fetch(&self) -> Result<NormalizedBatch, IngestError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .timeout(self.timeout)
            .build()
            .map_err(|source| IngestError::Http {
                attempts: 0,
                source,
            })?;

        let attempts = self.retries.saturating_add(1);
        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            debug!(url = %self.url, attempt, "fetching offers");
            match client.get(&self.url).send().await {
                Ok(response) => break response,
                Err(source) if attempt >= attempts => {
                    return Err(IngestError::Http {
                        attempts: attempt,
                        source,
                    })
                }
                Err(err) => {
                    warn!(url = %self.url, attempt, error = %err, "offer fetch failed, retrying");
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, %status, "offer API answered without success; treating as no offers");
            return Ok(NormalizedBatch::default());
        }

        let body = response.bytes().await.map_err(|source| IngestError::Http {
            attempts: attempt,
            source,
        })?;
        decode_offers(&body).map_err(IngestError::from)
    }
}

fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(250 * u64::from(attempt))
}

/// Decodes a JSON array of offers. Elements that are not objects are skipped and counted.
pub(crate) fn decode_offers(body: &[u8]) -> Result<NormalizedBatch, serde_json::Error> {
    let elements: Vec<Value> = serde_json::from_slice(body)?;
    let mut batch = NormalizedBatch::default();

    for element in elements {
        batch.records_seen += 1;
        let raw = match serde_json::from_value::<RawOffer>(element) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "skipping undecodable offer record");
                batch.records_skipped += 1;
                continue;
            }
        };

        match normalize_raw(raw) {
            Some(offer) => batch.offers.push(offer),
            None => batch.records_skipped += 1,
        }
    }

    Ok(batch)
}
