mod api;
mod snapshot;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::domain::{Offer, OfferTable};
use crate::config::SourceConfig;

pub use api::ApiSource;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read offer snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid offer CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("offer API request failed after {attempts} attempt(s): {source}")]
    Http {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("offer API payload is not a JSON array of offers: {0}")]
    Json(#[from] serde_json::Error),
}

/// Offers produced by one decoding pass plus bookkeeping about dropped records.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub offers: Vec<Offer>,
    pub records_seen: usize,
    pub records_skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Api,
    Csv,
}

impl SourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Api => "Remote offer API",
            Self::Csv => "CSV snapshot",
        }
    }
}

/// What an ingestion produced, reported back on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub source: SourceKind,
    pub location: String,
    pub records_seen: usize,
    pub offers_loaded: usize,
    pub records_skipped: usize,
    /// Set when ingestion failed and the table was replaced by an empty one.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct LoadedOffers {
    pub table: OfferTable,
    pub summary: IngestSummary,
}

/// Where the offer table comes from.
#[derive(Debug, Clone)]
pub enum OfferSource {
    Api(ApiSource),
    Csv(PathBuf),
}

impl OfferSource {
    /// A configured CSV snapshot wins over the remote API.
    pub fn from_config(config: &SourceConfig) -> Self {
        match &config.csv_path {
            Some(path) => Self::Csv(path.clone()),
            None => Self::Api(ApiSource::from_config(config)),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Api(_) => SourceKind::Api,
            Self::Csv(_) => SourceKind::Csv,
        }
    }

    pub fn location(&self) -> String {
        match self {
            Self::Api(api) => api.url.clone(),
            Self::Csv(path) => path.display().to_string(),
        }
    }

    /// Loads the table, surfacing any ingestion failure.
    pub async fn try_load(&self) -> Result<LoadedOffers, IngestError> {
        let batch = match self {
            Self::Api(api) => api.fetch().await?,
            Self::Csv(path) => read_csv_path(path)?,
        };

        let summary = IngestSummary {
            source: self.kind(),
            location: self.location(),
            records_seen: batch.records_seen,
            offers_loaded: batch.offers.len(),
            records_skipped: batch.records_skipped,
            degraded: false,
            error: None,
            loaded_at: Utc::now(),
        };
        info!(
            source = self.kind().label(),
            location = %summary.location,
            offers = summary.offers_loaded,
            skipped = summary.records_skipped,
            "offer table loaded"
        );

        Ok(LoadedOffers {
            table: OfferTable::new(batch.offers),
            summary,
        })
    }

    /// Loads the table, degrading to an empty one when ingestion fails.
    pub async fn load(&self) -> LoadedOffers {
        match self.try_load().await {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(
                    source = self.kind().label(),
                    location = %self.location(),
                    error = %err,
                    "offer ingestion failed; continuing with an empty table"
                );
                LoadedOffers {
                    table: OfferTable::empty(),
                    summary: IngestSummary {
                        source: self.kind(),
                        location: self.location(),
                        records_seen: 0,
                        offers_loaded: 0,
                        records_skipped: 0,
                        degraded: true,
                        error: Some(err.to_string()),
                        loaded_at: Utc::now(),
                    },
                }
            }
        }
    }
}

/// Reads a CSV snapshot from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<NormalizedBatch, IngestError> {
    Ok(snapshot::read_offers(reader)?)
}

pub fn read_csv_path<P: AsRef<Path>>(path: P) -> Result<NormalizedBatch, IngestError> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Decodes an API payload that was obtained some other way.
pub fn decode_json(body: &[u8]) -> Result<NormalizedBatch, IngestError> {
    Ok(api::decode_offers(body)?)
}
