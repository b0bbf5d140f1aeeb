use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use super::domain::OfferTable;
use super::ingest::{IngestSummary, LoadedOffers, OfferSource};

/// The ingested table together with how it was obtained.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub table: Arc<OfferTable>,
    pub summary: IngestSummary,
}

impl From<LoadedOffers> for CatalogSnapshot {
    fn from(loaded: LoadedOffers) -> Self {
        Self {
            table: Arc::new(loaded.table),
            summary: loaded.summary,
        }
    }
}

/// Process-wide, read-only offer table.
///
/// The first read ingests and memoizes the table; it is only replaced by an
/// explicit [`OfferCatalog::refresh`]. Ingestion runs under `loading`, never
/// under the `snapshot` lock.
#[derive(Debug)]
pub struct OfferCatalog {
    source: OfferSource,
    snapshot: RwLock<Option<CatalogSnapshot>>,
    loading: Mutex<()>,
}

impl OfferCatalog {
    pub fn new(source: OfferSource) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    /// Catalog seeded with an already ingested table.
    pub fn preloaded(source: OfferSource, loaded: LoadedOffers) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Some(loaded.into())),
            loading: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &OfferSource {
        &self.source
    }

    pub async fn table(&self) -> Arc<OfferTable> {
        self.snapshot().await.table
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        if let Some(snapshot) = self.current().await {
            return snapshot;
        }

        let _loading = self.loading.lock().await;
        if let Some(snapshot) = self.current().await {
            return snapshot;
        }

        let snapshot = CatalogSnapshot::from(self.source.load().await);
        *self.snapshot.write().await = Some(snapshot.clone());
        snapshot
    }

    /// Re-ingests and swaps the table. Readers keep their old `Arc` until they ask again.
    pub async fn refresh(&self) -> IngestSummary {
        let _loading = self.loading.lock().await;
        let snapshot = CatalogSnapshot::from(self.source.load().await);
        let summary = snapshot.summary.clone();
        *self.snapshot.write().await = Some(snapshot);
        info!(
            offers = summary.offers_loaded,
            degraded = summary.degraded,
            "offer catalog refreshed"
        );
        summary
    }

    async fn current(&self) -> Option<CatalogSnapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.snapshot.read().await.is_some()
    }
}
