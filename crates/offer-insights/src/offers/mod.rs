//! Job-offer ingestion, filtering, and dashboard aggregates.

pub mod aggregate;
pub mod catalog;
pub mod domain;
pub mod filter;
pub mod ingest;
mod normalizer;
mod raw;
pub mod report;
pub mod router;
pub mod window;

pub use aggregate::{GroupCount, SalaryAverage, NO_DATA, TOP_N};
pub use catalog::{CatalogSnapshot, OfferCatalog};
pub use domain::{Offer, OfferTable, OfferView};
pub use filter::{FilterOptions, OfferFilter, Selection};
pub use ingest::{IngestError, IngestSummary, LoadedOffers, OfferSource};
pub use report::{OverviewReport, SkillsReport};
pub use router::offer_router;
pub use window::DateBounds;
