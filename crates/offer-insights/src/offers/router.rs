use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::catalog::OfferCatalog;
use super::filter::{FilterOptions, OfferFilter, Selection};
use super::ingest::IngestSummary;
use super::report::{OverviewReport, SkillsReport};
use crate::error::AppError;

/// Rejections for request bodies that decode but carry unusable values.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("'{value}' is not a YYYY-MM-DD date ({reason})")]
    InvalidDate {
        value: String,
        reason: chrono::ParseError,
    },
}

/// Filter selection as a dashboard submits it.
///
/// An omitted multi-select means "every observed value"; an empty list selects nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub employment_types: Option<Vec<String>>,
    #[serde(default)]
    pub workplace_types: Option<Vec<String>>,
    #[serde(default)]
    pub experience_levels: Option<Vec<String>>,
}

impl SelectionRequest {
    pub fn into_filter(self, options: &FilterOptions) -> OfferFilter {
        let mut filter = options.select_all(self.city, self.category);
        if let Some(values) = self.employment_types {
            filter.employment_types = values.into_iter().collect::<Selection>();
        }
        if let Some(values) = self.workplace_types {
            filter.workplace_types = values.into_iter().collect::<Selection>();
        }
        if let Some(values) = self.experience_levels {
            filter.experience_levels = values.into_iter().collect::<Selection>();
        }
        filter
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillsRequest {
    #[serde(default)]
    pub cutoff: Option<String>,
    #[serde(default)]
    pub filter: Option<SelectionRequest>,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, RequestError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|reason| RequestError::InvalidDate {
        value: raw.to_string(),
        reason,
    })
}

/// Router builder exposing the dashboard endpoints over a shared catalog.
pub fn offer_router(catalog: Arc<OfferCatalog>) -> Router {
    Router::new()
        .route("/api/v1/offers/filters", get(filters_handler))
        .route("/api/v1/offers/overview", post(overview_handler))
        .route("/api/v1/offers/skills", post(skills_handler))
        .route("/api/v1/offers/refresh", post(refresh_handler))
        .with_state(catalog)
}

pub(crate) async fn filters_handler(
    State(catalog): State<Arc<OfferCatalog>>,
) -> Json<FilterOptions> {
    let table = catalog.table().await;
    Json(FilterOptions::from_table(&table))
}

pub(crate) async fn overview_handler(
    State(catalog): State<Arc<OfferCatalog>>,
    Json(request): Json<SelectionRequest>,
) -> Json<OverviewReport> {
    let table = catalog.table().await;
    let filter = request.into_filter(&FilterOptions::from_table(&table));
    Json(OverviewReport::build(&table, &filter))
}

pub(crate) async fn skills_handler(
    State(catalog): State<Arc<OfferCatalog>>,
    Json(request): Json<SkillsRequest>,
) -> Result<Json<SkillsReport>, AppError> {
    let cutoff = request.cutoff.as_deref().map(parse_date).transpose()?;
    let table = catalog.table().await;
    let filter = request
        .filter
        .map(|selection| selection.into_filter(&FilterOptions::from_table(&table)));
    Ok(Json(SkillsReport::build(&table, cutoff, filter.as_ref())))
}

pub(crate) async fn refresh_handler(State(catalog): State<Arc<OfferCatalog>>) -> Json<IngestSummary> {
    Json(catalog.refresh().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offers::domain::fixtures::{offer, published, with_skills};
    use crate::offers::domain::OfferTable;
    use crate::offers::ingest::{IngestSummary, LoadedOffers, OfferSource, SourceKind};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn catalog() -> Arc<OfferCatalog> {
        let mut senior = with_skills(offer("Warszawa", "java"), ["Java", "Kotlin", ""]);
        senior.experience_level = "senior".to_string();
        let table = OfferTable::new(vec![
            published(with_skills(offer("Warszawa", "java"), ["Java", "", ""]), 2023, 3, 8),
            published(senior, 2023, 3, 10),
            published(offer("Kraków", "python"), 2023, 3, 12),
        ]);
        let summary = IngestSummary {
            source: SourceKind::Csv,
            location: "fixture".to_string(),
            records_seen: table.len(),
            offers_loaded: table.len(),
            records_skipped: 0,
            degraded: false,
            error: None,
            loaded_at: chrono::Utc::now(),
        };
        Arc::new(OfferCatalog::preloaded(
            OfferSource::Csv(PathBuf::from("./fixture-not-on-disk.csv")),
            LoadedOffers { table, summary },
        ))
    }

    async fn read_json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[test]
    fn omitted_multi_selects_default_to_all_values() {
        let options = FilterOptions {
            employment_types: vec!["b2b".into(), "permanent".into()],
            workplace_types: vec!["remote".into()],
            experience_levels: vec!["mid".into()],
            ..FilterOptions::default()
        };
        let request = SelectionRequest {
            city: Some("Warszawa".into()),
            workplace_types: Some(Vec::new()),
            ..SelectionRequest::default()
        };
        let filter = request.into_filter(&options);
        assert_eq!(filter.city.as_deref(), Some("Warszawa"));
        assert_eq!(filter.employment_types.len(), 2);
        assert!(filter.workplace_types.is_empty());
        assert!(filter.experience_levels.contains("mid"));
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("2023-03-10").is_ok());
        let error = parse_date("10.03.2023").expect_err("wrong format");
        assert!(error.to_string().contains("10.03.2023"));
    }

    #[tokio::test]
    async fn filters_route_lists_observed_values() {
        let response = offer_router(catalog())
            .oneshot(
                Request::get("/api/v1/offers/filters")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["cities"], json!(["Warszawa", "Kraków"]));
        assert_eq!(payload["date_bounds"]["earliest"], json!("2023-03-08"));
    }

    #[tokio::test]
    async fn overview_route_applies_selection() {
        let response = offer_router(catalog())
            .oneshot(post_json(
                "/api/v1/offers/overview",
                json!({"city": "Warszawa", "experience_levels": ["senior"]}),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["total_offers"], json!(3));
        assert_eq!(payload["filtered_offers"], json!(1));
        assert_eq!(payload["average_salary"]["label"], json!("no data"));
        assert_eq!(payload["top_cities"][0]["key"], json!("Warszawa"));
    }

    #[tokio::test]
    async fn skills_route_windows_by_cutoff() {
        let response = offer_router(catalog())
            .oneshot(post_json("/api/v1/offers/skills", json!({"cutoff": "2023-03-10"})))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["window_offers"], json!(2));
        assert_eq!(payload["top_skills"][0], json!({"key": "Java", "count": 2}));
    }

    #[tokio::test]
    async fn skills_route_rejects_bad_cutoff() {
        let response = offer_router(catalog())
            .oneshot(post_json("/api/v1/offers/skills", json!({"cutoff": "March"})))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json_body(response).await;
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("March"));
    }

    #[tokio::test]
    async fn refresh_route_reports_degraded_ingestion() {
        let catalog = catalog();
        let response = offer_router(catalog.clone())
            .oneshot(
                Request::post("/api/v1/offers/refresh")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["degraded"], json!(true));
        assert_eq!(payload["offers_loaded"], json!(0));
        assert!(catalog.table().await.is_empty());
    }
}
