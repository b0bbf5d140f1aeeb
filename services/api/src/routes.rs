use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use offer_insights::offers::{offer_router, OfferCatalog};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_service_routes(catalog: Arc<OfferCatalog>) -> Router {
    offer_router(catalog)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once the listener is bound and the first offer table is in memory.
pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed) && state.catalog.is_loaded().await;
    if !ready {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        );
    }

    let snapshot = state.catalog.snapshot().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "offers": snapshot.summary.offers_loaded,
            "degraded": snapshot.summary.degraded,
        })),
    )
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use chrono::Utc;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use offer_insights::offers::ingest::{read_csv, ApiSource, SourceKind};
    use offer_insights::offers::{IngestSummary, LoadedOffers, OfferSource, OfferTable};
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const SNAPSHOT: &str = "\
title,city,marker_icon,workplace_type,employment_type,experience_level,published_at
Java Dev,Warszawa,java,remote,b2b,mid,2023-03-08
Go Dev,Gdańsk,go,office,b2b,senior,2023-03-10
";

    fn loaded_catalog() -> Arc<OfferCatalog> {
        let batch = read_csv(SNAPSHOT.as_bytes()).expect("snapshot parses");
        let table = OfferTable::new(batch.offers);
        let summary = IngestSummary {
            source: SourceKind::Csv,
            location: "inline".to_string(),
            records_seen: batch.records_seen,
            offers_loaded: table.len(),
            records_skipped: batch.records_skipped,
            degraded: false,
            error: None,
            loaded_at: Utc::now(),
        };
        Arc::new(OfferCatalog::preloaded(
            OfferSource::Csv(PathBuf::from("inline.csv")),
            LoadedOffers { table, summary },
        ))
    }

    fn app(catalog: Arc<OfferCatalog>, ready: bool) -> Router {
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
            catalog: catalog.clone(),
        };
        with_service_routes(catalog).layer(Extension(state))
    }

    async fn read_json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request builds")
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let response = app(loaded_catalog(), false)
            .oneshot(get_request("/health"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_waits_for_listener() {
        let response = app(loaded_catalog(), false)
            .oneshot(get_request("/ready"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(read_json_body(response).await["status"], "initializing");
    }

    #[tokio::test]
    async fn readiness_waits_for_first_table() {
        let catalog = Arc::new(OfferCatalog::new(OfferSource::Csv(PathBuf::from(
            "./not-yet-loaded.csv",
        ))));
        let response = app(catalog, true)
            .oneshot(get_request("/ready"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn readiness_answers_during_slow_first_load() {
        let upstream = Router::new().route(
            "/offers",
            get(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                Json(json!([]))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener address");
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.ok();
        });

        let mut api = ApiSource::new(format!("http://{addr}/offers"));
        api.retries = 0;
        let catalog = Arc::new(OfferCatalog::new(OfferSource::Api(api)));
        let warming = tokio::spawn({
            let catalog = catalog.clone();
            async move { catalog.snapshot().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        let response = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            app(catalog, true).oneshot(get_request("/ready")),
        )
        .await
        .expect("readiness answers without waiting for ingestion")
        .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(read_json_body(response).await["status"], "initializing");

        warming.await.expect("warm-up task completes");
    }

    #[tokio::test]
    async fn readiness_reports_loaded_offers() {
        let response = app(loaded_catalog(), true)
            .oneshot(get_request("/ready"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["offers"], 2);
        assert_eq!(payload["degraded"], false);
    }

    #[tokio::test]
    async fn offer_routes_are_mounted() {
        let response = app(loaded_catalog(), true)
            .oneshot(get_request("/api/v1/offers/filters"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["cities"], serde_json::json!(["Warszawa", "Gdańsk"]));
    }

    #[tokio::test]
    async fn metrics_are_plain_text() {
        let response = app(loaded_catalog(), true)
            .oneshot(get_request("/metrics"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
