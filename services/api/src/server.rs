use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use offer_insights::config::AppConfig;
use offer_insights::error::AppError;
use offer_insights::offers::{OfferCatalog, OfferSource};
use offer_insights::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let source = OfferSource::from_config(&config.source);
    info!(source = source.kind().label(), location = %source.location(), "offer source selected");
    let catalog = Arc::new(OfferCatalog::new(source));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: catalog.clone(),
    };

    let app = with_service_routes(catalog.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    // Warm the table in the background; requests arriving first share the same load.
    tokio::spawn(async move {
        let snapshot = catalog.snapshot().await;
        info!(
            offers = snapshot.summary.offers_loaded,
            degraded = snapshot.summary.degraded,
            "offer catalog warmed"
        );
    });

    info!(?config.environment, %addr, "offer insights service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
