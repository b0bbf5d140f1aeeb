use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use offer_insights::offers::OfferCatalog;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<OfferCatalog>,
}

/// clap value parser for `YYYY-MM-DD` arguments.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    offer_insights::offers::router::parse_date(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_the_rejected_value() {
        assert_eq!(parse_date(" 2023-03-08 "), Ok(NaiveDate::from_ymd_opt(2023, 3, 8).expect("valid")));
        let message = parse_date("08/03/2023").expect_err("slashes are rejected");
        assert!(message.contains("08/03/2023"));
    }
}
