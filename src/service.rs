use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::NaiveDate;
use tower::Service;
use tracing::info;

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::lupa::{DisbursementRecord, LupaScraper};
use crate::traits::Scraper;

/// One full pipeline run: a NIT list over a query period.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub nits: Vec<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub headless: bool,
    pub debug: bool,
}

impl ScrapeRequest {
    pub fn new(nits: Vec<String>, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            nits,
            date_from,
            date_to,
            headless: true,
            debug: false,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl From<&ScrapeRequest> for ScraperConfig {
    fn from(req: &ScrapeRequest) -> Self {
        ScraperConfig::new(req.date_from, req.date_to)
            .with_headless(req.headless)
            .with_debug(req.debug)
    }
}

/// Outcome of a completed run. `NoMatches` distinguishes "ran but matched
/// nothing" from a crash.
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    Records(Vec<DisbursementRecord>),
    NoMatches,
}

impl ScrapeOutcome {
    pub fn from_records(records: Vec<DisbursementRecord>) -> Self {
        if records.is_empty() {
            Self::NoMatches
        } else {
            Self::Records(records)
        }
    }

    pub fn records(&self) -> &[DisbursementRecord] {
        match self {
            Self::Records(records) => records,
            Self::NoMatches => &[],
        }
    }
}

/// tower::Service wrapper around the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    // Room for future extensions (rate limits, caching).
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeOutcome;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("Scrape request received: {} NITs", req.nits.len());

        Box::pin(async move {
            let config = ScraperConfig::from(&req);
            let mut scraper = LupaScraper::new(config, req.nits);

            let records = scraper.execute().await?;

            info!("Scrape finished: {} records", records.len());
            Ok(ScrapeOutcome::from_records(records))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_scrape_request_builder() {
        let (from, to) = period();
        let req = ScrapeRequest::new(vec!["802010614".to_string()], from, to)
            .with_headless(false)
            .with_debug(true);

        assert_eq!(req.nits.len(), 1);
        assert!(!req.headless);
        assert!(req.debug);
    }

    #[test]
    fn test_scrape_request_to_config() {
        let (from, to) = period();
        let req = ScrapeRequest::new(vec![], from, to).with_headless(false);
        let config = ScraperConfig::from(&req);

        assert_eq!(config.date_from, from);
        assert_eq!(config.date_to, to);
        assert!(!config.headless);
    }

    #[test]
    fn test_outcome_from_records() {
        assert!(matches!(
            ScrapeOutcome::from_records(vec![]),
            ScrapeOutcome::NoMatches
        ));

        let record = DisbursementRecord {
            nit_ips: "1".to_string(),
            nombre_ips: "Clinica".to_string(),
            fecha_giro: "01/01/2025".to_string(),
            valor: 100,
            concepto: "N/A".to_string(),
            entidad: "N/A".to_string(),
        };
        let outcome = ScrapeOutcome::from_records(vec![record]);
        assert_eq!(outcome.records().len(), 1);
    }
}
