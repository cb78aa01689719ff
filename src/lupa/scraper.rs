//! Pipeline driver: one shared session, every NIT in sequence, one
//! reconstruction pass over the accumulated corpus.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::export;
use crate::session::PortalSession;
use crate::traits::Scraper;

use super::fetcher::fetch_report;
use super::records::RawRow;

pub struct LupaScraper {
    config: ScraperConfig,
    nits: Vec<String>,
    session: PortalSession,
}

impl LupaScraper {
    pub fn new(config: ScraperConfig, nits: Vec<String>) -> Self {
        let session = PortalSession::new(config.headless);
        Self {
            config,
            nits,
            session,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }
}

/// First-seen-order deduplication of the identifier list.
pub(crate) fn dedupe_nits(nits: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    nits.iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}

#[async_trait]
impl Scraper for LupaScraper {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        self.session.initialize().await
    }

    async fn verify(&mut self) -> Result<(), ScraperError> {
        self.session.verify().await
    }

    async fn harvest(&mut self) -> Result<Vec<RawRow>, ScraperError> {
        let unique = dedupe_nits(&self.nits);
        info!(
            "Starting extraction for {} unique NITs ({} listed)...",
            unique.len(),
            self.nits.len()
        );

        let mut corpus: Vec<RawRow> = Vec::new();
        for (i, nit) in unique.iter().enumerate() {
            info!("[{}/{}] Fetching NIT {}", i + 1, unique.len(), nit);
            let rows = fetch_report(&self.session, nit, &self.config).await;
            debug!("NIT {}: {} raw rows", nit, rows.len());
            corpus.extend(rows);
        }

        if self.config.debug {
            export::dump_raw_corpus(&self.config.backup_dir, &corpus);
        }

        Ok(corpus)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.session.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Scraper as _;

    fn nits(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_dedupe_preserves_first_seen_order() {
        assert_eq!(dedupe_nits(&nits(&["A", "B", "A"])), nits(&["A", "B"]));
        assert_eq!(
            dedupe_nits(&nits(&["890303208", "816001182", "890303208", "816001182"])),
            nits(&["890303208", "816001182"])
        );
        assert!(dedupe_nits(&[]).is_empty());
    }

    #[test]
    fn test_scraper_new() {
        let scraper = LupaScraper::new(ScraperConfig::default(), nits(&["802010614"]));
        assert_eq!(scraper.nits.len(), 1);
        assert!(scraper.config().headless);
    }

    // Every identifier is still attempted when fetches fail; a dead session
    // just contributes nothing per NIT.
    #[tokio::test]
    async fn test_harvest_survives_dead_session() {
        let mut scraper = LupaScraper::new(ScraperConfig::default(), nits(&["A", "B", "A"]));
        let corpus = scraper.harvest().await.unwrap();
        assert!(corpus.is_empty());
    }

    // Live-portal run: cargo test test_live_pipeline -- --ignored --nocapture
    #[tokio::test]
    #[ignore]
    async fn test_live_pipeline() {
        tracing_subscriber::fmt()
            .with_env_filter("info,lupa_al_giro=debug")
            .init();

        let config = ScraperConfig::default().with_debug(true);
        let mut scraper = LupaScraper::new(config, nits(&["802010614"]));

        match scraper.execute().await {
            Ok(records) => {
                println!("\n=== Records: {} ===", records.len());
                for r in records.iter().take(5) {
                    println!("  {} {} {} {}", r.nit_ips, r.fecha_giro, r.valor, r.entidad);
                }
            }
            Err(e) => panic!("pipeline failed: {:?}", e),
        }
    }
}
