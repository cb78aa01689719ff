use async_trait::async_trait;
use tracing::info;

use crate::error::ScraperError;
use crate::lupa::{reconstruct, DisbursementRecord, RawRow};

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Browser startup
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// Session liveness probe; failure aborts the run before any identifier
    async fn verify(&mut self) -> Result<(), ScraperError>;

    /// Raw row collection across every identifier
    async fn harvest(&mut self) -> Result<Vec<RawRow>, ScraperError>;

    /// Resource release
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// Full run (initialize → verify → harvest → close → reconstruct).
    /// The session is released even when an earlier stage fails.
    async fn execute(&mut self) -> Result<Vec<DisbursementRecord>, ScraperError> {
        self.initialize().await?;

        if let Err(e) = self.verify().await {
            let _ = self.close().await;
            return Err(e);
        }

        let corpus = match self.harvest().await {
            Ok(corpus) => corpus,
            Err(e) => {
                let _ = self.close().await;
                return Err(e);
            }
        };

        self.close().await?;

        info!("Reconstructing records from {} raw rows...", corpus.len());
        Ok(reconstruct(&corpus))
    }
}
