//! Lupa al Giro report pipeline: fetch per NIT, reconstruct by anchor.

mod fetcher;
mod records;
mod scraper;

pub use fetcher::{fetch_report, try_fetch_report};
pub use records::{reconstruct, DisbursementRecord, RawRow};
pub use scraper::LupaScraper;
