//! ADRES "Lupa al Giro" disbursement scraper.
//!
//! Drives one headless Chrome session through the public payment-report
//! portal, one query per NIT, and reconstructs a cleaned dataset from the
//! rendered report tables.
//!
//! # Pipeline usage
//!
//! ```rust,ignore
//! use chrono::NaiveDate;
//! use lupa_al_giro::{LupaScraper, Scraper, ScraperConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::new(
//!         NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
//!     );
//!
//!     let mut scraper = LupaScraper::new(config, vec!["802010614".to_string()]);
//!     let records = scraper.execute().await.unwrap();
//!     println!("Records: {}", records.len());
//! }
//! ```
//!
//! # Service usage
//!
//! ```rust,ignore
//! use lupa_al_giro::{ScrapeRequest, ScraperService};
//! use tower::Service;
//!
//! let mut service = ScraperService::new();
//! let outcome = service.call(request).await.unwrap();
//! println!("Records: {}", outcome.records().len());
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod lupa;
pub mod service;
pub mod session;
pub mod traits;

// Re-export the main types
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use lupa::{reconstruct, DisbursementRecord, LupaScraper, RawRow};
pub use service::{ScrapeOutcome, ScrapeRequest, ScraperService};
pub use session::PortalSession;
pub use traits::Scraper;
