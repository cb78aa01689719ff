use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("browser init error: {0}")]
    BrowserInit(String),

    #[error("session verify failed: {0}")]
    SessionVerify(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("javascript error: {0}")]
    JavaScript(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("report widget not located within {0}s")]
    LocateTimeout(u64),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("file I/O error: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScraperError {
    /// Fatal errors abort the whole run. Everything else is confined to the
    /// NIT being fetched when it occurred.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BrowserInit(_) | Self::SessionVerify(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ScraperError::BrowserInit("no chrome".into()).is_fatal());
        assert!(ScraperError::SessionVerify("offline".into()).is_fatal());
        assert!(!ScraperError::LocateTimeout(15).is_fatal());
        assert!(!ScraperError::Navigation("lost".into()).is_fatal());
    }
}
