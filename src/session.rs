use std::sync::Arc;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::{debug, info};

use crate::error::ScraperError;

/// Known-reachable page for the liveness probe.
const VERIFY_URL: &str = "https://www.google.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One browser session, shared by every report fetch in a run.
///
/// The session owns the browser handle; fetches borrow the page per call and
/// leave it scoped back to the top-level document before returning.
pub struct PortalSession {
    headless: bool,
    browser: Option<Browser>,
    page: Option<Arc<Page>>,
}

impl PortalSession {
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            browser: None,
            page: None,
        }
    }

    pub fn page(&self) -> Result<&Arc<Page>, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("browser not initialized".into()))
    }

    pub async fn initialize(&mut self) -> Result<(), ScraperError> {
        info!("Initializing browser...");

        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            // The report iframe is read through contentDocument.
            .arg("--disable-web-security")
            .arg(format!("--user-agent={}", USER_AGENT));

        if self.headless {
            builder = builder.arg("--headless=new");
        }

        let config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("browser config error: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // Drain browser events in the background.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.page = Some(Arc::new(page));

        info!("Browser initialized");
        Ok(())
    }

    /// Lightweight liveness probe: load a trivial external page. If this
    /// fails there is no point attempting any identifier.
    pub async fn verify(&self) -> Result<(), ScraperError> {
        let page = self.page()?;

        page.goto(VERIFY_URL)
            .await
            .map_err(|e| ScraperError::SessionVerify(e.to_string()))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| ScraperError::SessionVerify(e.to_string()))?;

        info!("Session verified");
        Ok(())
    }

    /// Releases the page and browser handles unconditionally.
    pub async fn close(&mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");

        self.page = None;
        self.browser = None;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = PortalSession::new(true);
        assert!(session.browser.is_none());
        assert!(session.page.is_none());
    }

    #[test]
    fn test_page_before_initialize() {
        let session = PortalSession::new(true);
        assert!(matches!(
            session.page(),
            Err(ScraperError::BrowserInit(_))
        ));
    }
}
