use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

/// Public report page of the Lupa al Giro portal.
pub const PORTAL_URL: &str = "https://www.adres.gov.co/lupa-al-giro/identifica-tu-giro";

/// Date format the report form expects.
const PORTAL_DATE_FMT: &str = "%d/%m/%Y";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub portal_url: String,
    /// Query period, inclusive on both ends per portal convention.
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Bounded poll window for locating the embedded report widget.
    pub locate_timeout: Duration,
    /// Cap on the wait for the report to finish rendering.
    pub render_wait: Duration,
    pub headless: bool,
    pub debug: bool,
    pub backup_dir: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            portal_url: PORTAL_URL.to_string(),
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            locate_timeout: Duration::from_secs(15),
            render_wait: Duration::from_secs(35),
            headless: true,
            debug: false,
            backup_dir: PathBuf::from("./backups"),
        }
    }
}

impl ScraperConfig {
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            ..Default::default()
        }
    }

    pub fn with_portal_url(mut self, url: impl Into<String>) -> Self {
        self.portal_url = url.into();
        self
    }

    pub fn with_locate_timeout(mut self, timeout: Duration) -> Self {
        self.locate_timeout = timeout;
        self
    }

    pub fn with_render_wait(mut self, wait: Duration) -> Self {
        self.render_wait = wait;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Period start as the form expects it (DD/MM/YYYY).
    pub fn date_from_field(&self) -> String {
        self.date_from.format(PORTAL_DATE_FMT).to_string()
    }

    /// Period end as the form expects it (DD/MM/YYYY).
    pub fn date_to_field(&self) -> String {
        self.date_to.format(PORTAL_DATE_FMT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScraperConfig::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
        .with_headless(false)
        .with_locate_timeout(Duration::from_secs(5))
        .with_render_wait(Duration::from_secs(10))
        .with_backup_dir("/tmp/backups");

        assert_eq!(config.portal_url, PORTAL_URL);
        let config = config.with_portal_url("http://localhost:8080/informe");
        assert_eq!(config.portal_url, "http://localhost:8080/informe");
        assert!(!config.headless);
        assert_eq!(config.locate_timeout, Duration::from_secs(5));
        assert_eq!(config.render_wait, Duration::from_secs(10));
        assert_eq!(config.backup_dir, PathBuf::from("/tmp/backups"));
    }

    #[test]
    fn test_portal_date_fields() {
        let config = ScraperConfig::default();
        assert_eq!(config.date_from_field(), "01/01/2025");
        assert_eq!(config.date_to_field(), "31/01/2026");
    }
}
