//! Report fetch for a single NIT.
//!
//! The portal hosts the report generator inside a SharePoint web-part iframe
//! that ordinary input simulation cannot reach. Field values are injected
//! straight into the frame document and the resulting table rows are read
//! back out of its markup.

use std::time::{Duration, Instant};

use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::session::PortalSession;

use super::records::{RawRow, MIN_ROW_CELLS};

/// Poll interval for the locate and render loops.
const POLL_INTERVAL_MS: u64 = 500;
/// Consecutive identical samples before the report counts as rendered.
const REQUIRED_STABLE_CHECKS: u32 = 3;

/// Grabs the report web-part iframe element and scopes later scripts to it
/// through `window.__lupaFrame`. The element is held rather than its
/// document: the frame navigates when the form submits, and a captured
/// document would go stale.
const ACQUIRE_FRAME_SCRIPT: &str = r#"
    (() => {
        const frame = document.querySelector("iframe[id*='WebPartWPQ']");
        if (!frame || !frame.contentDocument) {
            return false;
        }
        window.__lupaFrame = frame;
        return true;
    })()
"#;

/// Drops the frame scope, restoring the top-level document.
const RELEASE_FRAME_SCRIPT: &str = "delete window.__lupaFrame; true";

const FRAME_LENGTH_SCRIPT: &str = r#"
    (() => {
        const frame = window.__lupaFrame;
        if (!frame || !frame.contentDocument) {
            return 0;
        }
        return frame.contentDocument.documentElement.outerHTML.length;
    })()
"#;

const FRAME_HTML_SCRIPT: &str = r#"
    (() => {
        const frame = window.__lupaFrame;
        if (!frame || !frame.contentDocument) {
            return '';
        }
        return frame.contentDocument.documentElement.outerHTML;
    })()
"#;

/// Fetches the report rows for one NIT, isolating every failure: any error is
/// logged (truncated) and yields an empty row list so the run can move on to
/// the next identifier. No retries.
pub async fn fetch_report(session: &PortalSession, nit: &str, config: &ScraperConfig) -> Vec<RawRow> {
    match try_fetch_report(session, nit, config).await {
        Ok(rows) => rows,
        Err(e) => {
            let msg: String = e.to_string().chars().take(50).collect();
            warn!("NIT {}: fetch failed: {}", nit, msg);
            Vec::new()
        }
    }
}

/// Fallible fetch. The frame scope is released on every exit path, success or
/// failure, so the session is back on the top-level document when this
/// returns.
pub async fn try_fetch_report(
    session: &PortalSession,
    nit: &str,
    config: &ScraperConfig,
) -> Result<Vec<RawRow>, ScraperError> {
    let page = session.page()?;

    let result = drive_report(page, nit, config).await;

    let _ = page.evaluate(RELEASE_FRAME_SCRIPT).await;

    result
}

async fn drive_report(
    page: &Page,
    nit: &str,
    config: &ScraperConfig,
) -> Result<Vec<RawRow>, ScraperError> {
    // Full page reload per identifier; nothing carries over but the session.
    page.goto(&config.portal_url)
        .await
        .map_err(|e| ScraperError::Navigation(e.to_string()))?;
    page.wait_for_navigation()
        .await
        .map_err(|e| ScraperError::Navigation(e.to_string()))?;

    locate_report_frame(page, config.locate_timeout).await?;

    let injected = inject_form(
        page,
        &config.date_from_field(),
        &config.date_to_field(),
        nit,
    )
    .await?;
    if !injected {
        return Err(ScraperError::ElementNotFound("report form inputs".into()));
    }

    if config.debug {
        capture_debug_screenshot(page, nit).await;
    }

    wait_for_render(page, config.render_wait).await;

    let html = frame_html(page).await?;
    extract_rows(&html)
}

/// Bounded poll for the embedded report widget.
async fn locate_report_frame(page: &Page, timeout: Duration) -> Result<(), ScraperError> {
    let start = Instant::now();

    while start.elapsed() < timeout {
        let found = page
            .evaluate(ACQUIRE_FRAME_SCRIPT)
            .await
            .map(|v| v.into_value().unwrap_or(false))
            .unwrap_or(false);

        if found {
            debug!("Report frame located after {:?}", start.elapsed());
            return Ok(());
        }

        sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }

    Err(ScraperError::LocateTimeout(timeout.as_secs()))
}

/// Sets the three report fields (period start, period end, NIT) and clicks
/// "Ver informe" inside the frame document. Returns whether the form was
/// actually found.
async fn inject_form(
    page: &Page,
    date_from: &str,
    date_to: &str,
    nit: &str,
) -> Result<bool, ScraperError> {
    let script = format!(
        r#"
        (() => {{
            const doc = window.__lupaFrame && window.__lupaFrame.contentDocument;
            if (!doc) {{
                return false;
            }}
            const inputs = doc.querySelectorAll('input[type="text"]');
            const button = doc.querySelectorAll('input[value="Ver informe"]')[0];
            if (inputs.length < 3 || !button) {{
                return false;
            }}
            inputs[0].value = '{}';
            inputs[1].value = '{}';
            inputs[2].value = '{}';
            button.click();
            return true;
        }})()
    "#,
        date_from, date_to, nit
    );

    let result = page
        .evaluate(script.as_str())
        .await
        .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

    Ok(result.into_value::<bool>().unwrap_or(false))
}

/// The widget exposes no completion signal. Treat "frame content changed from
/// the just-submitted page, then held still across consecutive samples" as
/// rendered, capped at `cap`; on cap, proceed with whatever is there.
async fn wait_for_render(page: &Page, cap: Duration) {
    info!("Waiting for report render (cap {:?})...", cap);

    let baseline = frame_content_len(page).await;
    let start = Instant::now();
    let mut last_len: Option<usize> = None;
    let mut stable_count = 0;

    while start.elapsed() < cap {
        sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        let current = frame_content_len(page).await;

        if current == 0 || current == baseline {
            stable_count = 0;
            last_len = Some(current);
            continue;
        }

        if last_len == Some(current) {
            stable_count += 1;
            if stable_count >= REQUIRED_STABLE_CHECKS {
                info!("Report content stable after {:?}", start.elapsed());
                return;
            }
        } else {
            stable_count = 0;
        }

        last_len = Some(current);
    }

    warn!(
        "Render wait cap reached after {:?}, proceeding with current content",
        start.elapsed()
    );
}

async fn frame_content_len(page: &Page) -> usize {
    page.evaluate(FRAME_LENGTH_SCRIPT)
        .await
        .map(|v| v.into_value().unwrap_or(0))
        .unwrap_or(0)
}

async fn frame_html(page: &Page) -> Result<String, ScraperError> {
    let result = page
        .evaluate(FRAME_HTML_SCRIPT)
        .await
        .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

    let html = result.into_value::<String>().unwrap_or_default();
    if html.is_empty() {
        return Err(ScraperError::Extraction("report frame produced no markup".into()));
    }

    Ok(html)
}

async fn capture_debug_screenshot(page: &Page, nit: &str) {
    if let Ok(screenshot) = page
        .screenshot(ScreenshotParams::builder().full_page(true).build())
        .await
    {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
        debug!(
            "Post-inject screenshot for NIT {}: data:image/png;base64,{}",
            nit, encoded
        );
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector)
        .map_err(|e| ScraperError::Extraction(format!("invalid CSS selector '{}': {}", selector, e)))
}

/// Pulls every table row with more than [`MIN_ROW_CELLS`] cells out of the
/// frame markup as trimmed text. Header and decorative rows fall below the
/// threshold and drop out here.
pub(crate) fn extract_rows(html: &str) -> Result<Vec<RawRow>, ScraperError> {
    let document = Html::parse_document(html);
    let row_sel = parse_selector("tr")?;
    let cell_sel = parse_selector("td")?;

    let mut rows = Vec::new();
    for row in document.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|el| el.text().collect::<Vec<_>>().join("").trim().to_string())
            .collect();

        if cells.len() > MIN_ROW_CELLS {
            rows.push(cells);
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A session that was never initialized fails inside the fetch; the
    // isolating wrapper must swallow that into an empty row list.
    #[tokio::test]
    async fn test_fetch_isolation_on_dead_session() {
        let session = PortalSession::new(true);
        let config = ScraperConfig::default();

        assert!(try_fetch_report(&session, "802010614", &config).await.is_err());
        assert!(fetch_report(&session, "802010614", &config).await.is_empty());
    }

    #[test]
    fn test_extract_rows_keeps_wide_rows_only() {
        let html = r#"
            <html><body><table>
                <tr><th>h1</th><th>h2</th></tr>
                <tr><td>a</td><td>b</td><td>c</td></tr>
                <tr>
                    <td>x</td><td>NIT-1-Clinica</td><td>15/01/2025</td>
                    <td>$100</td><td>Anticipo</td><td>ADRES</td>
                </tr>
            </table></body></html>
        "#;
        let rows = extract_rows(html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 6);
        assert_eq!(rows[0][1], "NIT-1-Clinica");
    }

    #[test]
    fn test_extract_rows_flattens_nested_markup() {
        let html = r#"
            <table><tr>
                <td> <span>NIT-2-</span><b>Hospital</b> </td>
                <td>d</td><td>v</td><td>c</td><td>e</td><td>f</td>
            </tr></table>
        "#;
        let rows = extract_rows(html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "NIT-2-Hospital");
    }

    #[test]
    fn test_extract_rows_empty_document() {
        assert!(extract_rows("<html><body></body></html>").unwrap().is_empty());
    }
}
