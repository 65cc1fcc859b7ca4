use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

// --- PageRenderer trait ---

/// Fetches the fully rendered DOM of a URL. Implementations must not reuse
/// browser resources across calls: each call acquires and fully releases its
/// own instance so a long-running process cannot accumulate zombies.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String>;
    fn name(&self) -> &str;
}

// --- Headless Chromium renderer ---

/// Whole-operation budget for one Chromium run. Callers layer their own
/// coarser watchdogs on top.
const CHROME_TIMEOUT: Duration = Duration::from_secs(30);

/// Virtual time granted to client-side JS before the DOM is dumped. The feed
/// is rendered by Alpine.js and is empty until scripts have run.
const CHROME_VIRTUAL_TIME_MS: u32 = 10_000;

/// Renderer that launches a fresh `chromium --dump-dom` process per call
/// with an ephemeral profile directory.
pub struct ChromeRenderer {
    chrome_bin: String,
}

impl ChromeRenderer {
    pub fn new(chrome_bin: &str) -> Self {
        info!(chrome_bin, "Using ChromeRenderer (ephemeral --dump-dom per call)");
        Self {
            chrome_bin: chrome_bin.to_string(),
        }
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).context("Invalid URL")?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("Only http/https URLs are allowed, got: {}", parsed.scheme());
        }

        info!(url, renderer = "chrome", "Rendering URL");

        // Temp profile dir is dropped (and deleted) on every exit path.
        let tmp_dir = tempfile::tempdir().context("Failed to create temp profile dir")?;

        let result = tokio::time::timeout(
            CHROME_TIMEOUT,
            tokio::process::Command::new(&self.chrome_bin)
                .args([
                    "--headless",
                    "--no-sandbox",
                    "--disable-gpu",
                    "--disable-dev-shm-usage",
                    &format!("--user-data-dir={}", tmp_dir.path().display()),
                    &format!("--virtual-time-budget={CHROME_VIRTUAL_TIME_MS}"),
                    "--dump-dom",
                    url,
                ])
                .output(),
        )
        .await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => anyhow::bail!("Failed to run Chromium for {url}: {e}"),
            Err(_) => anyhow::bail!(
                "Chromium timed out after {}s for {url}",
                CHROME_TIMEOUT.as_secs()
            ),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Chromium exited with error for {url}: {stderr}");
        }

        let html = String::from_utf8_lossy(&output.stdout).into_owned();
        if html.trim().is_empty() {
            warn!(url, renderer = "chrome", "Empty DOM output");
            return Ok(String::new());
        }

        info!(url, renderer = "chrome", bytes = html.len(), "Rendered successfully");
        Ok(html)
    }

    fn name(&self) -> &str {
        "chrome"
    }
}

// --- Browserless renderer ---

pub struct BrowserlessRenderer {
    client: browserless_client::BrowserlessClient,
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        info!(base_url, "Using BrowserlessRenderer");
        Self {
            client: browserless_client::BrowserlessClient::with_timeout(
                base_url,
                token,
                CHROME_TIMEOUT,
            ),
        }
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        info!(url, renderer = "browserless", "Rendering URL");

        let html = self
            .client
            .content(url)
            .await
            .context("Browserless content request failed")?;

        if html.trim().is_empty() {
            warn!(url, renderer = "browserless", "Empty HTML response");
            return Ok(String::new());
        }

        info!(
            url,
            renderer = "browserless",
            bytes = html.len(),
            "Rendered successfully"
        );
        Ok(html)
    }

    fn name(&self) -> &str {
        "browserless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chrome_renderer_rejects_non_http_schemes() {
        let renderer = ChromeRenderer::new("chromium");
        let err = renderer.render("ftp://example.com/feed").await.unwrap_err();
        assert!(err.to_string().contains("http/https"));
    }

    #[tokio::test]
    async fn chrome_renderer_rejects_unparseable_urls() {
        let renderer = ChromeRenderer::new("chromium");
        assert!(renderer.render("not a url").await.is_err());
    }
}
