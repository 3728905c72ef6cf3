use std::process::Child;
use std::time::Duration;

use chromiumoxide::browser::Browser;
use futures::StreamExt;
use serde::Deserialize;
use tokio::time::{sleep, timeout};

use super::launcher::BrowserLauncher;
use super::page::CdpPage;
use crate::config::BrowserConfig;
use crate::error::{FingyError, Result};

/// Target info from the CDP `/json/*` endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub web_socket_debugger_url: Option<String>,
}

/// Parse `--cdp` input: a bare port, `host:port`, or an `http(s)://host:port` URL
pub fn parse_cdp_endpoint(input: &str) -> Result<(String, u16)> {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    let invalid = || FingyError::ConfigError(format!("Invalid CDP endpoint: {}", input));

    match without_scheme.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            Ok((host.to_string(), port.parse().map_err(|_| invalid())?))
        }
        Some(_) => Err(invalid()),
        None => Ok((
            "127.0.0.1".to_string(),
            without_scheme.parse().map_err(|_| invalid())?,
        )),
    }
}

fn http_client(request_timeout: Duration) -> reqwest::Client {
    // NO_PROXY for the local debugging endpoint
    reqwest::Client::builder()
        .no_proxy()
        .timeout(request_timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Browser WebSocket URL from `/json/version`, or `None` if nothing answers
pub async fn fetch_browser_ws_url(host: &str, port: u16) -> Option<String> {
    let url = format!("http://{}:{}/json/version", host, port);
    let resp = http_client(Duration::from_secs(5)).get(&url).send().await.ok()?;
    let info: serde_json::Value = resp.json().await.ok()?;
    info.get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// A browser reachable over CDP, either launched by us or already running
pub struct BrowserSession {
    host: String,
    port: u16,
    browser_ws_url: String,
    child: Option<Child>,
    keep_open: bool,
}

impl BrowserSession {
    /// Attach to a browser on the configured endpoint, launching one if none answers.
    ///
    /// With `connect_only`, a missing browser is an error instead.
    pub async fn start(config: &BrowserConfig, connect_only: bool) -> Result<Self> {
        let host = config.cdp_host.clone();
        let port = config.cdp_port;

        if let Some(browser_ws_url) = fetch_browser_ws_url(&host, port).await {
            tracing::debug!("Attaching to running browser on {}:{}", host, port);
            return Ok(Self {
                host,
                port,
                browser_ws_url,
                child: None,
                keep_open: true,
            });
        }

        if connect_only {
            return Err(FingyError::BrowserNotRunning);
        }

        let launcher = BrowserLauncher::from_config(config)?;
        tracing::info!(
            "Launching {} on CDP port {}",
            launcher.browser_info().browser_type.name(),
            port
        );
        let (child, browser_ws_url) = launcher.launch_and_wait().await?;

        Ok(Self {
            host: "127.0.0.1".to_string(),
            port,
            browser_ws_url,
            child: Some(child),
            keep_open: config.keep_open,
        })
    }

    pub fn launched(&self) -> bool {
        self.child.is_some()
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open a new page target at `url` and attach to it
    pub async fn open_page(&self, url: &str) -> Result<CdpPage> {
        let endpoint = format!("http://{}:{}/json/new?{}", self.host, self.port, url);
        let response = http_client(Duration::from_secs(30))
            .put(&endpoint)
            .send()
            .await
            .map_err(|e| FingyError::CdpConnectionFailed(format!("Failed to open page: {}", e)))?;

        if !response.status().is_success() {
            return Err(FingyError::CdpConnectionFailed(format!(
                "Failed to open page: HTTP {}",
                response.status()
            )));
        }

        let info: PageInfo = response.json().await.map_err(|e| {
            FingyError::CdpConnectionFailed(format!("Failed to parse page info: {}", e))
        })?;
        tracing::debug!("Opened page {} at {}", info.id, info.url);

        let page = CdpPage::attach(info).await?;
        page.wait_for_load(Duration::from_secs(30)).await?;
        Ok(page)
    }

    /// Close a page target opened with [`open_page`](Self::open_page)
    pub async fn close_page(&self, page: CdpPage) -> Result<()> {
        let id = page.info().id.clone();
        page.detach().await;

        let url = format!("http://{}:{}/json/close/{}", self.host, self.port, id);
        http_client(Duration::from_secs(5))
            .get(&url)
            .send()
            .await
            .map_err(|e| FingyError::CdpConnectionFailed(format!("Failed to close page: {}", e)))?;
        Ok(())
    }

    /// Close the browser if we launched it and were not asked to keep it.
    pub async fn shutdown(mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if self.keep_open {
            tracing::info!("Leaving browser running on {}", self.endpoint());
            return Ok(());
        }

        match Browser::connect(&self.browser_ws_url).await {
            Ok((mut browser, mut handler)) => {
                let events = tokio::spawn(async move { while handler.next().await.is_some() {} });
                if let Err(e) = browser.close().await {
                    tracing::debug!("Browser.close failed: {}", e);
                }
                events.abort();
            }
            Err(e) => tracing::debug!("Could not reconnect to close browser: {}", e),
        }

        let exited = timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(Some(_)) = child.try_wait() {
                    break;
                }
                sleep(Duration::from_millis(100)).await;
            }
        })
        .await
        .is_ok();

        if !exited {
            tracing::debug!("Browser did not exit after close, killing it");
            child.kill()?;
            let _ = child.wait();
        }
        Ok(())
    }
}
