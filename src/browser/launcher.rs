use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tokio::time::sleep;

use super::discovery::{discover_browser, BrowserInfo, BrowserType};
use super::session::fetch_browser_ws_url;
use crate::config::BrowserConfig;
use crate::error::{FingyError, Result};

/// Starts a browser with remote debugging enabled
pub struct BrowserLauncher {
    browser_info: BrowserInfo,
    cdp_port: u16,
    headless: bool,
    user_data_dir: PathBuf,
    extra_args: Vec<String>,
}

impl BrowserLauncher {
    /// Build a launcher from config, discovering a browser when no executable is set
    pub fn from_config(config: &BrowserConfig) -> Result<Self> {
        let browser_info = match config.executable {
            Some(ref exe) => {
                let path = PathBuf::from(shellexpand::tilde(exe).as_ref());
                if !path.exists() {
                    return Err(FingyError::BrowserLaunchFailed(format!(
                        "Browser not found at: {}",
                        path.display()
                    )));
                }
                BrowserInfo::new(BrowserType::Chrome, path)
            }
            None => discover_browser()?,
        };

        let user_data_dir = match config.user_data_dir {
            Some(ref dir) => PathBuf::from(shellexpand::tilde(dir).as_ref()),
            None => default_user_data_dir(),
        };

        Ok(Self {
            browser_info,
            cdp_port: config.cdp_port,
            headless: config.headless,
            user_data_dir,
            extra_args: config.extra_args.clone(),
        })
    }

    /// Build the browser launch arguments
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.cdp_port),
            format!("--user-data-dir={}", self.user_data_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Launch the browser and return the process handle
    pub fn launch(&self) -> Result<Child> {
        std::fs::create_dir_all(&self.user_data_dir)?;

        let args = self.build_args();
        tracing::debug!(
            "Launching browser: {:?} with args: {:?}",
            self.browser_info.path,
            args
        );

        Command::new(&self.browser_info.path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                FingyError::BrowserLaunchFailed(format!(
                    "Failed to launch {}: {}",
                    self.browser_info.browser_type.name(),
                    e
                ))
            })
    }

    /// Launch the browser and wait for its CDP endpoint
    pub async fn launch_and_wait(&self) -> Result<(Child, String)> {
        let mut child = self.launch()?;
        match self.wait_for_cdp().await {
            Ok(ws_url) => Ok((child, ws_url)),
            Err(e) => {
                let _ = child.kill();
                Err(e)
            }
        }
    }

    async fn wait_for_cdp(&self) -> Result<String> {
        // Up to 10 seconds
        for attempt in 1..=20 {
            sleep(Duration::from_millis(500)).await;

            match fetch_browser_ws_url("127.0.0.1", self.cdp_port).await {
                Some(ws_url) => {
                    tracing::info!("CDP ready at: {}", ws_url);
                    return Ok(ws_url);
                }
                None => tracing::debug!("CDP not ready yet (attempt {})", attempt),
            }
        }

        Err(FingyError::CdpConnectionFailed(
            "Timeout waiting for CDP to be ready".to_string(),
        ))
    }

    pub fn browser_info(&self) -> &BrowserInfo {
        &self.browser_info
    }
}

fn default_user_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fingy")
        .join("profile")
}
