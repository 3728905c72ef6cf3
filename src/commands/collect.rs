use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::browser::{BrowserSession, CdpHost, CdpPage, DomSink};
use crate::cli::Cli;
use crate::config::{BrowserConfig, Config};
use crate::error::{FingyError, Result};
use crate::fingerprint::digest::DIGEST_ORDER;
use crate::fingerprint::fonts::candidate_list;
use crate::fingerprint::sink::TerminalSink;
use crate::fingerprint::{collect_fingerprint, present, DigestSet, FingerprintRecord};

pub struct CollectOptions {
    pub url: Option<String>,
    pub raw: bool,
    pub dom: bool,
    pub keep_open: bool,
    pub extra_fonts: Vec<String>,
    pub full: bool,
}

impl CollectOptions {
    fn apply_to(&self, browser: &mut BrowserConfig) {
        // DOM slots only stay visible while the browser does
        if self.keep_open || self.dom {
            browser.keep_open = true;
        }
    }
}

pub async fn run(cli: &Cli, options: &CollectOptions) -> Result<()> {
    let mut config = cli.effective_config()?;
    options.apply_to(&mut config.browser);

    let url = options
        .url
        .clone()
        .unwrap_or_else(|| config.probe.page_url.clone());
    let mut extra = config.probe.extra_fonts.clone();
    extra.extend(options.extra_fonts.iter().cloned());
    let candidates = candidate_list(&extra);

    let spinner = create_spinner(cli.json, "Connecting to browser...");

    // An explicit endpoint means attach only
    let session = BrowserSession::start(&config.browser, cli.cdp.is_some()).await?;
    let page = match session.open_page(&url).await {
        Ok(page) => page,
        Err(e) => return Err(keep_first_error(e, session.shutdown().await)),
    };

    if let Some(ref pb) = spinner {
        pb.set_message(format!("Probing {}...", url));
    }

    let outcome = collect_in_page(cli, options, &config, &page, &candidates, spinner).await;

    if options.dom && outcome.is_ok() {
        // Leave the page open so the written slots stay visible
        tracing::info!("Fingerprint written into page {}", page.info().id);
        page.detach().await;
    } else if let Err(e) = session.close_page(page).await {
        tracing::debug!("Failed to close probe page: {}", e);
    }
    let shutdown = session.shutdown().await;

    match outcome {
        Ok(()) => shutdown,
        Err(e) => Err(keep_first_error(e, shutdown)),
    }
}

async fn collect_in_page(
    cli: &Cli,
    options: &CollectOptions,
    config: &Config,
    page: &CdpPage,
    candidates: &[String],
    spinner: Option<ProgressBar>,
) -> Result<()> {
    let host = CdpHost::new(page);
    let collected = collect_fingerprint(&host, candidates).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let record = collected?;

    if options.raw {
        return print_raw(&record);
    }

    let digests = DigestSet::compute(&record)?;

    if cli.json {
        let output = serde_json::json!({
            "fingerprint": record,
            "digests": digests,
            "order": DIGEST_ORDER,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "Device Fingerprint".bold());
        let max_width = if options.full {
            0
        } else {
            config.output.max_width
        };
        present(&record, &digests, &mut TerminalSink::new(max_width)).await?;
    }

    if options.dom {
        present(&record, &digests, &mut DomSink::new(page)).await?;
    }

    Ok(())
}

/// Return `primary`, logging a failure from the cleanup that followed it
fn keep_first_error(primary: FingyError, cleanup: Result<()>) -> FingyError {
    if let Err(e) = cleanup {
        tracing::warn!("Cleanup after failure also failed: {}", e);
    }
    primary
}

fn print_raw(record: &FingerprintRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    tracing::info!("Device Fingerprint: {}", serde_json::to_string(record)?);
    println!("{}", json);
    Ok(())
}

fn create_spinner(json: bool, message: &str) -> Option<ProgressBar> {
    if json {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}
