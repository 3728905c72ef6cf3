use colored::Colorize;

use crate::browser::{discover_all_browsers, fetch_browser_ws_url};
use crate::cli::Cli;
use crate::error::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let config = cli.effective_config()?;
    let browsers = discover_all_browsers();
    let host = &config.browser.cdp_host;
    let port = config.browser.cdp_port;
    let ws_url = fetch_browser_ws_url(host, port).await;

    if cli.json {
        let found: Vec<serde_json::Value> = browsers
            .iter()
            .map(|b| {
                serde_json::json!({
                    "name": b.browser_type.name(),
                    "path": b.path.display().to_string(),
                    "version": b.version,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "browsers": found,
                "cdp": {
                    "host": host,
                    "port": port,
                    "running": ws_url.is_some(),
                    "webSocketDebuggerUrl": ws_url,
                },
            }))?
        );
        return Ok(());
    }

    println!("{}", "Detected Browsers:".bold());
    if browsers.is_empty() {
        println!("  {} No browsers found", "!".yellow());
    } else {
        for browser in browsers {
            println!(
                "  {} {} {}",
                "✓".green(),
                browser.browser_type.name(),
                browser
                    .version
                    .map(|v| format!("(v{})", v))
                    .unwrap_or_default()
                    .dimmed()
            );
            println!("    {}", browser.path.display().to_string().dimmed());
        }
    }
    println!();

    println!("{}", "CDP Endpoint:".bold());
    match ws_url {
        Some(url) => {
            println!("  {} Running on {}:{}", "✓".green(), host, port);
            println!("  {} {}", "✓".green(), url.dimmed());
        }
        None => println!("  {} Nothing listening on {}:{}", "○".dimmed(), host, port),
    }

    Ok(())
}
