use colored::Colorize;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::fingerprint::fonts::{candidate_list, BASELINE_FAMILIES, CANDIDATE_FONTS};

pub async fn run(cli: &Cli) -> Result<()> {
    let config = Config::load()?;
    let candidates = candidate_list(&config.probe.extra_fonts);

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "baselines": BASELINE_FAMILIES,
                "candidates": candidates,
            }))?
        );
        return Ok(());
    }

    println!(
        "{} {}",
        "Baselines:".bold(),
        BASELINE_FAMILIES.join(", ").dimmed()
    );
    for (i, name) in candidates.iter().enumerate() {
        if i < CANDIDATE_FONTS.len() {
            println!("  {}", name);
        } else {
            println!("  {} {}", name, "(config)".dimmed());
        }
    }
    Ok(())
}
