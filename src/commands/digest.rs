use colored::Colorize;

use crate::cli::Cli;
use crate::error::{FingyError, Result};
use crate::fingerprint::digest::device_digest;
use crate::fingerprint::sha256_hex;

pub async fn run(cli: &Cli, values: &[String], device: Option<&[String]>) -> Result<()> {
    match device {
        Some([resolution, platform, canvas]) => {
            let digest = device_digest(resolution, platform, canvas);
            if cli.json {
                println!("{}", serde_json::json!({ "device": digest }));
            } else {
                println!("{}", digest);
            }
            Ok(())
        }
        Some(other) => Err(FingyError::Other(format!(
            "--device takes 3 values, got {}",
            other.len()
        ))),
        None => {
            let digests: Vec<(&str, String)> = values
                .iter()
                .map(|value| (value.as_str(), sha256_hex(value)))
                .collect();

            if cli.json {
                let output: Vec<serde_json::Value> = digests
                    .iter()
                    .map(|(value, digest)| serde_json::json!({ "value": value, "sha256": digest }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if digests.len() == 1 {
                println!("{}", digests[0].1);
            } else {
                for (value, digest) in digests {
                    println!("{}  {}", digest, value.dimmed());
                }
            }
            Ok(())
        }
    }
}
