use clap::{Parser, Subcommand};

use crate::commands;
use crate::config::Config;
use crate::error::Result;

/// fingy - browser device fingerprint collector and hasher
#[derive(Parser)]
#[command(name = "fingy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Browser executable path (overrides auto-discovery)
    #[arg(long, env = "FINGY_BROWSER_PATH", global = true)]
    pub browser_path: Option<String>,

    /// CDP endpoint to use: port or host:port
    #[arg(long, env = "FINGY_CDP", global = true)]
    pub cdp: Option<String>,

    /// Run a launched browser headless
    #[arg(long, env = "FINGY_HEADLESS", global = true)]
    pub headless: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect a device fingerprint from a browser
    Collect {
        /// Page to run the probes in (defaults to probe.page_url)
        #[arg(long)]
        url: Option<String>,

        /// Print the raw record without digests
        #[arg(long)]
        raw: bool,

        /// Also write every line into the page's slot elements
        #[arg(long)]
        dom: bool,

        /// Leave a launched browser running afterwards
        #[arg(long)]
        keep_open: bool,

        /// Extra font name to probe (repeatable)
        #[arg(long = "font", value_name = "NAME")]
        fonts: Vec<String>,

        /// Do not truncate long values
        #[arg(long)]
        full: bool,
    },

    /// Print SHA-256 digests of values
    Digest {
        /// Values to digest
        #[arg(required_unless_present = "device")]
        values: Vec<String>,

        /// Composite device digest of resolution, platform and canvas
        #[arg(long, num_args = 3, value_names = ["RESOLUTION", "PLATFORM", "CANVAS"], conflicts_with = "values")]
        device: Option<Vec<String>>,
    },

    /// List the font names the font probe tests for
    Fonts,

    /// Show detected browsers and CDP endpoint status
    Browsers,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. browser.cdp_port)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show configuration file path
    Path,

    /// Delete the configuration file
    Reset,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Collect {
                url,
                raw,
                dom,
                keep_open,
                fonts,
                full,
            } => {
                let options = commands::collect::CollectOptions {
                    url: url.clone(),
                    raw: *raw,
                    dom: *dom,
                    keep_open: *keep_open,
                    extra_fonts: fonts.clone(),
                    full: *full,
                };
                commands::collect::run(self, &options).await
            }
            Commands::Digest { values, device } => {
                commands::digest::run(self, values, device.as_deref()).await
            }
            Commands::Fonts => commands::fonts::run(self).await,
            Commands::Browsers => commands::browsers::run(self).await,
            Commands::Config { command } => commands::config::run(self, command).await,
        }
    }

    /// Load config and apply global flag overrides
    pub fn effective_config(&self) -> Result<Config> {
        let mut config = Config::load()?;

        if let Some(ref path) = self.browser_path {
            config.browser.executable = Some(path.clone());
        }
        if let Some(ref cdp) = self.cdp {
            let (host, port) = crate::browser::parse_cdp_endpoint(cdp)?;
            config.browser.cdp_host = host;
            config.browser.cdp_port = port;
        }
        if self.headless {
            config.browser.headless = true;
        }

        Ok(config)
    }
}
