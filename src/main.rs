use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fingy::cli::Cli;
use fingy::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // chromiumoxide logs unknown CDP events at error level; keep it quiet
    let default_level = if cli.verbose { "info,fingy=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(default_level)
            .add_directive("chromiumoxide=warn".parse().unwrap())
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli.run().await
}
