use anyhow::Context;
use clap::Parser;
use issues_relay::{Args, EventHubConnector};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout only carries the summary line.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let report = issues_relay::run(args, &EventHubConnector)
        .await
        .context("failed to relay issues")?;

    println!("{report}");
    Ok(())
}
