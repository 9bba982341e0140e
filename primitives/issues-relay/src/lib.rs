//! Issues Relay - GitHub Issues to Azure Event Hubs
//!
//! Reads the issue list of a GitHub repository and sends a few fields of
//! every issue to an Event Hub, one event per issue.
//!
//! The run is strictly sequential: fetch, decode, connect, send each issue,
//! close. Fetch, decode and connect failures end the run with an error;
//! an issue that fails to serialize or send is logged and skipped.
//!
//! # Usage
//!
//! ```bash
//! issues-relay --connection "Endpoint=sb://ns.servicebus.windows.net/;SharedAccessKeyName=send;SharedAccessKey=...;EntityPath=issues"
//!
//! # Read from another repository and bound every request
//! issues-relay -c "$CONN" --source-url https://api.github.com/repos/rust-lang/rust/issues --request-timeout 30
//! ```

pub mod config;
pub mod error;
pub mod eventhubs;
pub mod fetch;
pub mod issue;
pub mod publish;
pub mod sink;

pub use config::{Args, Config};
pub use error::{Error, Result};
pub use eventhubs::{ConnectionString, EventHubClient, EventHubConnector};
pub use fetch::Fetcher;
pub use issue::Issue;
pub use publish::{PublishReport, Publisher, decode_batch};
pub use sink::{Connector, EventSink};

use tracing::info;

/// Validates `args` and relays the current issue batch.
///
/// Nothing touches the network until the configuration is valid, and no
/// session is opened until the batch has been fetched and decoded.
pub async fn run<C: Connector>(args: Args, connector: &C) -> Result<PublishReport> {
    let config = Config::try_from(args)?;

    let fetcher = Fetcher::new(fetch::http_client(config.request_timeout)?, &config.source_url);
    let payload = fetcher.fetch().await?;
    let issues = decode_batch(&payload)?;
    info!(count = issues.len(), "decoded issues");

    let sink = connector.connect(&config).await?;
    info!(hub = %config.connection.entity_path(), "connected to event hub");

    Ok(Publisher::new(sink, config.close_timeout)
        .publish(&issues)
        .await)
}
