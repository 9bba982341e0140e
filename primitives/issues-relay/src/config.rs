//! Command-line arguments and the validated configuration built from them.

use std::time::Duration;

use clap::Parser;

use crate::error::{Error, Result};
use crate::eventhubs::ConnectionString;

/// Issues list that gets relayed unless overridden.
pub const DEFAULT_SOURCE_URL: &str = "https://api.github.com/repos/elastic/beats/issues";

/// Republishes GitHub issues to an Azure Event Hub.
#[derive(Parser, Debug, Clone)]
#[command(name = "issues-relay")]
#[command(about = "Reads GitHub issues and sends each one to an Event Hub")]
pub struct Args {
    /// Event Hubs connection string (must include EntityPath).
    #[arg(short, long, env = "EVENTHUBS_CONNECTION_STRING", hide_env_values = true)]
    pub connection: String,

    /// Issues endpoint to read from.
    #[arg(long, env = "ISSUES_RELAY_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Timeout in seconds for each HTTP request (no timeout when unset).
    #[arg(long, env = "ISSUES_RELAY_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Seconds to wait for the event hub session to close.
    #[arg(long, env = "ISSUES_RELAY_CLOSE_TIMEOUT", default_value = "10")]
    pub close_timeout: u64,
}

/// Validated settings for one relay run.
#[derive(Debug, Clone)]
pub struct Config {
    pub connection: ConnectionString,
    pub source_url: String,
    pub request_timeout: Option<Duration>,
    pub close_timeout: Duration,
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        if args.connection.trim().is_empty() {
            return Err(Error::MissingConnection);
        }

        Ok(Self {
            connection: args.connection.parse()?,
            source_url: args.source_url,
            request_timeout: args.request_timeout.map(Duration::from_secs),
            close_timeout: Duration::from_secs(args.close_timeout),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CONNECTION: &str = "Endpoint=sb://relay.servicebus.windows.net/;SharedAccessKeyName=send;SharedAccessKey=c2VjcmV0;EntityPath=issues";

    #[test]
    fn defaults_apply() {
        let args = Args::try_parse_from(["issues-relay", "--connection", CONNECTION]).unwrap();
        let config = Config::try_from(args).unwrap();

        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.close_timeout, Duration::from_secs(10));
        assert_eq!(config.connection.entity_path(), "issues");
    }

    #[test]
    fn connection_flag_is_required() {
        // Guard against the variable leaking in from the test environment.
        if std::env::var_os("EVENTHUBS_CONNECTION_STRING").is_some() {
            return;
        }
        let err = Args::try_parse_from(["issues-relay"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn blank_connection_is_rejected() {
        let args = Args::try_parse_from(["issues-relay", "-c", "  "]).unwrap();
        assert!(matches!(Config::try_from(args), Err(Error::MissingConnection)));
    }

    #[test]
    fn timeouts_are_seconds() {
        let args = Args::try_parse_from([
            "issues-relay",
            "-c",
            CONNECTION,
            "--request-timeout",
            "30",
            "--close-timeout",
            "2",
        ])
        .unwrap();
        let config = Config::try_from(args).unwrap();

        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.close_timeout, Duration::from_secs(2));
    }
}
