//! Reads the raw issues document from the source endpoint.

use std::time::Duration;

use reqwest::{Client, header};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// User agent sent with every request; GitHub refuses requests without one.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by the fetcher and the event hub sink.
pub fn http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Fetches the issues list with a single GET.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    url: String,
}

impl Fetcher {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Returns the complete response body.
    ///
    /// Transport errors and any non-success status are returned as errors;
    /// nothing is retried.
    pub async fn fetch(&self) -> Result<Vec<u8>> {
        info!(url = %self.url, "fetching issues");

        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "read issues response");
        Ok(body.to_vec())
    }
}
