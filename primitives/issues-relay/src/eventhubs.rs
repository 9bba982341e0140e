//! Azure Event Hubs sink over the service's HTTPS REST interface.
//!
//! Each event is one `POST {endpoint}/{entity}/messages` request, authorized
//! with a Shared Access Signature derived from the connection string.
//!
//! # Connection strings
//!
//! ```text
//! Endpoint=sb://<namespace>.servicebus.windows.net/;SharedAccessKeyName=<name>;SharedAccessKey=<key>;EntityPath=<hub>
//! ```
//!
//! A `SharedAccessSignature=<token>` segment may replace the key name and key.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::{Client, header};
use sha2::Sha256;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::http_client;
use crate::sink::{Connector, EventSink};

/// Lifetime of the signatures generated for each request.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

const CONTENT_TYPE: &str = "application/atom+xml;type=entry;charset=utf-8";

/// How requests to the hub are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Named shared access key, used to sign a fresh token per request.
    Key { name: String, key: String },
    /// Pre-issued shared access signature, sent verbatim.
    Signature(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key { name, .. } => f
                .debug_struct("Key")
                .field("name", name)
                .field("key", &"<redacted>")
                .finish(),
            Self::Signature(_) => f.debug_tuple("Signature").field(&"<redacted>").finish(),
        }
    }
}

/// Parsed Event Hubs connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    endpoint: String,
    entity_path: String,
    credential: Credential,
}

impl ConnectionString {
    /// Parses `Key=Value;Key=Value` segments. Keys are case-insensitive.
    pub fn parse(input: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        let mut signature = None;
        let mut entity_path = None;

        for segment in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((name, value)) = segment.split_once('=') else {
                return Err(Error::InvalidConnectionString(format!(
                    "segment '{segment}' is not a key=value pair"
                )));
            };
            let value = value.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value),
                "sharedaccesskeyname" => key_name = Some(value),
                "sharedaccesskey" => key = Some(value),
                "sharedaccesssignature" => signature = Some(value),
                "entitypath" => entity_path = Some(value),
                _ => {}
            }
        }

        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| missing("Endpoint"))
            .and_then(|e| normalize_endpoint(&e))?;
        let entity_path = entity_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("EntityPath"))?;

        let credential = match (signature, key_name, key) {
            (Some(sas), _, _) if !sas.is_empty() => Credential::Signature(sas),
            (_, Some(name), Some(key)) if !name.is_empty() && !key.is_empty() => {
                Credential::Key { name, key }
            }
            (_, None, _) => return Err(missing("SharedAccessKeyName")),
            _ => return Err(missing("SharedAccessKey")),
        };

        Ok(Self {
            endpoint,
            entity_path,
            credential,
        })
    }

    /// Base URL of the namespace, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn entity_path(&self) -> &str {
        &self.entity_path
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// The resource a signature is scoped to.
    pub fn resource_uri(&self) -> String {
        format!("{}/{}", self.endpoint, self.entity_path)
    }

    /// Where events are posted.
    pub fn messages_url(&self) -> String {
        format!("{}/messages", self.resource_uri())
    }

    /// Authorization header value valid until `expiry` (Unix seconds).
    pub fn authorization(&self, expiry: u64) -> Result<String> {
        match &self.credential {
            Credential::Signature(sas) => Ok(sas.clone()),
            Credential::Key { name, key } => sas_token(&self.resource_uri(), name, key, expiry),
        }
    }
}

impl FromStr for ConnectionString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn missing(key: &str) -> Error {
    Error::InvalidConnectionString(format!("missing {key}"))
}

/// `sb://` endpoints are reached over HTTPS; explicit http(s) is kept as is.
fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let (scheme, rest) = endpoint.split_once("://").unwrap_or(("sb", endpoint));
    let host = rest.trim_end_matches('/');
    if host.is_empty() {
        return Err(missing("Endpoint host"));
    }
    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "sb" | "amqps" | "https" => "https",
        "http" => "http",
        other => {
            return Err(Error::InvalidConnectionString(format!(
                "unsupported endpoint scheme '{other}'"
            )));
        }
    };
    Ok(format!("{scheme}://{host}"))
}

/// Builds a Shared Access Signature for `resource_uri`.
///
/// The signed string is the URL-encoded resource and the expiry separated
/// by a newline; the signature is HMAC-SHA256 keyed with the raw key text.
pub fn sas_token(resource_uri: &str, key_name: &str, key: &str, expiry: u64) -> Result<String> {
    let encoded_uri = urlencoding::encode(resource_uri);
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes())
        .map_err(|e| Error::InvalidConnectionString(format!("unusable shared access key: {e}")))?;
    mac.update(format!("{encoded_uri}\n{expiry}").as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!(
        "SharedAccessSignature sr={encoded_uri}&sig={}&se={expiry}&skn={}",
        urlencoding::encode(&signature),
        urlencoding::encode(key_name),
    ))
}

fn expiry_from_now(ttl: Duration) -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        + ttl.as_secs()
}

/// Session against one event hub.
#[derive(Debug)]
pub struct EventHubClient {
    client: Client,
    connection: ConnectionString,
    messages_url: String,
    closed: bool,
}

impl EventHubClient {
    pub fn new(client: Client, connection: ConnectionString) -> Self {
        let messages_url = connection.messages_url();
        Self {
            client,
            connection,
            messages_url,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl EventSink for EventHubClient {
    async fn send(&mut self, event: Vec<u8>) -> Result<()> {
        if self.closed {
            return Err(Error::SessionClosed);
        }

        let authorization = self.connection.authorization(expiry_from_now(TOKEN_TTL))?;
        let response = self
            .client
            .post(&self.messages_url)
            .header(header::AUTHORIZATION, authorization)
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .body(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Send { status, body });
        }

        debug!(%status, hub = %self.connection.entity_path(), "event accepted");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        debug!(hub = %self.connection.entity_path(), "event hub session closed");
        Ok(())
    }
}

/// Opens [`EventHubClient`] sessions from the configured connection string.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventHubConnector;

#[async_trait]
impl Connector for EventHubConnector {
    type Sink = EventHubClient;

    async fn connect(&self, config: &Config) -> Result<Self::Sink> {
        let client =
            http_client(config.request_timeout).map_err(|e| Error::Connect(e.to_string()))?;
        Ok(EventHubClient::new(client, config.connection.clone()))
    }
}
