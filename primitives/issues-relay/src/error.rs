//! Error type shared by the fetch, publish and transport stages.

use reqwest::StatusCode;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while relaying issues.
///
/// Fetch, decode and connect failures abort the run. Send failures only
/// affect a single event and are logged by the publisher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("connection string must be provided (usage: issues-relay --connection <connection string>)")]
    MissingConnection,

    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("couldn't read issues: response code {status}")]
    Status { status: StatusCode },

    #[error("failed to decode issues: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to get hub: {0}")]
    Connect(String),

    #[error("event hub rejected event with status {status}: {body}")]
    Send { status: StatusCode, body: String },

    #[error("event hub session is closed")]
    SessionClosed,
}
