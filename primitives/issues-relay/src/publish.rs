//! Decodes the fetched batch and sends each issue as its own event.

use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::issue::Issue;
use crate::sink::EventSink;

/// Decodes a JSON array of issues. Either the whole payload decodes or
/// nothing does.
pub fn decode_batch(payload: &[u8]) -> Result<Vec<Issue>> {
    serde_json::from_slice(payload).map_err(Error::Decode)
}

/// Outcome of one publish run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub sent: usize,
    pub total: usize,
}

impl fmt::Display for PublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} messages sent", self.sent, self.total)
    }
}

/// Owns a sink for the duration of one batch and closes it afterwards.
pub struct Publisher<S> {
    sink: S,
    close_timeout: Duration,
}

impl<S: EventSink> Publisher<S> {
    pub fn new(sink: S, close_timeout: Duration) -> Self {
        Self {
            sink,
            close_timeout,
        }
    }

    /// Sends every issue in order, skipping the ones that fail, then
    /// closes the session.
    pub async fn publish(mut self, issues: &[Issue]) -> PublishReport {
        let mut sent = 0;

        for issue in issues {
            let event = match serde_json::to_vec(issue) {
                Ok(event) => event,
                // Unreachable for plain string and integer fields.
                Err(e) => {
                    warn!(issue = issue.id, error = %e, "failed to serialize issue");
                    continue;
                }
            };

            if let Err(e) = self.sink.send(event).await {
                warn!(issue = issue.id, error = %e, "failed to send issue");
                continue;
            }
            sent += 1;
        }

        self.close().await;

        let report = PublishReport {
            sent,
            total: issues.len(),
        };
        info!(sent = report.sent, total = report.total, "publish finished");
        report
    }

    async fn close(&mut self) {
        match tokio::time::timeout(self.close_timeout, self.sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "failed to close event hub session"),
            Err(_) => warn!(
                timeout_secs = self.close_timeout.as_secs(),
                "timed out closing event hub session"
            ),
        }
    }
}
