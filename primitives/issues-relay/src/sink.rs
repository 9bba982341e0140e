//! Seams between the publisher and the destination it writes to.

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;

/// An open session against an event destination.
#[async_trait]
pub trait EventSink: Send {
    /// Sends one event. A failure only concerns this event.
    async fn send(&mut self, event: Vec<u8>) -> Result<()>;

    /// Releases the session.
    async fn close(&mut self) -> Result<()>;
}

/// Opens destination sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    type Sink: EventSink;

    async fn connect(&self, config: &Config) -> Result<Self::Sink>;
}

#[cfg(test)]
#[async_trait]
impl<T: EventSink + ?Sized> EventSink for &mut T {
    async fn send(&mut self, event: Vec<u8>) -> Result<()> {
        (**self).send(event).await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }
}
