use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Output side of one event stream.
///
/// Implementations must support explicit flushing: a frame is only considered sent to
/// the client once `flush` has returned.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn write(&mut self, frame: Bytes) -> Result<()>;

    async fn flush(&mut self) -> Result<()>;

    /// Resolves once the client side of the stream has gone away.
    async fn closed(&self);
}

/// An `EventSink` feeding a streaming response body through a single-slot channel.
///
/// The receiving half becomes the body; the HTTP layer drops it when the client
/// disconnects, which makes every subsequent write fail and resolves `closed`.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(1);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn write(&mut self, frame: Bytes) -> Result<()> {
        self.sender
            .send(frame)
            .await
            .map_err(|_| Error::sink_closed())
    }

    /// Waits until the body has pulled the last written frame.
    async fn flush(&mut self) -> Result<()> {
        // Reserving the only slot succeeds once the previous frame has been taken; the
        // permit is dropped straight away to give the slot back.
        self.sender
            .reserve()
            .await
            .map(drop)
            .map_err(|_| Error::sink_closed())
    }

    async fn closed(&self) {
        self.sender.closed().await
    }
}
