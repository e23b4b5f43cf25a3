use crate::frame;
use crate::sink::EventSink;
use crate::subscription::Subscription;
use log::*;

/// Why an event stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The bus side of the subscriber endpoint went away.
    EndpointClosed,
    /// The client disconnected while the stream was waiting for an event.
    SinkClosed,
    /// Writing or flushing a frame failed.
    WriteFailed,
}

/// Drains `subscription` into `sink`, one flushed frame per published payload.
///
/// Runs until the client goes away or the endpoint closes, then releases the
/// subscription. Release happens on every exit path.
pub async fn pump<S>(mut subscription: Subscription, sink: &mut S) -> StreamEnd
where
    S: EventSink + ?Sized,
{
    let end = loop {
        let next = tokio::select! {
            payload = subscription.recv() => payload.ok_or(StreamEnd::EndpointClosed),
            _ = sink.closed() => Err(StreamEnd::SinkClosed),
        };
        let payload = match next {
            Ok(payload) => payload,
            Err(end) => break end,
        };

        if let Err(e) = sink.write(frame::encode(&payload)).await {
            debug!(
                "Write to subscriber {} on channel {} failed: {e}",
                subscription.id().as_str(),
                subscription.channel()
            );
            break StreamEnd::WriteFailed;
        }
        if let Err(e) = sink.flush().await {
            debug!(
                "Flush to subscriber {} on channel {} failed: {e}",
                subscription.id().as_str(),
                subscription.channel()
            );
            break StreamEnd::WriteFailed;
        }
    };

    debug!(
        "Event stream for subscriber {} on channel {} ended: {:?}",
        subscription.id().as_str(),
        subscription.channel(),
        end
    );
    subscription.release().await;

    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::Bus;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_millis(100);

    /// Records written bytes and flush calls; can be told to disconnect.
    #[derive(Clone, Default)]
    struct RecordingSink {
        written: Arc<Mutex<Vec<u8>>>,
        flushes: Arc<Mutex<usize>>,
        disconnect: Arc<Notify>,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn write(&mut self, frame: Bytes) -> Result<()> {
            self.written.lock().unwrap().extend_from_slice(&frame);
            Ok(())
        }

        async fn flush(&mut self) -> Result<()> {
            *self.flushes.lock().unwrap() += 1;
            Ok(())
        }

        async fn closed(&self) {
            self.disconnect.notified().await
        }
    }

    /// Accepts nothing: every write fails.
    struct BrokenSink;

    #[async_trait]
    impl EventSink for BrokenSink {
        async fn write(&mut self, _frame: Bytes) -> Result<()> {
            Err(Error::sink_io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset by peer",
            )))
        }

        async fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        async fn closed(&self) {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn frames_every_payload_and_flushes_each_one() {
        let bus = Bus::new();
        let sink = RecordingSink::default();
        let subscription = bus.subscribe("/room1").await;

        let mut pumped = sink.clone();
        let stream = tokio::spawn(async move { pump(subscription, &mut pumped).await });

        assert_eq!(bus.publish("/room1", Bytes::from_static(b"hello")).await, 1);
        assert_eq!(bus.publish("/room2", Bytes::from_static(b"hi")).await, 0);
        assert_eq!(bus.publish("/room1", Bytes::from_static(b"again")).await, 1);

        sink.disconnect.notify_one();
        assert_eq!(timeout(WAIT, stream).await.unwrap().unwrap(), StreamEnd::SinkClosed);

        assert_eq!(
            sink.written.lock().unwrap().as_slice(),
            b"data: hello\n\ndata: again\n\n"
        );
        assert_eq!(*sink.flushes.lock().unwrap(), 2);
        assert_eq!(bus.channel_count().await, 0);
    }

    #[tokio::test]
    async fn write_failure_ends_the_stream_and_releases() {
        let bus = Bus::new();
        let subscription = bus.subscribe("/broken").await;

        let stream = tokio::spawn(async move { pump(subscription, &mut BrokenSink).await });

        assert_eq!(bus.publish("/broken", Bytes::from_static(b"x")).await, 1);
        assert_eq!(timeout(WAIT, stream).await.unwrap().unwrap(), StreamEnd::WriteFailed);
        assert_eq!(bus.channel_count().await, 0);

        let delivered = timeout(WAIT, bus.publish("/broken", Bytes::from_static(b"y")))
            .await
            .expect("publish must not block on a released subscriber");
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn disconnect_while_idle_releases_without_an_event() {
        let bus = Bus::new();
        let sink = RecordingSink::default();
        let subscription = bus.subscribe("/idle").await;

        let mut pumped = sink.clone();
        let stream = tokio::spawn(async move { pump(subscription, &mut pumped).await });

        tokio::task::yield_now().await;
        sink.disconnect.notify_one();

        assert_eq!(timeout(WAIT, stream).await.unwrap().unwrap(), StreamEnd::SinkClosed);
        assert!(sink.written.lock().unwrap().is_empty());
        assert_eq!(bus.subscriber_count("/idle").await, 0);
    }
}
