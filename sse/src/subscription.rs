use crate::bus::{Bus, Channel, SubscriberId};
use bytes::Bytes;
use log::*;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

/// One payload in flight from a publisher to a single subscriber.
///
/// The publisher keeps the other half of `accepted` and waits on it, which turns the
/// bounded channel into a rendezvous: a handoff only completes once the subscriber has
/// taken the payload off its endpoint.
#[derive(Debug)]
pub(crate) struct Delivery {
    payload: Bytes,
    accepted: oneshot::Sender<()>,
}

impl Delivery {
    fn accept(self) -> Bytes {
        // The publisher may have been cancelled while waiting; nothing to report then.
        let _ = self.accepted.send(());
        self.payload
    }
}

/// Hands `payload` to one subscriber endpoint and waits until it has been taken.
///
/// Returns false when the subscriber released its endpoint before accepting.
pub(crate) async fn hand_off(endpoint: &mpsc::Sender<Delivery>, payload: Bytes) -> bool {
    let (accepted, taken) = oneshot::channel();
    if endpoint.send(Delivery { payload, accepted }).await.is_err() {
        return false;
    }
    taken.await.is_ok()
}

/// A live registration on one channel of the [`Bus`].
///
/// Published payloads arrive through [`Subscription::recv`]. The subscription must be
/// given back with [`Subscription::release`]; a subscription that is dropped without
/// being released releases itself in the background.
///
/// Dropping outside a tokio runtime removes the entry only if the registry lock is free
/// at that moment. Otherwise the subscriber stays registered with a closed endpoint:
/// publishes skip it, but its channel entry is never pruned. Release explicitly, or drop
/// inside a runtime, to avoid that.
pub struct Subscription {
    bus: Bus,
    channel: Channel,
    subscriber_id: SubscriberId,
    endpoint: mpsc::Receiver<Delivery>,
    released: bool,
}

impl Subscription {
    pub(crate) fn new(
        bus: Bus,
        channel: Channel,
        subscriber_id: SubscriberId,
        endpoint: mpsc::Receiver<Delivery>,
    ) -> Self {
        Self {
            bus,
            channel,
            subscriber_id,
            endpoint,
            released: false,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn id(&self) -> &SubscriberId {
        &self.subscriber_id
    }

    /// Waits for the next published payload.
    ///
    /// Returns `None` once the bus side of the endpoint is gone, which only happens when
    /// the bus itself has been dropped. Cancel safe.
    pub async fn recv(&mut self) -> Option<Bytes> {
        let delivery = self.endpoint.recv().await?;
        Some(delivery.accept())
    }

    /// Removes this subscriber from the bus.
    ///
    /// The endpoint is closed before the registry write lock is requested, so a
    /// publisher blocked handing a payload to this subscriber is released first.
    pub async fn release(mut self) {
        self.close_endpoint();
        self.bus
            .unsubscribe(&self.channel, &self.subscriber_id)
            .await;
        self.released = true;
    }

    fn close_endpoint(&mut self) {
        self.endpoint.close();
        // Dropping queued deliveries fails their handoffs instead of leaving publishers
        // waiting on an acknowledgement that will never come.
        while let Ok(delivery) = self.endpoint.try_recv() {
            drop(delivery);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        self.close_endpoint();

        let bus = self.bus.clone();
        let channel = std::mem::take(&mut self.channel);
        let subscriber_id = self.subscriber_id.clone();

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    bus.unsubscribe(&channel, &subscriber_id).await;
                });
            }
            Err(_) => {
                if !bus.try_unsubscribe(&channel, &subscriber_id) {
                    warn!(
                        "Subscriber {} on channel {} dropped outside a runtime while the registry was busy; it stays registered with a closed endpoint",
                        subscriber_id.as_str(),
                        channel
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("subscriber_id", &self.subscriber_id)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::Bus;

    #[test]
    fn dropped_outside_a_runtime_is_removed_when_the_registry_is_free() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let bus = Bus::new();
        let subscription = runtime.block_on(bus.subscribe("/sync"));
        assert_eq!(runtime.block_on(bus.subscriber_count("/sync")), 1);

        drop(subscription);

        assert_eq!(runtime.block_on(bus.channel_count()), 0);
    }
}
