use crate::subscription::{hand_off, Delivery, Subscription};
use bytes::Bytes;
use log::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Channel names are request paths, compared verbatim.
pub type Channel = String;

/// Unique identifier for a subscriber (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

type SubscriberSet = HashMap<SubscriberId, mpsc::Sender<Delivery>>;

/// In-process broadcast registry mapping channel names to their live subscribers.
///
/// Cloning a `Bus` is cheap and every clone shares the same registry. A channel entry
/// exists only while at least one subscriber is registered on it.
#[derive(Clone, Default)]
pub struct Bus {
    channels: Arc<RwLock<HashMap<Channel, SubscriberSet>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber on `channel`, creating the channel entry if needed.
    pub async fn subscribe(&self, channel: impl Into<Channel>) -> Subscription {
        let channel = channel.into();
        let subscriber_id = SubscriberId::new();
        // Capacity 1 plus the acknowledgement in `Delivery` makes this an unbuffered handoff.
        let (endpoint, receiver) = mpsc::channel(1);

        let mut channels = self.channels.write().await;
        let subscribers = channels.entry(channel.clone()).or_default();
        subscribers.insert(subscriber_id.clone(), endpoint);
        info!(
            "Subscriber {} joined channel {} ({} subscribed)",
            subscriber_id.as_str(),
            channel,
            subscribers.len()
        );
        drop(channels);

        Subscription::new(self.clone(), channel, subscriber_id, receiver)
    }

    /// Delivers `payload` to every subscriber currently registered on `channel`.
    ///
    /// The registry read lock is held for the whole fan-out and each handoff blocks until
    /// that subscriber has taken the payload, so one slow subscriber slows every publisher
    /// on the channel. Returns how many subscribers accepted the payload; a channel with
    /// no subscribers drops the payload and returns 0.
    pub async fn publish(&self, channel: &str, payload: Bytes) -> usize {
        let channels = self.channels.read().await;

        let Some(subscribers) = channels.get(channel) else {
            debug!(
                "No subscribers on channel {}, dropping {} byte event",
                channel,
                payload.len()
            );
            return 0;
        };

        let mut delivered = 0;
        for (subscriber_id, endpoint) in subscribers.iter() {
            if hand_off(endpoint, payload.clone()).await {
                delivered += 1;
            } else {
                debug!(
                    "Subscriber {} left channel {} before taking the event",
                    subscriber_id.as_str(),
                    channel
                );
            }
        }

        debug!(
            "Published {} byte event to {}/{} subscriber(s) on channel {}",
            payload.len(),
            delivered,
            subscribers.len(),
            channel
        );

        delivered
    }

    pub(crate) async fn unsubscribe(&self, channel: &str, subscriber_id: &SubscriberId) {
        let mut channels = self.channels.write().await;
        Self::remove(&mut channels, channel, subscriber_id);
    }

    /// Non-blocking variant of `unsubscribe` for callers without an async context.
    /// Returns false when the registry lock could not be taken.
    pub(crate) fn try_unsubscribe(&self, channel: &str, subscriber_id: &SubscriberId) -> bool {
        match self.channels.try_write() {
            Ok(mut channels) => {
                Self::remove(&mut channels, channel, subscriber_id);
                true
            }
            Err(_) => false,
        }
    }

    fn remove(
        channels: &mut HashMap<Channel, SubscriberSet>,
        channel: &str,
        subscriber_id: &SubscriberId,
    ) {
        let Some(subscribers) = channels.get_mut(channel) else {
            return;
        };

        if subscribers.remove(subscriber_id).is_some() {
            info!(
                "Subscriber {} left channel {} ({} subscribed)",
                subscriber_id.as_str(),
                channel,
                subscribers.len()
            );
        }

        // Clean up empty channel entries
        if subscribers.is_empty() {
            channels.remove(channel);
            debug!("Channel {} has no subscribers left, removed", channel);
        }
    }

    /// Number of channels with at least one subscriber.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |subscribers| subscribers.len())
    }
}
