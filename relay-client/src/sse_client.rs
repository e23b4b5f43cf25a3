use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::url::channel_url;

#[derive(Debug, Clone)]
pub struct Event {
    pub data: String,
}

/// A live subscription to one relay channel.
pub struct Connection {
    pub channel: String,
    event_rx: mpsc::UnboundedReceiver<Event>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(base_url: &str, channel: &str) -> Result<Self> {
        let url = channel_url(base_url, channel);
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?.build();

        let label = channel.to_string();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => {
                        let event = Event { data: event.data };

                        if tx.send(event).is_err() {
                            debug!("Event receiver dropped for {}", label);
                            break;
                        }
                    }
                    Some(Ok(es::SSE::Comment(_))) => {
                        // The relay never sends comments; ignore them from proxies.
                    }
                    Some(Err(e)) => {
                        warn!("Stream error on {}: {}", label, e);
                    }
                    None => {
                        debug!("Stream ended for {}", label);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            channel: channel.to_string(),
            event_rx: rx,
            _handle: handle,
        })
    }

    /// Waits for the next event, or forever when `timeout` is `None`.
    pub async fn next_event(&mut self, timeout: Option<Duration>) -> Result<Event> {
        let next = match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.event_rx.recv()).await {
                Ok(next) => next,
                Err(_) => anyhow::bail!("Timeout waiting for an event on {}", self.channel),
            },
            None => self.event_rx.recv().await,
        };

        match next {
            Some(event) => Ok(event),
            None => anyhow::bail!("Connection to {} closed", self.channel),
        }
    }
}
