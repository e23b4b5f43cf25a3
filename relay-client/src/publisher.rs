use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};

use crate::url::channel_url;

pub struct Publisher {
    client: Client,
    base_url: String,
}

impl Publisher {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Posts `body` as one event on `channel`. The relay answers once every
    /// subscriber connected at that moment has taken the event.
    pub async fn publish(&self, channel: &str, body: Vec<u8>) -> Result<StatusCode> {
        let url = channel_url(&self.base_url, channel);

        let response = self
            .client
            .post(&url)
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to publish to {url}"))?;

        Ok(response.status())
    }
}
