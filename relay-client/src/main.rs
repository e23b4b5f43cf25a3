use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

mod publisher;
mod sse_client;
mod url;

use publisher::Publisher;
use sse_client::Connection;

#[derive(Parser)]
#[command(name = "relay-client")]
#[command(about = "Subscribe to and publish on channel relay channels")]
struct Cli {
    /// Base URL of the relay (e.g., http://localhost:4000)
    #[arg(long, default_value = "http://localhost:4000")]
    base_url: String,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream events published on a channel to stdout
    Subscribe {
        /// Channel path, e.g. /room1
        #[arg(long)]
        channel: String,

        /// Exit after this many events
        #[arg(long)]
        count: Option<usize>,

        /// Give up when no event arrives within this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Publish one event on a channel
    Publish {
        /// Channel path, e.g. /room1
        #[arg(long)]
        channel: String,

        /// Event payload; read from stdin when omitted
        #[arg(long)]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    match cli.command {
        Command::Subscribe {
            channel,
            count,
            timeout_secs,
        } => subscribe(&cli.base_url, &channel, count, timeout_secs).await,
        Command::Publish { channel, data } => publish(&cli.base_url, &channel, data).await,
    }
}

async fn subscribe(
    base_url: &str,
    channel: &str,
    count: Option<usize>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    println!("{} Subscribing to {}...", "→".blue(), channel.bright_white());
    let mut connection = Connection::establish(base_url, channel).await?;
    let timeout = timeout_secs.map(Duration::from_secs);

    let mut received = 0;
    while count.map_or(true, |count| received < count) {
        let event = connection.next_event(timeout).await?;
        received += 1;
        println!("{} {}", "✓".green(), event.data);
    }

    println!(
        "{} Received {} event(s) on {}",
        "→".blue(),
        received,
        connection.channel
    );
    Ok(())
}

async fn publish(base_url: &str, channel: &str, data: Option<String>) -> Result<()> {
    let body = read_payload(data, tokio::io::stdin()).await?;

    let publisher = Publisher::new(reqwest::Client::new(), base_url.to_string());
    let size = body.len();
    let status = publisher.publish(channel, body).await?;

    if status.is_success() {
        println!(
            "{} Published {} byte(s) to {}",
            "✓".green(),
            size,
            channel.bright_white()
        );
        Ok(())
    } else {
        println!("{} Relay answered {}", "✗".red(), status);
        anyhow::bail!("Publish to {channel} failed with status {status}")
    }
}

/// The `--data` value when given, otherwise everything `input` yields until EOF.
async fn read_payload<R>(data: Option<String>, mut input: R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    match data {
        Some(data) => Ok(data.into_bytes()),
        None => {
            let mut body = Vec::new();
            input
                .read_to_end(&mut body)
                .await
                .context("Failed to read event payload from stdin")?;
            Ok(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn data_flag_wins_over_input() {
        let body = read_payload(Some("hello".to_string()), &b"ignored"[..])
            .await
            .unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn input_is_read_to_the_end_without_data_flag() {
        let body = read_payload(None, &b"line one\nline two"[..]).await.unwrap();
        assert_eq!(body, b"line one\nline two");
    }
}
