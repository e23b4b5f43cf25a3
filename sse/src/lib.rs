//! In-process publish/subscribe bus and the event stream protocol built on top of it.
//!
//! # Architecture
//!
//! - **Bus**: one registry per process, mapping a channel name to the set of subscribers
//!   currently connected to it. Channel entries appear on first subscribe and are removed
//!   on last release.
//! - **Unbuffered fan-out**: every subscriber owns a single-slot endpoint and publishers
//!   wait for each subscriber to take the payload. A slow subscriber slows the publishers
//!   of its channel; nothing is queued for later.
//! - **Ephemeral events**: a payload published while nobody listens is dropped.
//! - **Streams**: [`stream::pump`] drains a [`Subscription`] into any [`EventSink`],
//!   writing one `data: <payload>\n\n` frame per event and flushing after each.
//!
//! # Message Flow
//!
//! 1. A subscriber calls [`Bus::subscribe`] with a channel name and gets a [`Subscription`]
//! 2. The subscription is handed to [`stream::pump`] together with the client's sink
//! 3. A publisher calls [`Bus::publish`]; the registry is read under a shared lock and the
//!    payload is handed to each subscriber in turn
//! 4. The pump frames the payload, writes it and flushes
//! 5. When the client disconnects the pump releases the subscription, which closes its
//!    endpoint and removes it from the registry
//!
//! # Modules
//!
//! - `bus`: the channel registry and publish fan-out
//! - `subscription`: subscriber endpoint handle and its release
//! - `sink`: the flushable output abstraction and a channel-backed implementation
//! - `stream`: the drain loop connecting a subscription to a sink
//! - `frame`: event-stream framing

pub mod bus;
pub mod error;
pub mod frame;
pub mod sink;
pub mod stream;
pub mod subscription;

pub use bus::{Bus, Channel, SubscriberId};
pub use error::Error;
pub use sink::{ChannelSink, EventSink};
pub use stream::{pump, StreamEnd};
pub use subscription::Subscription;
