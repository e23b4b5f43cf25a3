//! Error types for the `sse` crate.
//!
//! Follows the same pattern as the web layer: a root Error struct holding an error kind enum
//! and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Sink(SinkErrorKind),
}

/// Errors raised by an `EventSink` while streaming frames to a subscriber.
#[derive(Debug, PartialEq)]
pub enum SinkErrorKind {
    /// The receiving side of the connection has gone away.
    Closed,
    /// Writing or flushing failed for another reason.
    Io,
}

impl Error {
    pub fn sink_closed() -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::Sink(SinkErrorKind::Closed),
        }
    }

    pub fn sink_io<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            source: Some(err.into()),
            error_kind: ErrorKind::Sink(SinkErrorKind::Io),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.error_kind == ErrorKind::Sink(SinkErrorKind::Closed)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Sink(SinkErrorKind::Closed) => write!(f, "event sink closed"),
            ErrorKind::Sink(SinkErrorKind::Io) => match &self.source {
                Some(source) => write!(f, "event sink write failed: {source}"),
                None => write!(f, "event sink write failed"),
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}
