use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The request body could not be read to the end.
    BodyRead,
}

impl Error {
    pub fn body_read<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            source: Some(err.into()),
            error_kind: ErrorKind::BodyRead,
        }
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.error_kind {
            ErrorKind::BodyRead => {
                warn!(
                    "Failed to read request body: {}",
                    self.source
                        .as_ref()
                        .map_or_else(|| "unknown".to_string(), |e| e.to_string())
                );
                (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
            }
        }
    }
}
