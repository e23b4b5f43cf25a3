use crate::{AppState, Error};
use async_stream::stream;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use log::*;
use sse::{pump, ChannelSink};
use std::convert::Infallible;

/// Entry point for every request. The request path, verbatim, names the channel.
///
/// GET subscribes to the channel, POST publishes the request body to it, and any other
/// method is answered with 404.
pub async fn dispatch(
    State(app_state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Body,
) -> Response {
    let channel = uri.path();

    match method {
        Method::GET => subscribe(&app_state, channel).await.into_response(),
        Method::POST => publish(&app_state, channel, body).await.into_response(),
        _ => {
            debug!("{method} {channel} is not supported");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// GET opens a long-lived event stream on `channel`.
///
/// The subscription is drained on its own task so the response can be returned straight
/// away; that task releases the subscription once the client goes away.
pub(crate) async fn subscribe(app_state: &AppState, channel: &str) -> impl IntoResponse {
    debug!("GET subscribe to channel {channel}");

    let subscription = app_state.bus.subscribe(channel).await;
    let (mut sink, mut frames) = ChannelSink::new();

    tokio::spawn(async move {
        pump(subscription, &mut sink).await;
    });

    // Frames arrive already encoded, so we just pass them through
    let body = stream! {
        while let Some(frame) = frames.recv().await {
            yield Ok::<Bytes, Infallible>(frame);
        }
    };

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONTENT_TYPE, "text/event-stream"),
        ],
        Body::from_stream(body),
    )
}

/// POST publishes the whole request body as one event on `channel`.
///
/// Responds only after every subscriber registered at publish time has taken the event.
pub(crate) async fn publish(
    app_state: &AppState,
    channel: &str,
    body: Body,
) -> Result<impl IntoResponse, Error> {
    let payload = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(Error::body_read)?;
    let size = payload.len();

    let delivered = app_state.bus.publish(channel, payload).await;
    debug!("POST published {size} bytes to channel {channel}, delivered to {delivered} subscriber(s)");

    Ok(StatusCode::OK)
}
