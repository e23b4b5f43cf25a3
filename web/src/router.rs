use crate::{controller::channel_controller, AppState};
use axum::http::{header, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

/// Every path is a channel, so there are no fixed routes: all requests go to the
/// fallback, which dispatches on the method.
pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .fallback(channel_controller::dispatch)
        // Any origin may subscribe or publish, whatever the outcome of the request
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .with_state(app_state)
}
