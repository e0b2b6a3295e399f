//! Endpoints of HTTP server.
//!
use std::sync::{Arc, Mutex};

use axum::{
    body::StreamBody, extract::Query, http::header, response::IntoResponse, Extension, Json,
};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;

use crate::{pins::PinGrid, DepthStreams};

/// Search parameters available to the depth stream.
#[derive(Debug, Deserialize)]
pub struct DepthStreamParams {
    #[serde(default)]
    overlay: bool,
}

/// Health check endpoint.
pub async fn healthcheck() -> &'static str {
    "healthy"
}

/// MJPEG stream of the normalized depth view, most recent pass first.
///
/// With `?overlay=true` the grid sampling points are marked on every frame.
pub async fn depth_stream(
    Extension(streams): Extension<Arc<DepthStreams>>,
    Query(params): Query<DepthStreamParams>,
) -> impl IntoResponse {
    log::info!("Depth stream requested (overlay: {})", params.overlay);

    let rx = match params.overlay {
        true => streams.overlay_tx.subscribe(),
        false => streams.plain_tx.subscribe(),
    };

    let stream = BroadcastStream::from(rx);

    // Set body and headers for multipart streaming
    let body = StreamBody::new(stream);
    let headers = [(
        header::CONTENT_TYPE,
        "multipart/x-mixed-replace; boundary=frame",
    )];

    (headers, body)
}

/// JSON snapshot of the current pin bed.
pub async fn pins_snapshot(Extension(pins): Extension<Arc<Mutex<PinGrid>>>) -> Json<PinGrid> {
    let pins = pins.lock().unwrap();

    Json(pins.clone())
}
