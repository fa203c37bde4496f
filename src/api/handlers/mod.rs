//! API request handlers, organized by endpoint group.

pub mod content;
pub mod health;
pub mod products;
pub mod settings;

use axum::body::{Body, Bytes};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tokio::sync::mpsc;

/// Wrap a chat relay channel as a streamed NDJSON response. Dropping the
/// body (client disconnect) closes the channel and stops the relay.
pub(crate) fn ndjson_response(mut rx: mpsc::Receiver<String>) -> Response {
    let stream = async_stream::stream! {
        while let Some(record) = rx.recv().await {
            yield Ok::<_, std::convert::Infallible>(Bytes::from(record));
        }
    };

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(stream),
    )
        .into_response()
}
