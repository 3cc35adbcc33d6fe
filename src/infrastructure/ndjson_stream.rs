// Chunked newline-delimited JSON streaming of poll events
use crate::application::polling_service::PollEvent;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::sync::broadcast;

/// Serialize a single event as one JSON line.
fn encode_line(event: &PollEvent) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(event).map_err(std::io::Error::other)?;
    let mut chunk = BytesMut::with_capacity(json.len() + 1);
    chunk.put_slice(&json);
    chunk.put_u8(b'\n');
    Ok(chunk.freeze())
}

/// Turn a broadcast receiver into a stream of events. Lagged receivers skip
/// what they missed; the stream ends when the sender is dropped.
pub fn event_stream(
    mut rx: broadcast::Receiver<PollEvent>,
) -> impl Stream<Item = PollEvent> + Send + 'static {
    async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => yield event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Event stream lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

/// Create a chunked streaming response from a receiver
pub fn stream_from_receiver(rx: broadcast::Receiver<PollEvent>) -> impl IntoResponse {
    let byte_stream = event_stream(rx).map(|event| encode_line(&event));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
