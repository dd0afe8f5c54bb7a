//! Streaming keep-alive relay for the `/api/ocr` route.
//!
//! Extractions can run for minutes; intermediaries close idle connections long
//! before that. The relay responds immediately with a padded SSE comment frame
//! (the padding defeats proxy response buffering), keeps emitting comment
//! frames every few seconds while the upstream call is in flight, and then
//! passes the upstream byte stream through unchanged.

use std::time::Duration;

use async_stream::try_stream;
use axum::body::Bytes;
use futures_util::{Stream, StreamExt};

use super::GatewayError;

const PING_INTERVAL_SECS: u64 = 3;
const INITIAL_PADDING_BYTES: usize = 2048;

/// First frame, sent before the upstream call is even dispatched.
fn initial_ping() -> String {
    format!(": keep-alive-{}\n\n", "X".repeat(INITIAL_PADDING_BYTES))
}

fn ping() -> &'static str {
    ": keep-alive\n\n"
}

/// Relay one streaming upstream call, interleaving keep-alive frames until the
/// upstream responds. `request` must already be authorized and carry a
/// `stream: true` body.
pub fn keep_alive_stream(
    request: reqwest::RequestBuilder,
    timeout_secs: u64,
) -> impl Stream<Item = Result<Bytes, GatewayError>> {
    try_stream! {
        yield Bytes::from(initial_ping());

        let mut send = Box::pin(request.send());
        let deadline = tokio::time::sleep(Duration::from_secs(timeout_secs));
        tokio::pin!(deadline);

        let response = loop {
            // `?` and `yield` cannot appear inside `tokio::select!` arms within
            // `try_stream!`; hoist both out of the select.
            let step = tokio::select! {
                result = &mut send => {
                    Some(result.map_err(|e| GatewayError::Network(e.to_string())))
                }
                _ = tokio::time::sleep(Duration::from_secs(PING_INTERVAL_SECS)) => {
                    None
                }
                _ = &mut deadline => {
                    Some(Err(GatewayError::Timeout(timeout_secs)))
                }
            };
            match step {
                Some(result) => break result?,
                None => yield Bytes::from(ping()),
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            Err::<Bytes, _>(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            })?;
            // The `?` above always returns; this makes the branch diverge so
            // the borrow checker accepts the `response` use below.
            return;
        }

        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| GatewayError::Network(e.to_string()))?;
            yield chunk;
        }
    }
}
