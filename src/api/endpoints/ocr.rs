//! `POST /api/ocr`: one extraction round trip for a caller-supplied image URL.
//!
//! Buffered JSON is the default. With the streaming flag set, the response
//! starts immediately and carries keep-alive frames until the upstream model
//! answers, then relays its stream.

use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::gateway::keepalive::keep_alive_stream;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    pub image_url: Option<String>,
}

pub async fn extract(
    State(ctx): State<ApiContext>,
    Extension(_session): Extension<SessionContext>,
    Json(body): Json<OcrRequest>,
) -> Result<Response, ApiError> {
    let image_url = body
        .image_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("imageUrl is required".into()))?;

    if ctx.config.ocr_streaming {
        let request_body = ctx.ocr_client.request_body(&image_url, true);
        let request = ctx.ocr_client.authorized_request(&request_body)?;
        let stream = keep_alive_stream(request, ctx.ocr_client.timeout_secs());

        let response = Response::builder()
            .header("Content-Type", "text/event-stream")
            .header("Cache-Control", "no-cache")
            .body(Body::from_stream(stream))
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(response)
    } else {
        let extraction = ctx.gateway.extract(&image_url).await?;
        Ok(Json(json!({
            "extractedText": extraction.extracted_text,
            "translatedText": extraction.translated_text,
            "tableData": extraction.table_rows,
        }))
        .into_response())
    }
}
