//! Blob serving: signed-token previews and public object paths.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// `GET /files/:token`: resolve a signed preview token and stream the blob.
pub async fn signed(
    State(ctx): State<ApiContext>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let key = ctx.store.resolve_token(&token)?;
    serve_object(&ctx, &key)
}

/// `GET /public/*key`: serve an object by its storage key.
pub async fn public(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    serve_object(&ctx, &key)
}

fn serve_object(ctx: &ApiContext, key: &str) -> Result<Response, ApiError> {
    use crate::storage::ObjectStore as _;
    let bytes = ctx.store.download(key)?;
    let mime = mime_guess::from_path(key).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(axum::body::Body::from(bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
