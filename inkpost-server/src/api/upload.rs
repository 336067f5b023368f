//! Image upload endpoint
//!
//! Decodes the client-supplied base64 payload and hands the bytes to the
//! object-storage collaborator; the response carries the public URL.

use axum::{extract::State, routing::post, Json, Router};
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::auth::CurrentUser;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    pub base64: String,
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub url: String,
}

/// POST /api/upload/image
pub async fn image(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UploadImageRequest>,
) -> ApiResult<Json<UploadImageResponse>> {
    // Strip a data-URL prefix if the client sent one
    let encoded = match payload.base64.split_once(";base64,") {
        Some((_, data)) => data,
        None => payload.base64.as_str(),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ApiError::Validation(format!("invalid base64 payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(ApiError::Validation("empty upload".to_string()));
    }

    let ext = payload
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("jpg");
    let key = format!("articles/{}-{}.{}", user.0.id, Uuid::new_v4(), ext);

    let url = state
        .storage
        .put(&key, bytes, &payload.content_type)
        .await?;

    Ok(Json(UploadImageResponse { url }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/upload/image", post(image))
}
