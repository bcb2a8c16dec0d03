//! Pass-through to the external media host: accept an image, hand back the
//! stable public URL under which it is served. The rest of the service
//! treats that URL as an opaque string.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media/images", post(upload_image))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /media/images (multipart, field `file`)
#[instrument(skip(state, mp))]
async fn upload_image(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    mut mp: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        if data.is_empty() {
            return Err(ApiError::InvalidInput("file is empty".into()));
        }

        let ext = ext_from_mime(&content_type).unwrap_or("bin");
        let key = format!("images/{}/{}.{}", subject.id, Uuid::new_v4(), ext);
        state
            .storage
            .put_object(&key, data, &content_type)
            .await?;

        let url = state.storage.public_url(&key);
        info!(user_id = %subject.id, %key, "image uploaded");
        return Ok((StatusCode::CREATED, Json(UploadResponse { url })));
    }

    Err(ApiError::InvalidInput("file field is required".into()))
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
