use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::auth::RequireUser;
use crate::boards::DEFAULT_PHOTO;
use crate::error::{AppError, AppResult};

const ALLOWED_FOLDERS: [&str; 4] = ["boards", "specs", "profiles", "question"];

/// Upload a batch of photos and return the object keys to reference from a
/// later create/update call. A part named after the default image is passed
/// through as the no-custom-photo sentinel without touching storage.
pub async fn upload(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    RequireUser(_user): RequireUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    if !ALLOWED_FOLDERS.contains(&folder.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown photo folder: {folder}"
        )));
    }

    let mut keys = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?
    {
        let file_name = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| AppError::BadRequest("Upload part has no file name".to_string()))?;

        if file_name == DEFAULT_PHOTO {
            keys.push(DEFAULT_PHOTO.to_string());
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        if data.is_empty() {
            return Err(AppError::BadRequest(format!("Empty upload: {file_name}")));
        }

        let key = state.storage.upload(&folder, &file_name, &data).await?;
        keys.push(key);
    }

    if keys.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Photos uploaded",
            "response": { "photo_urls": keys },
        })),
    ))
}
