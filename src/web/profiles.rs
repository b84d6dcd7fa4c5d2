use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::RequireUser;
use crate::db;
use crate::error::{AppError, AppResult};

pub async fn read_profile(
    State(state): State<AppState>,
    Path(no): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let profile = db::get_profile(state.db.pool(), no)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "message": "Profile loaded",
        "response": profile,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
    pub school_no: Option<i64>,
    pub major_no: Option<i64>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if let Some(nickname) = &req.nickname {
        if nickname.trim().is_empty() {
            return Err(AppError::BadRequest("Nickname cannot be empty".to_string()));
        }
        if let Some(existing) = db::get_user_by_nickname(pool, nickname).await? {
            if existing.no != user.no {
                return Err(AppError::Conflict(
                    "This nickname is already taken".to_string(),
                ));
            }
        }
    }

    if let Some(school_no) = req.school_no {
        if db::get_school(pool, school_no).await?.is_none() {
            return Err(AppError::NotFound("School not found".to_string()));
        }
    }
    if let Some(major_no) = req.major_no {
        if db::get_major(pool, major_no).await?.is_none() {
            return Err(AppError::NotFound("Major not found".to_string()));
        }
    }

    let patch = db::ProfilePatch {
        phone: req.phone,
        nickname: req.nickname,
        photo_url: req.photo_url,
        school_no: req.school_no,
        major_no: req.major_no,
    };

    db::update_profile(pool, user.no, &patch).await?;

    Ok(Json(json!({
        "message": "Profile updated",
        "response": { "user_no": user.no },
    })))
}
