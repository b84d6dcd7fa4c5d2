use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::{generate_token, hash_token, RequireUser};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::kst;

#[derive(Debug, Deserialize)]
pub struct ForgetPasswordRequest {
    pub email: String,
}

/// Issue a single-use reset token and mail the change link.
pub async fn forget_password(
    State(state): State<AppState>,
    Json(req): Json<ForgetPasswordRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let Some(user) = db::get_user_by_email(pool, &req.email).await? else {
        return Err(AppError::NotFound(
            "No account with this email".to_string(),
        ));
    };

    let token = generate_token();
    let ttl_secs = state.config.password_reset_ttl.as_secs() as i64;
    let expires_at = kst::to_db(kst::now() + Duration::seconds(ttl_secs));

    db::insert_password_reset(pool, user.no, &hash_token(&token), &expires_at).await?;

    state
        .mailer
        .send_password_reset(&user.email, &user.nickname, &token)
        .await?;

    Ok(Json(json!({
        "message": format!("A password change link was sent to {}", user.email),
        "response": { "email": user.email },
    })))
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// Forward a member question to the operations inbox.
pub async fn question(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<QuestionRequest>,
) -> AppResult<impl IntoResponse> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }

    state
        .mailer
        .send_question(
            &state.config.mail_question_inbox,
            &user.nickname,
            &user.email,
            &req.title,
            &req.description,
            &req.photo_urls,
        )
        .await?;

    Ok(Json(json!({
        "message": format!("{}'s question was sent", user.nickname),
    })))
}
