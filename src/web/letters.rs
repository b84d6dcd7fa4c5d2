use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::RequireUser;
use crate::db;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct SendLetterRequest {
    pub receiver_no: i64,
    pub description: String,
}

pub async fn send(
    State(state): State<AppState>,
    RequireUser(sender): RequireUser,
    Json(req): Json<SendLetterRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if req.receiver_no == sender.no {
        return Err(AppError::BadRequest(
            "You cannot write a letter to yourself".to_string(),
        ));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::BadRequest("Letter cannot be empty".to_string()));
    }
    if db::get_user(pool, req.receiver_no).await?.is_none() {
        return Err(AppError::NotFound("Receiver not found".to_string()));
    }

    let letter_no = db::insert_letter(pool, sender.no, req.receiver_no, &req.description).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Letter sent",
            "response": { "letter_no": letter_no },
        })),
    ))
}

/// Read the full conversation with one counterpart. Everything they sent is
/// marked read as a side effect.
pub async fn conversation(
    State(state): State<AppState>,
    Path(other_no): Path<i64>,
    RequireUser(me): RequireUser,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if db::get_user(pool, other_no).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    db::mark_letters_read(pool, me.no, other_no).await?;
    let letters = db::list_letters_between(pool, me.no, other_no).await?;

    Ok(Json(json!({
        "message": "Conversation loaded",
        "response": { "letters": letters },
    })))
}
