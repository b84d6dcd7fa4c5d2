use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::auth::RequireUser;
use crate::db::{self, Comment, Reply};
use crate::error::{ensure_owner, AppError, AppResult};

#[derive(Debug, Serialize)]
struct CommentWithReplies {
    #[serde(flatten)]
    comment: Comment,
    replies: Vec<Reply>,
}

pub async fn list(
    State(state): State<AppState>,
    Path(board_no): Path<i64>,
    RequireUser(user): RequireUser,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if db::get_board(pool, board_no).await?.is_none() {
        return Err(AppError::NotFound("Board not found".to_string()));
    }

    let comments = db::list_comments_for_board(pool, board_no).await?;

    let mut threaded = Vec::with_capacity(comments.len());
    for comment in comments {
        let replies = db::list_replies(pool, comment.no).await?;
        threaded.push(CommentWithReplies { comment, replies });
    }

    Ok(Json(json!({
        "message": "Comments loaded",
        "response": { "viewer_no": user.no, "comments": threaded },
    })))
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

pub async fn create(
    State(state): State<AppState>,
    Path(board_no): Path<i64>,
    RequireUser(user): RequireUser,
    Json(req): Json<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("Comment cannot be empty".to_string()));
    }
    if db::get_board(pool, board_no).await?.is_none() {
        return Err(AppError::NotFound(
            "Board to comment on not found".to_string(),
        ));
    }

    let comment_no = db::insert_comment(pool, board_no, user.no, &req.content).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment created",
            "response": { "comment_no": comment_no },
        })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
    Json(req): Json<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let comment = db::get_comment(pool, no)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
    ensure_owner(comment.user_no, user.no, "comment")?;

    db::update_comment(pool, no, &req.content).await?;

    Ok(Json(json!({ "message": "Comment updated" })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let comment = db::get_comment(pool, no)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
    ensure_owner(comment.user_no, user.no, "comment")?;

    db::delete_comment(pool, no).await?;

    Ok(Json(json!({ "message": "Comment deleted" })))
}

pub async fn create_reply(
    State(state): State<AppState>,
    Path(comment_no): Path<i64>,
    RequireUser(user): RequireUser,
    Json(req): Json<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("Reply cannot be empty".to_string()));
    }
    if db::get_comment(pool, comment_no).await?.is_none() {
        return Err(AppError::NotFound(
            "Comment to reply to not found".to_string(),
        ));
    }

    let reply_no = db::insert_reply(pool, comment_no, user.no, &req.content).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Reply created",
            "response": { "reply_no": reply_no },
        })),
    ))
}

pub async fn remove_reply(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let reply = db::get_reply(pool, no)
        .await?
        .ok_or_else(|| AppError::NotFound("Reply not found".to_string()))?;
    ensure_owner(reply.user_no, user.no, "reply")?;

    db::delete_reply(pool, no).await?;

    Ok(Json(json!({ "message": "Reply deleted" })))
}
