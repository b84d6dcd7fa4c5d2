use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::RequireUser;
use crate::db;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct LikeUserRequest {
    pub user_no: i64,
    /// true to like, false to take the like back.
    pub judge: bool,
}

pub async fn like_user(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<LikeUserRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if req.user_no == user.no {
        return Err(AppError::BadRequest(
            "You cannot like yourself".to_string(),
        ));
    }
    if db::get_user(pool, req.user_no).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let already = db::user_like_exists(pool, user.no, req.user_no).await?;

    if req.judge {
        if already {
            return Err(AppError::Conflict(
                "You already like this user".to_string(),
            ));
        }
        db::insert_user_like(pool, user.no, req.user_no).await?;
    } else {
        if !already {
            return Err(AppError::Conflict(
                "There is no like to take back".to_string(),
            ));
        }
        db::delete_user_like(pool, user.no, req.user_no).await?;
    }

    Ok(Json(json!({ "message": "Request processed" })))
}

#[derive(Debug, Deserialize)]
pub struct LikeBoardRequest {
    pub judge: bool,
}

pub async fn like_board(
    State(state): State<AppState>,
    Path(board_no): Path<i64>,
    RequireUser(user): RequireUser,
    Json(req): Json<LikeBoardRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if db::get_board(pool, board_no).await?.is_none() {
        return Err(AppError::NotFound("Board not found".to_string()));
    }

    let already = db::board_like_exists(pool, board_no, user.no).await?;

    if req.judge {
        if already {
            return Err(AppError::Conflict(
                "You already like this board".to_string(),
            ));
        }
        db::insert_board_like(pool, board_no, user.no).await?;
    } else {
        if !already {
            return Err(AppError::Conflict(
                "There is no like to take back".to_string(),
            ));
        }
        db::delete_board_like(pool, board_no, user.no).await?;
    }

    Ok(Json(json!({ "message": "Request processed" })))
}
