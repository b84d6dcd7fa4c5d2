use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::RequireUser;
use crate::db::{self, NewReview};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub board_no: i64,
    pub target_user_no: i64,
    pub description: String,
    pub rating: i64,
}

pub async fn create(
    State(state): State<AppState>,
    RequireUser(reviewer): RequireUser,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if !(1..=5).contains(&req.rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    if req.target_user_no == reviewer.no {
        return Err(AppError::BadRequest(
            "You cannot review yourself".to_string(),
        ));
    }

    if db::get_board(pool, req.board_no).await?.is_none() {
        return Err(AppError::NotFound("Board not found".to_string()));
    }
    if db::get_user(pool, req.target_user_no).await?.is_none() {
        return Err(AppError::NotFound("User to review not found".to_string()));
    }

    if db::review_exists(pool, req.board_no, reviewer.no).await? {
        return Err(AppError::Conflict(
            "You already reviewed this exchange".to_string(),
        ));
    }

    let review = NewReview {
        board_no: req.board_no,
        reviewer_no: reviewer.no,
        target_user_no: req.target_user_no,
        description: req.description,
        rating: req.rating,
    };

    let review_no = db::insert_review(pool, &review).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Review created",
            "response": { "review_no": review_no },
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReviewPageParams {
    pub take: Option<i64>,
    pub page: Option<i64>,
}

pub async fn list_for_user(
    State(state): State<AppState>,
    Path(target_user_no): Path<i64>,
    Query(params): Query<ReviewPageParams>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if db::get_user(pool, target_user_no).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let take = params.take.unwrap_or(10).clamp(1, 100);
    let page = params.page.unwrap_or(1).max(1);

    let reviews = db::list_reviews_for_user(pool, target_user_no, take, page).await?;
    let count = db::count_reviews_for_user(pool, target_user_no).await?;
    let average_rating = db::average_rating_for_user(pool, target_user_no).await?;

    Ok(Json(json!({
        "message": "Reviews loaded",
        "response": {
            "reviews": reviews,
            "count": count,
            "average_rating": average_rating,
        },
    })))
}

pub async fn check_duplicate(
    State(state): State<AppState>,
    Path(board_no): Path<i64>,
    RequireUser(reviewer): RequireUser,
) -> AppResult<impl IntoResponse> {
    let duplicate = db::review_exists(state.db.pool(), board_no, reviewer.no).await?;

    Ok(Json(json!({
        "message": "Duplicate check complete",
        "response": { "duplicate": duplicate },
    })))
}
