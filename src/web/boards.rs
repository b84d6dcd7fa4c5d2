use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::AppState;
use crate::auth::{MaybeUser, RequireUser};
use crate::boards::{self, DEFAULT_PHOTO};
use crate::db::{self, BoardFilter, BoardPatch, DeadlineFilter, HotBoardSelect, NewBoard, SortOrder};
use crate::error::{AppError, AppResult};
use crate::kst;

const DEFAULT_PAGE_SIZE: i64 = 15;

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub title: String,
    pub description: String,
    pub summary: Option<String>,
    pub price: i64,
    pub target: bool,
    pub category_no: i64,
    pub area_no: i64,
    /// Days until the deadline; omitted means open-ended.
    pub deadline: Option<i64>,
    pub photo_urls: Vec<String>,
}

pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<CreateBoardRequest>,
) -> AppResult<impl IntoResponse> {
    if req.price < 0 {
        return Err(AppError::BadRequest("Price cannot be negative".to_string()));
    }
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }

    let board = NewBoard {
        title: req.title,
        description: req.description,
        summary: req.summary,
        price: req.price,
        target: req.target,
        user_no: user.no,
        category_no: req.category_no,
        area_no: req.area_no,
        deadline_days: req.deadline,
    };

    let board_no = boards::create_board(state.db.pool(), &board, &req.photo_urls).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Board created",
            "response": { "board_no": board_no },
        })),
    ))
}

pub async fn read(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    MaybeUser(viewer): MaybeUser,
) -> AppResult<impl IntoResponse> {
    let viewer_no = viewer.map(|u| u.no);
    let authorization = viewer_no.is_some();

    let board = boards::read_board(state.db.pool(), &state.hits, no, viewer_no).await?;
    let photos = db::list_board_photos(state.db.pool(), no).await?;

    Ok(Json(json!({
        "message": "Board loaded",
        "response": { "board": board, "photos": photos, "authorization": authorization },
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub price: Option<i64>,
    pub target: Option<bool>,
    pub category_no: Option<i64>,
    pub area_no: Option<i64>,
    /// Days until the new deadline, re-derived from creation time; omitted
    /// clears the deadline.
    pub deadline: Option<i64>,
    pub photo_urls: Vec<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
    Json(req): Json<UpdateBoardRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(price) = req.price {
        if price < 0 {
            return Err(AppError::BadRequest("Price cannot be negative".to_string()));
        }
    }

    let patch = BoardPatch {
        title: req.title,
        description: req.description,
        summary: req.summary,
        price: req.price,
        target: req.target,
        category_no: req.category_no,
        area_no: req.area_no,
        deadline_days: req.deadline,
    };

    let replaced = boards::update_board(state.db.pool(), no, user.no, &patch, &req.photo_urls).await?;

    // The transaction is committed; losing an orphaned object is preferable
    // to failing the request here.
    for key in &replaced {
        if key == DEFAULT_PHOTO {
            continue;
        }
        if let Err(e) = state.storage.delete(key).await {
            warn!(key = %key, "Failed to delete replaced photo: {e:#}");
        }
    }

    Ok(Json(json!({
        "message": "Board updated",
        "response": { "board_no": no, "replaced_photos": replaced },
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
) -> AppResult<impl IntoResponse> {
    boards::delete_board(state.db.pool(), no, user.no).await?;

    Ok(Json(json!({ "message": "Board deleted" })))
}

pub async fn close(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
) -> AppResult<impl IntoResponse> {
    boards::close_board(state.db.pool(), no, user.no).await?;

    Ok(Json(json!({ "message": "Board closed" })))
}

pub async fn cancel_close(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
) -> AppResult<impl IntoResponse> {
    boards::cancel_close(state.db.pool(), no, user.no).await?;

    Ok(Json(json!({ "message": "Board reopened" })))
}

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    pub category_no: Option<i64>,
    pub area_no: Option<i64>,
    pub title: Option<String>,
    pub max: Option<i64>,
    pub min: Option<i64>,
    pub target: Option<bool>,
    #[serde(default)]
    pub free: bool,
    /// Day-count window; the literal "null" selects open-ended boards.
    pub date: Option<String>,
    #[serde(default)]
    pub popular: bool,
    pub sort: Option<String>,
    pub take: Option<i64>,
    pub page: Option<i64>,
}

fn parse_deadline_filter(date: Option<&str>) -> AppResult<Option<DeadlineFilter>> {
    match date {
        None => Ok(None),
        Some("null") => Ok(Some(DeadlineFilter::Open)),
        Some(raw) => match raw.parse::<i64>() {
            Ok(days) if days > 0 => Ok(Some(DeadlineFilter::Within(days))),
            _ => Err(AppError::BadRequest(format!(
                "Invalid deadline window: {raw}"
            ))),
        },
    }
}

fn page_bounds(take: Option<i64>, page: Option<i64>) -> (i64, i64) {
    let take = take.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let page = page.unwrap_or(1).max(1);
    (take, take * (page - 1))
}

pub async fn filter(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> AppResult<impl IntoResponse> {
    let sort = match params.sort.as_deref() {
        Some("asc" | "ASC") => SortOrder::Asc,
        _ => SortOrder::Desc,
    };

    let filter = BoardFilter {
        category_no: params.category_no,
        area_no: params.area_no,
        title: params.title,
        max_price: params.max,
        min_price: params.min,
        target: params.target,
        free: params.free,
        deadline: parse_deadline_filter(params.date.as_deref())?,
        popular: params.popular,
        sort,
    };

    let (limit, offset) = page_bounds(params.take, params.page);
    let boards = db::filter_boards(state.db.pool(), &filter, kst::now(), limit, offset).await?;

    Ok(Json(json!({
        "message": "Boards filtered",
        "response": { "boards": boards },
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub title: String,
    pub take: Option<i64>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.take.unwrap_or(50).clamp(1, 100);
    let boards = db::search_boards(state.db.pool(), &params.title, kst::now(), limit).await?;

    Ok(Json(json!({
        "message": "Boards searched",
        "response": { "search": params.title, "boards": boards },
    })))
}

#[derive(Debug, Deserialize)]
pub struct HotParams {
    pub select: Option<i64>,
}

pub async fn hot(
    State(state): State<AppState>,
    Query(params): Query<HotParams>,
) -> AppResult<impl IntoResponse> {
    let select = match params.select {
        Some(1) => HotBoardSelect::Open,
        Some(2) => HotBoardSelect::Closed,
        _ => HotBoardSelect::All,
    };

    let now = kst::now();
    let month = now.format("%Y-%m").to_string();

    // This month's ranking, falling back to all-time when the month is empty.
    let mut hot = db::hot_boards(state.db.pool(), select, now, Some(&month), 3).await?;
    if hot.is_empty() {
        hot = db::hot_boards(state.db.pool(), select, now, None, 3).await?;
    }

    Ok(Json(json!({
        "message": "Hot boards loaded",
        "response": { "boards": hot },
    })))
}

#[derive(Debug, Deserialize)]
pub struct CategoryParams {
    pub take: Option<i64>,
    pub page: Option<i64>,
}

pub async fn by_category(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    Query(params): Query<CategoryParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_bounds(params.take, params.page);
    let boards = boards::boards_by_category(state.db.pool(), no, limit, offset).await?;

    Ok(Json(json!({
        "message": "Category boards loaded",
        "response": { "category_no": no, "boards": boards },
    })))
}

#[derive(Debug, Deserialize)]
pub struct UserBoardsParams {
    #[serde(default)]
    pub target: bool,
    pub take: Option<i64>,
    pub page: Option<i64>,
}

pub async fn by_user(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    Query(params): Query<UserBoardsParams>,
) -> AppResult<impl IntoResponse> {
    if db::get_user(state.db.pool(), no).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let take = params.take.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let page = params.page.unwrap_or(1).max(1);

    let boards =
        db::boards_by_user(state.db.pool(), no, params.target, kst::now(), take, page).await?;

    Ok(Json(json!({
        "message": "User boards loaded",
        "response": { "boards": boards },
    })))
}
