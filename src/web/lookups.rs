use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::db;
use crate::error::AppResult;

pub async fn schools(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let schools = db::list_schools(state.db.pool()).await?;

    Ok(Json(json!({
        "message": "Schools loaded",
        "response": { "schools": schools },
    })))
}

pub async fn majors(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let majors = db::list_majors(state.db.pool()).await?;

    Ok(Json(json!({
        "message": "Majors loaded",
        "response": { "majors": majors },
    })))
}

pub async fn areas(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let areas = db::list_areas(state.db.pool()).await?;

    Ok(Json(json!({
        "message": "Areas loaded",
        "response": { "areas": areas },
    })))
}

pub async fn categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = db::list_categories(state.db.pool()).await?;

    Ok(Json(json!({
        "message": "Categories loaded",
        "response": { "categories": categories },
    })))
}

pub async fn hot_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = db::hot_categories(state.db.pool(), 3).await?;

    Ok(Json(json!({
        "message": "Hot categories loaded",
        "response": { "categories": categories },
    })))
}
