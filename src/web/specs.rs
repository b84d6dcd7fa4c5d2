use anyhow::{anyhow, Context};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::RequireUser;
use crate::boards::DEFAULT_PHOTO;
use crate::db;
use crate::error::{ensure_owner, AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateSpecRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<CreateSpecRequest>,
) -> AppResult<impl IntoResponse> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }

    let mut tx = state
        .db
        .pool()
        .begin()
        .await
        .context("Failed to begin transaction")?;

    let spec_no = db::insert_spec(&mut *tx, user.no, &req.title, &req.description).await?;

    if !req.photo_urls.is_empty() && req.photo_urls[0] != DEFAULT_PHOTO {
        let written = db::insert_spec_photos(&mut *tx, spec_no, &req.photo_urls).await?;
        if written != req.photo_urls.len() as u64 {
            return Err(AppError::Internal(anyhow!(
                "Spec photo write mismatch: requested {}, wrote {written}",
                req.photo_urls.len()
            )));
        }
    }

    tx.commit().await.context("Failed to commit spec create")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Spec registered",
            "response": { "spec_no": spec_no },
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SpecPageParams {
    pub take: Option<i64>,
    pub page: Option<i64>,
}

pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_no): Path<i64>,
    Query(params): Query<SpecPageParams>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if db::get_user(pool, user_no).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let take = params.take.unwrap_or(10).clamp(1, 100);
    let page = params.page.unwrap_or(1).max(1);

    let specs = db::list_specs_for_user(pool, user_no, take, page).await?;

    let mut with_photos = Vec::with_capacity(specs.len());
    for spec in specs {
        let photos = db::list_spec_photos(pool, spec.no).await?;
        with_photos.push(json!({ "spec": spec, "photos": photos }));
    }

    Ok(Json(json!({
        "message": "Specs loaded",
        "response": { "specs": with_photos },
    })))
}

pub async fn read(
    State(state): State<AppState>,
    Path(no): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let spec = db::get_spec(pool, no)
        .await?
        .ok_or_else(|| AppError::NotFound("Spec not found".to_string()))?;
    let photos = db::list_spec_photos(pool, no).await?;

    Ok(Json(json!({
        "message": "Spec loaded",
        "response": { "spec": spec, "photos": photos },
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSpecRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
    Json(req): Json<UpdateSpecRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let spec = db::get_spec(pool, no)
        .await?
        .ok_or_else(|| AppError::NotFound("Spec not found".to_string()))?;
    ensure_owner(spec.user_no, user.no, "spec")?;

    db::update_spec(pool, no, req.title.as_deref(), req.description.as_deref()).await?;

    Ok(Json(json!({ "message": "Spec updated" })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireUser(user): RequireUser,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let spec = db::get_spec(pool, no)
        .await?
        .ok_or_else(|| AppError::NotFound("Spec not found".to_string()))?;
    ensure_owner(spec.user_no, user.no, "spec")?;

    db::soft_delete_spec(pool, no).await?;

    Ok(Json(json!({ "message": "Spec deleted" })))
}
