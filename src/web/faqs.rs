use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::RequireManager;
use crate::db;
use crate::error::{AppError, AppResult};

pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let faqs = state.faqs.get_or_refresh(state.db.pool()).await?;

    if faqs.is_empty() {
        return Err(AppError::NotFound(
            "No frequently asked questions yet".to_string(),
        ));
    }

    Ok(Json(json!({
        "message": "FAQs loaded",
        "response": { "faqs": faqs },
    })))
}

#[derive(Debug, Deserialize)]
pub struct FaqSearchParams {
    pub term: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<FaqSearchParams>,
) -> AppResult<impl IntoResponse> {
    let faqs = db::search_faqs(state.db.pool(), &params.term).await?;

    Ok(Json(json!({
        "message": "FAQs searched",
        "response": { "term": params.term, "faqs": faqs },
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
}

pub async fn create(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Json(req): Json<CreateFaqRequest>,
) -> AppResult<impl IntoResponse> {
    if req.question.trim().is_empty() || req.answer.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Question and answer are both required".to_string(),
        ));
    }

    let mut tx = state
        .db
        .pool()
        .begin()
        .await
        .context("Failed to begin transaction")?;
    let faq_no = db::insert_faq(&mut *tx, &req.question, &req.answer, manager.no).await?;
    tx.commit().await.context("Failed to commit FAQ create")?;

    state.faqs.invalidate();

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "FAQ created",
            "response": { "faq_no": faq_no },
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateFaqRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireManager(manager): RequireManager,
    Json(req): Json<UpdateFaqRequest>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state
        .db
        .pool()
        .begin()
        .await
        .context("Failed to begin transaction")?;
    let affected = db::update_faq(
        &mut *tx,
        no,
        req.question.as_deref(),
        req.answer.as_deref(),
        manager.no,
    )
    .await?;
    tx.commit().await.context("Failed to commit FAQ update")?;

    if affected == 0 {
        return Err(AppError::NotFound("FAQ not found".to_string()));
    }

    state.faqs.invalidate();

    Ok(Json(json!({ "message": "FAQ updated" })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(no): Path<i64>,
    RequireManager(_manager): RequireManager,
) -> AppResult<impl IntoResponse> {
    let affected = db::delete_faq(state.db.pool(), no).await?;

    if affected == 0 {
        return Err(AppError::NotFound("FAQ not found".to_string()));
    }

    state.faqs.invalidate();

    Ok(Json(json!({ "message": "FAQ deleted" })))
}
