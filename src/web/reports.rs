use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::RequireUser;
use crate::db::{self, ReportCheckTable};
use crate::error::{AppError, AppResult};

/// Closed set of things a report can point at. Each kind carries exactly the
/// reference it needs and is dispatched exhaustively below.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportTarget {
    Board { board_no: i64 },
    User { user_no: i64 },
}

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub target: ReportTarget,
    pub description: String,
    pub checks: Vec<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    RequireUser(reporter): RequireUser,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    // Duplicate checkbox ids collapse to one check row.
    let mut checks: Vec<i64> = Vec::new();
    for check in &req.checks {
        if !checks.contains(check) {
            checks.push(*check);
        }
    }
    if checks.is_empty() {
        return Err(AppError::BadRequest(
            "Pick at least one report reason".to_string(),
        ));
    }
    for check in &checks {
        if db::get_report_checkbox(pool, *check).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Report reason {check} does not exist"
            )));
        }
    }

    let report_no = match req.target {
        ReportTarget::Board { board_no } => {
            if db::get_board(pool, board_no).await?.is_none() {
                return Err(AppError::NotFound(
                    "Board to report not found".to_string(),
                ));
            }

            let mut tx = pool.begin().await.context("Failed to begin transaction")?;
            let report_no =
                db::insert_board_report(&mut *tx, board_no, reporter.no, &req.description).await?;
            for check in &checks {
                db::insert_board_report_check(&mut *tx, report_no, *check).await?;
            }
            tx.commit().await.context("Failed to commit board report")?;
            report_no
        }
        ReportTarget::User { user_no } => {
            if db::get_user(pool, user_no).await?.is_none() {
                return Err(AppError::NotFound(
                    "User to report not found".to_string(),
                ));
            }

            let mut tx = pool.begin().await.context("Failed to begin transaction")?;
            let report_no =
                db::insert_user_report(&mut *tx, user_no, reporter.no, &req.description).await?;
            for check in &checks {
                db::insert_user_report_check(&mut *tx, report_no, *check).await?;
            }
            tx.commit().await.context("Failed to commit user report")?;
            report_no
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Report filed",
            "response": { "report_no": report_no },
        })),
    ))
}

pub async fn list_checkboxes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let checkboxes = db::list_report_checkboxes(state.db.pool()).await?;

    Ok(Json(json!({
        "message": "Report reasons loaded",
        "response": { "checkboxes": checkboxes },
    })))
}

pub async fn read_board_report(
    State(state): State<AppState>,
    Path(no): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let report = db::get_board_report(pool, no)
        .await?
        .ok_or_else(|| AppError::NotFound("Board report not found".to_string()))?;
    let checks = db::list_report_checks(pool, ReportCheckTable::Board, no).await?;

    Ok(Json(json!({
        "message": "Board report loaded",
        "response": { "report": report, "checks": checks },
    })))
}

pub async fn read_user_report(
    State(state): State<AppState>,
    Path(no): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let report = db::get_user_report(pool, no)
        .await?
        .ok_or_else(|| AppError::NotFound("User report not found".to_string()))?;
    let checks = db::list_report_checks(pool, ReportCheckTable::User, no).await?;

    Ok(Json(json!({
        "message": "User report loaded",
        "response": { "report": report, "checks": checks },
    })))
}
