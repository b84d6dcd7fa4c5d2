//! Request-level error taxonomy.
//!
//! Service and repository code raises one of these kinds; the web layer turns
//! them into a structured JSON response. Repository failures arrive through
//! `anyhow` with human-readable context and map to 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::Internal(e) => {
                error!("internal error: {e:#}");
                "Unexpected server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Shared ownership check applied before any mutating operation.
///
/// Every owner-only path (board edit/close/delete, comment edit, spec edit,
/// letter access) funnels through here instead of re-implementing the
/// comparison inline.
pub fn ensure_owner(owner_no: i64, requester_no: i64, resource: &str) -> AppResult<()> {
    if owner_no != requester_no {
        return Err(AppError::Unauthorized(format!(
            "Only the owner of this {resource} may do that"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_ensure_owner() {
        assert!(ensure_owner(1, 1, "board").is_ok());
        assert!(matches!(
            ensure_owner(1, 2, "board"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
