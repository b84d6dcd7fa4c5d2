use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;

use crate::db::{self, User};
use crate::error::AppError;
use crate::kst;

/// Current authenticated user (if any).
/// Use this extractor when authentication is optional.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = SqlitePool::from_ref(state);

        // Session token travels in a cookie.
        let token = parts
            .headers
            .get("cookie")
            .and_then(|h| h.to_str().ok())
            .and_then(|cookies| {
                cookies
                    .split(';')
                    .find_map(|cookie| cookie.trim().strip_prefix("session="))
            });

        let Some(token) = token else {
            return Ok(MaybeUser(None));
        };

        let session = match db::get_session_by_token(&pool, token).await {
            Ok(Some(s)) => s,
            _ => return Ok(MaybeUser(None)),
        };

        // Expired sessions are cleaned up opportunistically.
        let now = kst::to_db(kst::now());
        if session.expires_at < now {
            let _ = db::delete_session(&pool, token).await;
            return Ok(MaybeUser(None));
        }

        let user = match db::get_user(&pool, session.user_no).await {
            Ok(Some(u)) => u,
            _ => return Ok(MaybeUser(None)),
        };

        Ok(MaybeUser(Some(user)))
    }
}

/// Current authenticated user (required).
/// Returns 401 Unauthorized if not logged in.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;

        match user {
            Some(u) => Ok(RequireUser(u)),
            None => Err(AppError::Unauthorized("Login required".to_string()).into_response()),
        }
    }
}

/// Require the manager role (FAQ administration and the like).
/// Returns 401 Unauthorized for ordinary users.
#[derive(Debug, Clone)]
pub struct RequireManager(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireManager
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !user.manager {
            return Err(
                AppError::Unauthorized("Manager access required".to_string()).into_response(),
            );
        }

        Ok(RequireManager(user))
    }
}
