use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::{generate_token, hash_password, hash_token, validate_password_strength, verify_password};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::kst;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub nickname: String,
    pub name: String,
    pub phone: Option<String>,
    pub password: String,
    pub school_no: Option<i64>,
    pub major_no: Option<i64>,
    pub photo_url: Option<String>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    if !EMAIL_RE.is_match(&req.email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.nickname.trim().is_empty() {
        return Err(AppError::BadRequest("Nickname cannot be empty".to_string()));
    }
    validate_password_strength(&req.password).map_err(|e| AppError::BadRequest(e.to_string()))?;

    if db::get_user_by_email(pool, &req.email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }
    if db::get_user_by_nickname(pool, &req.nickname).await?.is_some() {
        return Err(AppError::Conflict(
            "This nickname is already taken".to_string(),
        ));
    }

    if let Some(school_no) = req.school_no {
        if db::get_school(pool, school_no).await?.is_none() {
            return Err(AppError::NotFound("School not found".to_string()));
        }
    }
    if let Some(major_no) = req.major_no {
        if db::get_major(pool, major_no).await?.is_none() {
            return Err(AppError::NotFound("Major not found".to_string()));
        }
    }

    let user = db::NewUser {
        email: req.email,
        nickname: req.nickname,
        name: req.name,
        phone: req.phone,
        photo_url: req.photo_url.unwrap_or_else(|| "default.png".to_string()),
        password_hash: hash_password(&req.password)?,
        school_no: req.school_no,
        major_no: req.major_no,
    };

    let user_no = db::insert_user(pool, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Welcome aboard",
            "response": { "user_no": user_no },
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let Some(user) = db::get_user_by_email(pool, &req.email).await? else {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = generate_token();
    let ttl_secs = state.config.session_ttl.as_secs() as i64;
    let expires_at = kst::to_db(kst::now() + Duration::seconds(ttl_secs));
    db::insert_session(pool, user.no, &token, &expires_at).await?;

    let cookie = format!(
        "session={token}; HttpOnly; Path=/; Max-Age={ttl_secs}; SameSite=Lax"
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "message": "Signed in",
            "response": { "user_no": user.no, "nickname": user.nickname },
        })),
    ))
}

pub async fn signout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = headers
        .get("cookie")
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|cookie| cookie.trim().strip_prefix("session="))
        });

    if let Some(token) = token {
        db::delete_session(state.db.pool(), token).await?;
    }

    let clear = "session=; HttpOnly; Path=/; Max-Age=0";

    Ok((
        [(header::SET_COOKIE, clear.to_string())],
        Json(json!({ "message": "Signed out" })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub token: String,
    pub password: String,
}

/// Complete a password reset started by the forget-password mail.
pub async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = state.db.pool();

    let Some(reset) = db::get_password_reset(pool, &hash_token(&req.token)).await? else {
        return Err(AppError::BadRequest(
            "This password change link is invalid".to_string(),
        ));
    };

    if reset.expires_at < kst::to_db(kst::now()) {
        db::delete_password_reset(pool, reset.id).await?;
        return Err(AppError::BadRequest(
            "This password change link has expired".to_string(),
        ));
    }

    validate_password_strength(&req.password).map_err(|e| AppError::BadRequest(e.to_string()))?;

    db::update_user_password(pool, reset.user_no, &hash_password(&req.password)?).await?;
    db::delete_password_reset(pool, reset.id).await?;

    Ok(Json(json!({ "message": "Password changed" })))
}
