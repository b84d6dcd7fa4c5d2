use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub no: i64,
    pub email: String,
    pub nickname: String,
    pub name: String,
    pub phone: Option<String>,
    pub photo_url: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub school_no: Option<i64>,
    pub major_no: Option<i64>,
    pub manager: bool,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub nickname: String,
    pub name: String,
    pub phone: Option<String>,
    pub photo_url: String,
    pub password_hash: String,
    pub school_no: Option<i64>,
    pub major_no: Option<i64>,
}

/// A login session.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_no: i64,
    pub token: String,
    pub created_at: String,
    pub expires_at: String,
}

/// Lookup rows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct School {
    pub no: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Major {
    pub no: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Area {
    pub no: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub no: i64,
    pub name: String,
    pub hit: i64,
}

/// A marketplace listing.
///
/// `target` distinguishes help-offering (true) from help-seeking (false)
/// boards. `hit` is the persisted view-count floor; the live count adds the
/// pending delta from the hit cache.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub no: i64,
    pub title: String,
    pub description: String,
    pub summary: Option<String>,
    pub price: i64,
    pub target: bool,
    pub is_deadline: bool,
    pub hit: i64,
    pub user_no: i64,
    pub category_no: i64,
    pub area_no: i64,
    pub deadline: Option<String>,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

/// Payload for the transactional create flow.
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub title: String,
    pub description: String,
    pub summary: Option<String>,
    pub price: i64,
    pub target: bool,
    pub user_no: i64,
    pub category_no: i64,
    pub area_no: i64,
    /// Deadline expressed as days from creation; None means open-ended.
    pub deadline_days: Option<i64>,
}

/// Partial update payload; None fields leave the stored value untouched.
/// `deadline_days` is the deliberate exception: None clears the deadline.
#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub price: Option<i64>,
    pub target: Option<bool>,
    pub category_no: Option<i64>,
    pub area_no: Option<i64>,
    pub deadline_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardPhoto {
    pub no: i64,
    pub board_no: i64,
    pub photo_url: String,
    pub photo_order: i64,
}

/// One row of a board listing page, denormalized for display.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardSummary {
    pub no: i64,
    pub title: String,
    pub is_deadline: bool,
    pub price: i64,
    pub target: bool,
    pub area_no: i64,
    pub area_name: String,
    pub category_no: i64,
    pub category_name: String,
    pub user_nickname: String,
    pub photo_url: Option<String>,
    pub like_count: i64,
    pub days_remaining: Option<i64>,
}

/// The single-board detail view.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardDetail {
    pub no: i64,
    pub title: String,
    pub description: String,
    pub summary: Option<String>,
    pub price: i64,
    pub target: bool,
    pub is_deadline: bool,
    pub hit: i64,
    pub deadline: Option<String>,
    pub created_at: String,
    pub days_remaining: Option<i64>,
    pub area_no: i64,
    pub area_name: String,
    pub category_no: i64,
    pub category_name: String,
    pub user_no: i64,
    pub user_nickname: String,
    pub user_photo_url: String,
    pub user_school: Option<String>,
    pub user_major: Option<String>,
    pub like_count: i64,
}

/// A comment on a board.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub no: i64,
    pub board_no: i64,
    pub user_no: i64,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reply {
    pub no: i64,
    pub comment_no: i64,
    pub user_no: i64,
    pub content: String,
    pub created_at: String,
}

/// A review of a counterparty, tied to the board the exchange happened on.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub no: i64,
    pub board_no: i64,
    pub reviewer_no: i64,
    pub target_user_no: i64,
    pub description: String,
    pub rating: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub board_no: i64,
    pub reviewer_no: i64,
    pub target_user_no: i64,
    pub description: String,
    pub rating: i64,
}

/// One row of a user's review page, joined with reviewer and board info.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewDisplay {
    pub no: i64,
    pub description: String,
    pub rating: i64,
    pub created_at: String,
    pub board_no: i64,
    pub board_title: String,
    pub reviewer_no: i64,
    pub reviewer_nickname: String,
    pub reviewer_photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReportCheckbox {
    pub no: i64,
    pub content: String,
}

/// A filed report against a board.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReportedBoard {
    pub no: i64,
    pub board_no: i64,
    pub reporter_no: i64,
    pub description: String,
    pub created_at: String,
}

/// A filed report against a user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReportedUser {
    pub no: i64,
    pub user_no: i64,
    pub reporter_no: i64,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Faq {
    pub no: i64,
    pub question: String,
    pub answer: String,
    pub manager_no: i64,
    pub modifier_no: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Letter {
    pub no: i64,
    pub sender_no: i64,
    pub receiver_no: i64,
    pub description: String,
    pub reading_flag: bool,
    pub created_at: String,
}

/// A user portfolio entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Spec {
    pub no: i64,
    pub user_no: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpecPhoto {
    pub no: i64,
    pub spec_no: i64,
    pub photo_url: String,
    pub photo_order: i64,
}

/// Partial profile update; None fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
    pub school_no: Option<i64>,
    pub major_no: Option<i64>,
}

/// A pending password-reset token (stored hashed).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PasswordReset {
    pub id: i64,
    pub user_no: i64,
    pub token_hash: String,
    pub created_at: String,
    pub expires_at: String,
}

/// Profile view: user fields joined with lookup names and the received-like
/// count.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub no: i64,
    pub email: String,
    pub nickname: String,
    pub name: String,
    pub phone: Option<String>,
    pub photo_url: String,
    pub school_name: Option<String>,
    pub major_name: Option<String>,
    pub created_at: String,
    pub like_count: i64,
}
