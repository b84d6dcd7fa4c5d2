use anyhow::{Context, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::models::{
    Area, Category, Comment, Faq, Letter, Major, NewReview, NewUser, PasswordReset, Profile,
    ProfilePatch, Reply, ReportCheckbox, ReportedBoard, ReportedUser, ReviewDisplay, School,
    Session, Spec, SpecPhoto, User,
};
use crate::kst;

// ========== Users ==========

/// Insert a new user, returning its number.
pub async fn insert_user(pool: &SqlitePool, user: &NewUser) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO users (email, nickname, name, phone, photo_url, password_hash,
                           school_no, major_no, manager, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
        ",
    )
    .bind(&user.email)
    .bind(&user.nickname)
    .bind(&user.name)
    .bind(&user.phone)
    .bind(&user.photo_url)
    .bind(&user.password_hash)
    .bind(user.school_no)
    .bind(user.major_no)
    .bind(kst::to_db(kst::now()))
    .execute(pool)
    .await
    .context("Failed to insert user")?;

    Ok(result.last_insert_rowid())
}

pub async fn get_user(pool: &SqlitePool, no: i64) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE no = ? AND deleted_at IS NULL")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user")
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE email = ? AND deleted_at IS NULL")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by email")
}

pub async fn get_user_by_nickname(pool: &SqlitePool, nickname: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE nickname = ? AND deleted_at IS NULL")
        .bind(nickname)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by nickname")
}

/// Profile page row: lookup names joined in, received likes aggregated.
pub async fn get_profile(pool: &SqlitePool, no: i64) -> Result<Option<Profile>> {
    sqlx::query_as(
        r"
        SELECT
            u.no,
            u.email,
            u.nickname,
            u.name,
            u.phone,
            u.photo_url,
            s.name AS school_name,
            m.name AS major_name,
            u.created_at,
            COUNT(DISTINCT ul.liked_me_no) AS like_count
        FROM users u
        LEFT JOIN schools s ON u.school_no = s.no
        LEFT JOIN majors m ON u.major_no = m.no
        LEFT JOIN user_likes ul ON ul.liked_user_no = u.no
        WHERE u.no = ? AND u.deleted_at IS NULL
        GROUP BY u.no
        ",
    )
    .bind(no)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch profile")
}

/// Apply a partial profile update. Returns rows affected.
pub async fn update_profile(pool: &SqlitePool, no: i64, patch: &ProfilePatch) -> Result<u64> {
    let mut qb: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new("UPDATE users SET no = no");

    if let Some(phone) = &patch.phone {
        qb.push(", phone = ").push_bind(phone);
    }
    if let Some(nickname) = &patch.nickname {
        qb.push(", nickname = ").push_bind(nickname);
    }
    if let Some(photo_url) = &patch.photo_url {
        qb.push(", photo_url = ").push_bind(photo_url);
    }
    if let Some(school_no) = patch.school_no {
        qb.push(", school_no = ").push_bind(school_no);
    }
    if let Some(major_no) = patch.major_no {
        qb.push(", major_no = ").push_bind(major_no);
    }

    qb.push(" WHERE no = ").push_bind(no);
    qb.push(" AND deleted_at IS NULL");

    let result = qb
        .build()
        .execute(pool)
        .await
        .context("Failed to update profile")?;

    Ok(result.rows_affected())
}

pub async fn update_user_password(pool: &SqlitePool, no: i64, password_hash: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE users SET password_hash = ? WHERE no = ?")
        .bind(password_hash)
        .bind(no)
        .execute(pool)
        .await
        .context("Failed to update password")?;

    Ok(result.rows_affected())
}

// ========== Sessions ==========

pub async fn insert_session(
    pool: &SqlitePool,
    user_no: i64,
    token: &str,
    expires_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO sessions (user_no, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_no)
    .bind(token)
    .bind(kst::to_db(kst::now()))
    .bind(expires_at)
    .execute(pool)
    .await
    .context("Failed to insert session")?;

    Ok(result.last_insert_rowid())
}

pub async fn get_session_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    sqlx::query_as("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch session")
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("Failed to delete session")?;

    Ok(result.rows_affected())
}

// ========== Lookups ==========

pub async fn list_schools(pool: &SqlitePool) -> Result<Vec<School>> {
    sqlx::query_as("SELECT * FROM schools ORDER BY no")
        .fetch_all(pool)
        .await
        .context("Failed to list schools")
}

pub async fn get_school(pool: &SqlitePool, no: i64) -> Result<Option<School>> {
    sqlx::query_as("SELECT * FROM schools WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch school")
}

pub async fn list_majors(pool: &SqlitePool) -> Result<Vec<Major>> {
    sqlx::query_as("SELECT * FROM majors ORDER BY no")
        .fetch_all(pool)
        .await
        .context("Failed to list majors")
}

pub async fn get_major(pool: &SqlitePool, no: i64) -> Result<Option<Major>> {
    sqlx::query_as("SELECT * FROM majors WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch major")
}

pub async fn list_areas(pool: &SqlitePool) -> Result<Vec<Area>> {
    sqlx::query_as("SELECT * FROM areas ORDER BY no")
        .fetch_all(pool)
        .await
        .context("Failed to list areas")
}

pub async fn get_area(pool: &SqlitePool, no: i64) -> Result<Option<Area>> {
    sqlx::query_as("SELECT * FROM areas WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch area")
}

pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>> {
    sqlx::query_as("SELECT * FROM categories ORDER BY no")
        .fetch_all(pool)
        .await
        .context("Failed to list categories")
}

pub async fn get_category(pool: &SqlitePool, no: i64) -> Result<Option<Category>> {
    sqlx::query_as("SELECT * FROM categories WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch category")
}

/// Most-used categories, by usage counter.
pub async fn hot_categories(pool: &SqlitePool, limit: i64) -> Result<Vec<Category>> {
    sqlx::query_as(
        "SELECT * FROM categories WHERE hit > 0 ORDER BY hit DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to fetch hot categories")
}

// ========== Likes ==========

pub async fn user_like_exists(pool: &SqlitePool, liked_me: i64, liked_user: i64) -> Result<bool> {
    let row = sqlx::query(
        "SELECT 1 FROM user_likes WHERE liked_me_no = ? AND liked_user_no = ?",
    )
    .bind(liked_me)
    .bind(liked_user)
    .fetch_optional(pool)
    .await
    .context("Failed to check user like")?;

    Ok(row.is_some())
}

pub async fn insert_user_like(pool: &SqlitePool, liked_me: i64, liked_user: i64) -> Result<u64> {
    let result = sqlx::query(
        "INSERT INTO user_likes (liked_me_no, liked_user_no) VALUES (?, ?)",
    )
    .bind(liked_me)
    .bind(liked_user)
    .execute(pool)
    .await
    .context("Failed to insert user like")?;

    Ok(result.rows_affected())
}

pub async fn delete_user_like(pool: &SqlitePool, liked_me: i64, liked_user: i64) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM user_likes WHERE liked_me_no = ? AND liked_user_no = ?",
    )
    .bind(liked_me)
    .bind(liked_user)
    .execute(pool)
    .await
    .context("Failed to delete user like")?;

    Ok(result.rows_affected())
}

pub async fn board_like_exists(pool: &SqlitePool, board_no: i64, user_no: i64) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM board_likes WHERE board_no = ? AND user_no = ?")
        .bind(board_no)
        .bind(user_no)
        .fetch_optional(pool)
        .await
        .context("Failed to check board like")?;

    Ok(row.is_some())
}

pub async fn insert_board_like(pool: &SqlitePool, board_no: i64, user_no: i64) -> Result<u64> {
    let result = sqlx::query("INSERT INTO board_likes (board_no, user_no) VALUES (?, ?)")
        .bind(board_no)
        .bind(user_no)
        .execute(pool)
        .await
        .context("Failed to insert board like")?;

    Ok(result.rows_affected())
}

pub async fn delete_board_like(pool: &SqlitePool, board_no: i64, user_no: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM board_likes WHERE board_no = ? AND user_no = ?")
        .bind(board_no)
        .bind(user_no)
        .execute(pool)
        .await
        .context("Failed to delete board like")?;

    Ok(result.rows_affected())
}

// ========== Comments & replies ==========

pub async fn insert_comment(
    pool: &SqlitePool,
    board_no: i64,
    user_no: i64,
    content: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO comments (board_no, user_no, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(board_no)
    .bind(user_no)
    .bind(content)
    .bind(kst::to_db(kst::now()))
    .execute(pool)
    .await
    .context("Failed to insert comment")?;

    Ok(result.last_insert_rowid())
}

pub async fn get_comment(pool: &SqlitePool, no: i64) -> Result<Option<Comment>> {
    sqlx::query_as("SELECT * FROM comments WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch comment")
}

pub async fn list_comments_for_board(pool: &SqlitePool, board_no: i64) -> Result<Vec<Comment>> {
    sqlx::query_as("SELECT * FROM comments WHERE board_no = ? ORDER BY no")
        .bind(board_no)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")
}

pub async fn update_comment(pool: &SqlitePool, no: i64, content: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE comments SET content = ? WHERE no = ?")
        .bind(content)
        .bind(no)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    Ok(result.rows_affected())
}

pub async fn delete_comment(pool: &SqlitePool, no: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM comments WHERE no = ?")
        .bind(no)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected())
}

pub async fn insert_reply(
    pool: &SqlitePool,
    comment_no: i64,
    user_no: i64,
    content: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO replies (comment_no, user_no, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(comment_no)
    .bind(user_no)
    .bind(content)
    .bind(kst::to_db(kst::now()))
    .execute(pool)
    .await
    .context("Failed to insert reply")?;

    Ok(result.last_insert_rowid())
}

pub async fn get_reply(pool: &SqlitePool, no: i64) -> Result<Option<Reply>> {
    sqlx::query_as("SELECT * FROM replies WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch reply")
}

pub async fn list_replies(pool: &SqlitePool, comment_no: i64) -> Result<Vec<Reply>> {
    sqlx::query_as("SELECT * FROM replies WHERE comment_no = ? ORDER BY no")
        .bind(comment_no)
        .fetch_all(pool)
        .await
        .context("Failed to list replies")
}

pub async fn delete_reply(pool: &SqlitePool, no: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM replies WHERE no = ?")
        .bind(no)
        .execute(pool)
        .await
        .context("Failed to delete reply")?;

    Ok(result.rows_affected())
}

// ========== Reviews ==========

pub async fn insert_review(pool: &SqlitePool, review: &NewReview) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO reviews (board_no, reviewer_no, target_user_no, description, rating, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(review.board_no)
    .bind(review.reviewer_no)
    .bind(review.target_user_no)
    .bind(&review.description)
    .bind(review.rating)
    .bind(kst::to_db(kst::now()))
    .execute(pool)
    .await
    .context("Failed to insert review")?;

    Ok(result.last_insert_rowid())
}

pub async fn review_exists(pool: &SqlitePool, board_no: i64, reviewer_no: i64) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM reviews WHERE board_no = ? AND reviewer_no = ?")
        .bind(board_no)
        .bind(reviewer_no)
        .fetch_optional(pool)
        .await
        .context("Failed to check duplicate review")?;

    Ok(row.is_some())
}

/// Reviews received by a user, newest first, joined for display.
pub async fn list_reviews_for_user(
    pool: &SqlitePool,
    target_user_no: i64,
    take: i64,
    page: i64,
) -> Result<Vec<ReviewDisplay>> {
    let offset = take * (page - 1).max(0);

    sqlx::query_as(
        r"
        SELECT
            r.no,
            r.description,
            r.rating,
            r.created_at,
            b.no AS board_no,
            b.title AS board_title,
            u.no AS reviewer_no,
            u.nickname AS reviewer_nickname,
            u.photo_url AS reviewer_photo_url
        FROM reviews r
        JOIN boards b ON r.board_no = b.no
        JOIN users u ON r.reviewer_no = u.no
        WHERE r.target_user_no = ?
        ORDER BY r.no DESC
        LIMIT ? OFFSET ?
        ",
    )
    .bind(target_user_no)
    .bind(take)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list reviews")
}

pub async fn count_reviews_for_user(pool: &SqlitePool, target_user_no: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS cnt FROM reviews WHERE target_user_no = ?")
        .bind(target_user_no)
        .fetch_one(pool)
        .await
        .context("Failed to count reviews")?;

    Ok(row.get("cnt"))
}

/// Average rating received by a user; None when unreviewed.
pub async fn average_rating_for_user(
    pool: &SqlitePool,
    target_user_no: i64,
) -> Result<Option<f64>> {
    let row = sqlx::query("SELECT AVG(rating) AS avg_rating FROM reviews WHERE target_user_no = ?")
        .bind(target_user_no)
        .fetch_one(pool)
        .await
        .context("Failed to average ratings")?;

    Ok(row.get("avg_rating"))
}

// ========== Reports ==========

pub async fn list_report_checkboxes(pool: &SqlitePool) -> Result<Vec<ReportCheckbox>> {
    sqlx::query_as("SELECT * FROM report_checkboxes ORDER BY no")
        .fetch_all(pool)
        .await
        .context("Failed to list report checkboxes")
}

pub async fn get_report_checkbox(pool: &SqlitePool, no: i64) -> Result<Option<ReportCheckbox>> {
    sqlx::query_as("SELECT * FROM report_checkboxes WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch report checkbox")
}

/// Transactional insert of a board report row.
pub async fn insert_board_report(
    conn: &mut SqliteConnection,
    board_no: i64,
    reporter_no: i64,
    description: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO reported_boards (board_no, reporter_no, description, created_at)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(board_no)
    .bind(reporter_no)
    .bind(description)
    .bind(kst::to_db(kst::now()))
    .execute(conn)
    .await
    .context("Failed to insert board report")?;

    Ok(result.last_insert_rowid())
}

pub async fn insert_user_report(
    conn: &mut SqliteConnection,
    user_no: i64,
    reporter_no: i64,
    description: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO reported_users (user_no, reporter_no, description, created_at)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(user_no)
    .bind(reporter_no)
    .bind(description)
    .bind(kst::to_db(kst::now()))
    .execute(conn)
    .await
    .context("Failed to insert user report")?;

    Ok(result.last_insert_rowid())
}

pub async fn insert_board_report_check(
    conn: &mut SqliteConnection,
    report_no: i64,
    checkbox_no: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO board_report_checks (report_no, checkbox_no) VALUES (?, ?)")
        .bind(report_no)
        .bind(checkbox_no)
        .execute(conn)
        .await
        .context("Failed to insert board report check")?;

    Ok(())
}

pub async fn insert_user_report_check(
    conn: &mut SqliteConnection,
    report_no: i64,
    checkbox_no: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO user_report_checks (report_no, checkbox_no) VALUES (?, ?)")
        .bind(report_no)
        .bind(checkbox_no)
        .execute(conn)
        .await
        .context("Failed to insert user report check")?;

    Ok(())
}

pub async fn get_board_report(pool: &SqlitePool, no: i64) -> Result<Option<ReportedBoard>> {
    sqlx::query_as("SELECT * FROM reported_boards WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch board report")
}

pub async fn get_user_report(pool: &SqlitePool, no: i64) -> Result<Option<ReportedUser>> {
    sqlx::query_as("SELECT * FROM reported_users WHERE no = ?")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user report")
}

/// Checkbox ids attached to a report, either kind.
pub async fn list_report_checks(
    pool: &SqlitePool,
    table: ReportCheckTable,
    report_no: i64,
) -> Result<Vec<i64>> {
    let sql = match table {
        ReportCheckTable::Board => {
            "SELECT checkbox_no FROM board_report_checks WHERE report_no = ? ORDER BY checkbox_no"
        }
        ReportCheckTable::User => {
            "SELECT checkbox_no FROM user_report_checks WHERE report_no = ? ORDER BY checkbox_no"
        }
    };

    let rows = sqlx::query(sql)
        .bind(report_no)
        .fetch_all(pool)
        .await
        .context("Failed to list report checks")?;

    Ok(rows.iter().map(|r| r.get::<i64, _>(0)).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCheckTable {
    Board,
    User,
}

// ========== FAQs ==========

pub async fn list_faqs(pool: &SqlitePool) -> Result<Vec<Faq>> {
    sqlx::query_as("SELECT * FROM faqs ORDER BY no DESC")
        .fetch_all(pool)
        .await
        .context("Failed to list FAQs")
}

pub async fn search_faqs(pool: &SqlitePool, term: &str) -> Result<Vec<Faq>> {
    let pattern = format!("%{term}%");

    sqlx::query_as(
        "SELECT * FROM faqs WHERE question LIKE ? OR answer LIKE ? ORDER BY no DESC",
    )
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(pool)
    .await
    .context("Failed to search FAQs")
}

pub async fn insert_faq(
    conn: &mut SqliteConnection,
    question: &str,
    answer: &str,
    manager_no: i64,
) -> Result<i64> {
    let now = kst::to_db(kst::now());

    let result = sqlx::query(
        r"
        INSERT INTO faqs (question, answer, manager_no, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ",
    )
    .bind(question)
    .bind(answer)
    .bind(manager_no)
    .bind(&now)
    .bind(&now)
    .execute(conn)
    .await
    .context("Failed to insert FAQ")?;

    Ok(result.last_insert_rowid())
}

pub async fn update_faq(
    conn: &mut SqliteConnection,
    no: i64,
    question: Option<&str>,
    answer: Option<&str>,
    modifier_no: i64,
) -> Result<u64> {
    let mut qb: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new("UPDATE faqs SET modifier_no = ");
    qb.push_bind(modifier_no);
    qb.push(", updated_at = ").push_bind(kst::to_db(kst::now()));

    if let Some(question) = question {
        qb.push(", question = ").push_bind(question);
    }
    if let Some(answer) = answer {
        qb.push(", answer = ").push_bind(answer);
    }

    qb.push(" WHERE no = ").push_bind(no);

    let result = qb
        .build()
        .execute(conn)
        .await
        .context("Failed to update FAQ")?;

    Ok(result.rows_affected())
}

pub async fn delete_faq(pool: &SqlitePool, no: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM faqs WHERE no = ?")
        .bind(no)
        .execute(pool)
        .await
        .context("Failed to delete FAQ")?;

    Ok(result.rows_affected())
}

// ========== Letters ==========

pub async fn insert_letter(
    pool: &SqlitePool,
    sender_no: i64,
    receiver_no: i64,
    description: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO letters (sender_no, receiver_no, description, created_at)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(sender_no)
    .bind(receiver_no)
    .bind(description)
    .bind(kst::to_db(kst::now()))
    .execute(pool)
    .await
    .context("Failed to insert letter")?;

    Ok(result.last_insert_rowid())
}

/// Full conversation between two users, oldest first.
pub async fn list_letters_between(
    pool: &SqlitePool,
    me: i64,
    other: i64,
) -> Result<Vec<Letter>> {
    sqlx::query_as(
        r"
        SELECT * FROM letters
        WHERE (sender_no = ? AND receiver_no = ?)
           OR (sender_no = ? AND receiver_no = ?)
        ORDER BY no
        ",
    )
    .bind(me)
    .bind(other)
    .bind(other)
    .bind(me)
    .fetch_all(pool)
    .await
    .context("Failed to list letters")
}

/// Mark everything the counterpart sent me as read.
pub async fn mark_letters_read(pool: &SqlitePool, me: i64, other: i64) -> Result<u64> {
    let result = sqlx::query(
        r"
        UPDATE letters SET reading_flag = 1
        WHERE receiver_no = ? AND sender_no = ? AND reading_flag = 0
        ",
    )
    .bind(me)
    .bind(other)
    .execute(pool)
    .await
    .context("Failed to mark letters read")?;

    Ok(result.rows_affected())
}

// ========== Specs ==========

pub async fn insert_spec(
    conn: &mut SqliteConnection,
    user_no: i64,
    title: &str,
    description: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO specs (user_no, title, description, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_no)
    .bind(title)
    .bind(description)
    .bind(kst::to_db(kst::now()))
    .execute(conn)
    .await
    .context("Failed to insert spec")?;

    Ok(result.last_insert_rowid())
}

/// Insert an ordered photo set for a spec. Returns rows written.
pub async fn insert_spec_photos(
    conn: &mut SqliteConnection,
    spec_no: i64,
    photo_urls: &[String],
) -> Result<u64> {
    let mut written = 0;

    for (index, url) in photo_urls.iter().enumerate() {
        let result = sqlx::query(
            "INSERT INTO spec_photos (spec_no, photo_url, photo_order) VALUES (?, ?, ?)",
        )
        .bind(spec_no)
        .bind(url)
        .bind(index as i64 + 1)
        .execute(&mut *conn)
        .await
        .context("Failed to insert spec photo")?;

        written += result.rows_affected();
    }

    Ok(written)
}

pub async fn get_spec(pool: &SqlitePool, no: i64) -> Result<Option<Spec>> {
    sqlx::query_as("SELECT * FROM specs WHERE no = ? AND deleted_at IS NULL")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch spec")
}

pub async fn list_specs_for_user(
    pool: &SqlitePool,
    user_no: i64,
    take: i64,
    page: i64,
) -> Result<Vec<Spec>> {
    let offset = take * (page - 1).max(0);

    sqlx::query_as(
        r"
        SELECT * FROM specs
        WHERE user_no = ? AND deleted_at IS NULL
        ORDER BY no DESC
        LIMIT ? OFFSET ?
        ",
    )
    .bind(user_no)
    .bind(take)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list specs")
}

pub async fn list_spec_photos(pool: &SqlitePool, spec_no: i64) -> Result<Vec<SpecPhoto>> {
    sqlx::query_as("SELECT * FROM spec_photos WHERE spec_no = ? ORDER BY photo_order")
        .bind(spec_no)
        .fetch_all(pool)
        .await
        .context("Failed to list spec photos")
}

pub async fn update_spec(
    pool: &SqlitePool,
    no: i64,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<u64> {
    let mut qb: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new("UPDATE specs SET no = no");

    if let Some(title) = title {
        qb.push(", title = ").push_bind(title);
    }
    if let Some(description) = description {
        qb.push(", description = ").push_bind(description);
    }

    qb.push(" WHERE no = ").push_bind(no);
    qb.push(" AND deleted_at IS NULL");

    let result = qb
        .build()
        .execute(pool)
        .await
        .context("Failed to update spec")?;

    Ok(result.rows_affected())
}

pub async fn soft_delete_spec(pool: &SqlitePool, no: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE specs SET deleted_at = ? WHERE no = ? AND deleted_at IS NULL")
        .bind(kst::to_db(kst::now()))
        .bind(no)
        .execute(pool)
        .await
        .context("Failed to soft-delete spec")?;

    Ok(result.rows_affected())
}

// ========== Password resets ==========

pub async fn insert_password_reset(
    pool: &SqlitePool,
    user_no: i64,
    token_hash: &str,
    expires_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO password_resets (user_no, token_hash, created_at, expires_at)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(user_no)
    .bind(token_hash)
    .bind(kst::to_db(kst::now()))
    .bind(expires_at)
    .execute(pool)
    .await
    .context("Failed to insert password reset")?;

    Ok(result.last_insert_rowid())
}

pub async fn get_password_reset(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<PasswordReset>> {
    sqlx::query_as("SELECT * FROM password_resets WHERE token_hash = ?")
        .bind(token_hash)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch password reset")
}

pub async fn delete_password_reset(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM password_resets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete password reset")?;

    Ok(result.rows_affected())
}
