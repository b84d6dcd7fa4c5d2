//! Board store queries: the transactional create/update flow's building
//! blocks, the filter/rank query assembly, the deadline sweep and the bulk
//! hit-count write-back.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool};

use super::models::{Board, BoardDetail, BoardPhoto, BoardSummary, NewBoard};
use crate::kst;

/// Direction for the default identifier ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Deadline dimension of a filter request.
///
/// `Within(days)` selects boards closing inside the next N days;
/// `Open` selects boards with no deadline at all. The two are mutually
/// exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineFilter {
    Within(i64),
    Open,
}

/// Optional predicate set for the board listing query. Omitted fields impose
/// no constraint; provided fields combine conjunctively.
#[derive(Debug, Clone, Default)]
pub struct BoardFilter {
    pub category_no: Option<i64>,
    pub area_no: Option<i64>,
    pub title: Option<String>,
    pub max_price: Option<i64>,
    pub min_price: Option<i64>,
    pub target: Option<bool>,
    pub free: bool,
    pub deadline: Option<DeadlineFilter>,
    pub popular: bool,
    pub sort: SortOrder,
}

/// Shared SELECT head for listing rows: board fields joined with area name,
/// owner nickname, thumbnail, aggregated like count and days remaining.
/// Aggregation (GROUP BY) keeps the like join from multiplying rows.
const SUMMARY_SELECT: &str = r"
    SELECT
        b.no,
        b.title,
        b.is_deadline,
        b.price,
        b.target,
        a.no AS area_no,
        a.name AS area_name,
        c.no AS category_no,
        c.name AS category_name,
        u.nickname AS user_nickname,
        (SELECT p.photo_url FROM board_photos p
         WHERE p.board_no = b.no ORDER BY p.photo_order LIMIT 1) AS photo_url,
        COUNT(DISTINCT bl.user_no) AS like_count,
        CAST(julianday(date(b.deadline)) - julianday(date(";

const SUMMARY_JOINS: &str = r"
    FROM boards b
    JOIN areas a ON b.area_no = a.no
    JOIN categories c ON b.category_no = c.no
    JOIN users u ON b.user_no = u.no
    LEFT JOIN board_likes bl ON bl.board_no = b.no
    WHERE b.deleted_at IS NULL";

/// Assemble and run the filter/rank listing query as one bounded statement.
pub async fn filter_boards(
    pool: &SqlitePool,
    filter: &BoardFilter,
    now: DateTime<FixedOffset>,
    limit: i64,
    offset: i64,
) -> Result<Vec<BoardSummary>> {
    let now_db = kst::to_db(now);

    let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(SUMMARY_SELECT);
    qb.push_bind(now_db.clone());
    qb.push(")) AS INTEGER) AS days_remaining");
    qb.push(SUMMARY_JOINS);

    if let Some(category_no) = filter.category_no {
        qb.push(" AND b.category_no = ").push_bind(category_no);
    }
    if let Some(area_no) = filter.area_no {
        qb.push(" AND b.area_no = ").push_bind(area_no);
    }
    if let Some(title) = &filter.title {
        qb.push(" AND b.title LIKE ").push_bind(format!("%{title}%"));
    }
    if let Some(max_price) = filter.max_price {
        qb.push(" AND b.price < ").push_bind(max_price);
    }
    if let Some(min_price) = filter.min_price {
        qb.push(" AND b.price >= ").push_bind(min_price);
    }
    if let Some(target) = filter.target {
        qb.push(" AND b.target = ").push_bind(target);
    }
    if filter.free {
        qb.push(" AND b.price = 0");
    }
    match filter.deadline {
        Some(DeadlineFilter::Within(days)) => {
            let end = kst::to_db(kst::days_after(now, days));
            qb.push(" AND b.deadline > ").push_bind(now_db);
            qb.push(" AND b.deadline < ").push_bind(end);
        }
        Some(DeadlineFilter::Open) => {
            qb.push(" AND b.deadline IS NULL");
        }
        None => {}
    }

    qb.push(" GROUP BY b.no");

    if filter.popular {
        qb.push(" ORDER BY b.hit DESC");
    } else {
        qb.push(" ORDER BY b.no ");
        qb.push(filter.sort.as_sql());
    }

    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);

    qb.build_query_as()
        .fetch_all(pool)
        .await
        .context("Failed to run board filter query")
}

/// Title-substring search, newest first.
pub async fn search_boards(
    pool: &SqlitePool,
    title: &str,
    now: DateTime<FixedOffset>,
    limit: i64,
) -> Result<Vec<BoardSummary>> {
    let filter = BoardFilter {
        title: Some(title.to_string()),
        ..BoardFilter::default()
    };

    filter_boards(pool, &filter, now, limit, 0).await
}

/// Which lifecycle slice a hot-board query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HotBoardSelect {
    #[default]
    All,
    Open,
    Closed,
}

/// Hottest boards of the current month by views-per-day, bounded to `limit`.
pub async fn hot_boards(
    pool: &SqlitePool,
    select: HotBoardSelect,
    now: DateTime<FixedOffset>,
    month: Option<&str>,
    limit: i64,
) -> Result<Vec<BoardSummary>> {
    let now_db = kst::to_db(now);

    let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(SUMMARY_SELECT);
    qb.push_bind(now_db.clone());
    qb.push(")) AS INTEGER) AS days_remaining");
    qb.push(SUMMARY_JOINS);

    if let Some(month) = month {
        qb.push(" AND strftime('%Y-%m', b.created_at) = ").push_bind(month.to_string());
    }
    match select {
        HotBoardSelect::All => {}
        HotBoardSelect::Open => {
            qb.push(" AND b.is_deadline = 0");
        }
        HotBoardSelect::Closed => {
            qb.push(" AND b.is_deadline = 1");
        }
    }

    qb.push(" GROUP BY b.no");
    // Views-per-day, with a one-day floor so same-day boards do not divide
    // by zero.
    qb.push(" ORDER BY b.hit / MAX(julianday(");
    qb.push_bind(now_db);
    qb.push(") - julianday(b.created_at), 1.0) DESC");
    qb.push(" LIMIT ").push_bind(limit);

    qb.build_query_as()
        .fetch_all(pool)
        .await
        .context("Failed to run hot boards query")
}

/// A user's own boards for the profile page, filtered by target flag.
pub async fn boards_by_user(
    pool: &SqlitePool,
    user_no: i64,
    target: bool,
    now: DateTime<FixedOffset>,
    take: i64,
    page: i64,
) -> Result<Vec<BoardSummary>> {
    let offset = take * (page - 1).max(0);
    let now_db = kst::to_db(now);

    let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(SUMMARY_SELECT);
    qb.push_bind(now_db);
    qb.push(")) AS INTEGER) AS days_remaining");
    qb.push(SUMMARY_JOINS);
    qb.push(" AND b.user_no = ").push_bind(user_no);
    qb.push(" AND b.target = ").push_bind(target);
    qb.push(" GROUP BY b.no ORDER BY b.no DESC");
    qb.push(" LIMIT ").push_bind(take);
    qb.push(" OFFSET ").push_bind(offset);

    qb.build_query_as()
        .fetch_all(pool)
        .await
        .context("Failed to list user boards")
}

// ========== Single-board reads ==========

pub async fn get_board(pool: &SqlitePool, no: i64) -> Result<Option<Board>> {
    sqlx::query_as("SELECT * FROM boards WHERE no = ? AND deleted_at IS NULL")
        .bind(no)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch board")
}

/// Denormalized single-board view: area/category/owner (with school and
/// major names) plus the aggregated like count.
pub async fn read_board_detail(
    pool: &SqlitePool,
    no: i64,
    now: DateTime<FixedOffset>,
) -> Result<Option<BoardDetail>> {
    sqlx::query_as(
        r"
        SELECT
            b.no,
            b.title,
            b.description,
            b.summary,
            b.price,
            b.target,
            b.is_deadline,
            b.hit,
            b.deadline,
            b.created_at,
            CAST(julianday(date(b.deadline)) - julianday(date(?)) AS INTEGER) AS days_remaining,
            a.no AS area_no,
            a.name AS area_name,
            c.no AS category_no,
            c.name AS category_name,
            u.no AS user_no,
            u.nickname AS user_nickname,
            u.photo_url AS user_photo_url,
            s.name AS user_school,
            m.name AS user_major,
            COUNT(DISTINCT bl.user_no) AS like_count
        FROM boards b
        JOIN areas a ON b.area_no = a.no
        JOIN categories c ON b.category_no = c.no
        JOIN users u ON b.user_no = u.no
        LEFT JOIN schools s ON u.school_no = s.no
        LEFT JOIN majors m ON u.major_no = m.no
        LEFT JOIN board_likes bl ON bl.board_no = b.no
        WHERE b.no = ? AND b.deleted_at IS NULL
        GROUP BY b.no
        ",
    )
    .bind(kst::to_db(now))
    .bind(no)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch board detail")
}

pub async fn list_board_photos(pool: &SqlitePool, board_no: i64) -> Result<Vec<BoardPhoto>> {
    sqlx::query_as("SELECT * FROM board_photos WHERE board_no = ? ORDER BY photo_order")
        .bind(board_no)
        .fetch_all(pool)
        .await
        .context("Failed to list board photos")
}

// ========== Transactional write steps ==========

/// Insert the board row inside an open transaction, returning its number.
pub async fn insert_board(
    conn: &mut SqliteConnection,
    board: &NewBoard,
    deadline: Option<&str>,
    created_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO boards (title, description, summary, price, target,
                            user_no, category_no, area_no, deadline, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(&board.title)
    .bind(&board.description)
    .bind(&board.summary)
    .bind(board.price)
    .bind(board.target)
    .bind(board.user_no)
    .bind(board.category_no)
    .bind(board.area_no)
    .bind(deadline)
    .bind(created_at)
    .execute(conn)
    .await
    .context("Failed to insert board")?;

    Ok(result.last_insert_rowid())
}

/// Insert an ordered photo set for a board. Returns rows written; the caller
/// aborts the transaction when this differs from the requested count.
pub async fn insert_board_photos(
    conn: &mut SqliteConnection,
    board_no: i64,
    photo_urls: &[String],
) -> Result<u64> {
    let mut written = 0;

    for (index, url) in photo_urls.iter().enumerate() {
        let result = sqlx::query(
            "INSERT INTO board_photos (board_no, photo_url, photo_order) VALUES (?, ?, ?)",
        )
        .bind(board_no)
        .bind(url)
        .bind(index as i64 + 1)
        .execute(&mut *conn)
        .await
        .context("Failed to insert board photo")?;

        written += result.rows_affected();
    }

    Ok(written)
}

pub async fn delete_board_photos(conn: &mut SqliteConnection, board_no: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM board_photos WHERE board_no = ?")
        .bind(board_no)
        .execute(conn)
        .await
        .context("Failed to delete board photos")?;

    Ok(result.rows_affected())
}

/// Relation write of the create flow: bump the owning category's usage
/// counter, which feeds the hot-categories ranking.
pub async fn bump_category_hit(conn: &mut SqliteConnection, category_no: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE categories SET hit = hit + 1 WHERE no = ?")
        .bind(category_no)
        .execute(conn)
        .await
        .context("Failed to bump category hit")?;

    Ok(result.rows_affected())
}

/// Content fields of a board-row update, already resolved by the service
/// layer. Deadline is always written: the explicit-null case clears it.
#[derive(Debug, Clone, Default)]
pub struct BoardRowUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub price: Option<i64>,
    pub target: Option<bool>,
    pub category_no: Option<i64>,
    pub area_no: Option<i64>,
    pub deadline: Option<String>,
}

/// Partial update of the board row inside an open transaction.
pub async fn update_board_row(
    conn: &mut SqliteConnection,
    no: i64,
    update: &BoardRowUpdate,
) -> Result<u64> {
    let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE boards SET deadline = ");
    qb.push_bind(update.deadline.clone());

    if let Some(title) = &update.title {
        qb.push(", title = ").push_bind(title);
    }
    if let Some(description) = &update.description {
        qb.push(", description = ").push_bind(description);
    }
    if let Some(summary) = &update.summary {
        qb.push(", summary = ").push_bind(summary);
    }
    if let Some(price) = update.price {
        qb.push(", price = ").push_bind(price);
    }
    if let Some(target) = update.target {
        qb.push(", target = ").push_bind(target);
    }
    if let Some(category_no) = update.category_no {
        qb.push(", category_no = ").push_bind(category_no);
    }
    if let Some(area_no) = update.area_no {
        qb.push(", area_no = ").push_bind(area_no);
    }

    qb.push(" WHERE no = ").push_bind(no);
    qb.push(" AND deleted_at IS NULL");

    let result = qb
        .build()
        .execute(conn)
        .await
        .context("Failed to update board")?;

    Ok(result.rows_affected())
}

// ========== Lifecycle writes ==========

pub async fn set_board_closed(pool: &SqlitePool, no: i64, closed: bool) -> Result<u64> {
    let result = sqlx::query("UPDATE boards SET is_deadline = ? WHERE no = ? AND deleted_at IS NULL")
        .bind(closed)
        .bind(no)
        .execute(pool)
        .await
        .context("Failed to set board closed flag")?;

    Ok(result.rows_affected())
}

pub async fn soft_delete_board(pool: &SqlitePool, no: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE boards SET deleted_at = ? WHERE no = ? AND deleted_at IS NULL")
        .bind(kst::to_db(kst::now()))
        .bind(no)
        .execute(pool)
        .await
        .context("Failed to soft-delete board")?;

    Ok(result.rows_affected())
}

/// Close every board whose deadline has passed. Idempotent; returns the
/// number of rows flipped.
pub async fn close_expired(pool: &SqlitePool, now: DateTime<FixedOffset>) -> Result<u64> {
    let result = sqlx::query(
        r"
        UPDATE boards SET is_deadline = 1
        WHERE deadline IS NOT NULL
          AND deadline <= ?
          AND is_deadline = 0
          AND deleted_at IS NULL
        ",
    )
    .bind(kst::to_db(now))
    .execute(pool)
    .await
    .context("Failed to close expired boards")?;

    Ok(result.rows_affected())
}

// ========== Hit-count write-back ==========

/// Apply pending view-count deltas in one bulk conditional update.
///
/// The persisted value stays a floor: `hit = hit + delta` per board, so a
/// delta lost between flushes can only undercount, never corrupt.
pub async fn apply_hit_deltas(pool: &SqlitePool, deltas: &[(i64, i64)]) -> Result<u64> {
    if deltas.is_empty() {
        return Ok(0);
    }

    let mut qb: QueryBuilder<sqlx::Sqlite> =
        QueryBuilder::new("UPDATE boards SET hit = hit + CASE no");

    for (board_no, delta) in deltas {
        qb.push(" WHEN ").push_bind(*board_no);
        qb.push(" THEN ").push_bind(*delta);
    }

    qb.push(" ELSE 0 END WHERE no IN (");
    let mut separated = qb.separated(", ");
    for (board_no, _) in deltas {
        separated.push_bind(*board_no);
    }
    qb.push(")");

    let result = qb
        .build()
        .execute(pool)
        .await
        .context("Failed to apply hit deltas")?;

    Ok(result.rows_affected())
}
