//! Board aggregate manager.
//!
//! Business flows for listings: the transactional create/update path, the
//! owner-gated lifecycle operations, and the cache-adjusted read path. The
//! write-back view cache and the deadline sweep live in their own modules.

pub mod closer;
pub mod hit_cache;

pub use hit_cache::HitCache;

use anyhow::{anyhow, Context};
use chrono::DateTime;
use sqlx::SqlitePool;

use crate::db::{self, Board, BoardDetail, BoardPatch, BoardRowUpdate, BoardSummary, NewBoard};
use crate::error::{ensure_owner, AppError, AppResult};
use crate::kst;

/// Sentinel photo key meaning "no custom photo": the client kept the default
/// image, so the stored photo set is left untouched.
pub const DEFAULT_PHOTO: &str = "default.png";

fn board_or_not_found(board: Option<Board>) -> AppResult<Board> {
    board.ok_or_else(|| AppError::NotFound("Board not found".to_string()))
}

async fn validate_category(pool: &SqlitePool, category_no: i64) -> AppResult<()> {
    if db::get_category(pool, category_no).await?.is_none() {
        return Err(AppError::NotFound("Category not found".to_string()));
    }
    Ok(())
}

async fn validate_area(pool: &SqlitePool, area_no: i64) -> AppResult<()> {
    if db::get_area(pool, area_no).await?.is_none() {
        return Err(AppError::NotFound("Area not found".to_string()));
    }
    Ok(())
}

/// Create a board and its dependent rows as one transaction.
///
/// Validates the referenced category and area first, then writes the board
/// row, the ordered photo set (skipped for the default-photo sentinel) and
/// the category usage counter. Any failure rolls the whole unit back.
pub async fn create_board(
    pool: &SqlitePool,
    board: &NewBoard,
    photo_urls: &[String],
) -> AppResult<i64> {
    if photo_urls.is_empty() {
        return Err(AppError::BadRequest(
            "Attach at least one image or the default image".to_string(),
        ));
    }

    validate_category(pool, board.category_no).await?;
    validate_area(pool, board.area_no).await?;

    let created_at = kst::now();
    let deadline = match board.deadline_days {
        Some(days) if days < 1 => {
            return Err(AppError::BadRequest(
                "Deadline must be at least one day out".to_string(),
            ));
        }
        Some(days) => Some(kst::to_db(kst::days_after(created_at, days))),
        None => None,
    };

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let board_no = db::insert_board(
        &mut *tx,
        board,
        deadline.as_deref(),
        &kst::to_db(created_at),
    )
    .await?;

    if photo_urls[0] != DEFAULT_PHOTO {
        let written = db::insert_board_photos(&mut *tx, board_no, photo_urls).await?;
        if written != photo_urls.len() as u64 {
            return Err(AppError::Internal(anyhow!(
                "Board photo write mismatch: requested {}, wrote {written}",
                photo_urls.len()
            )));
        }
    }

    db::bump_category_hit(&mut *tx, board.category_no).await?;

    tx.commit().await.context("Failed to commit board create")?;

    Ok(board_no)
}

/// Update a board's content and photo set as one owner-gated transaction.
///
/// Only supplied fields overwrite stored values; an absent deadline clears
/// the stored one (the deliberate explicit-null exception). Returns the
/// replaced photo keys so the caller can delete them from object storage.
pub async fn update_board(
    pool: &SqlitePool,
    board_no: i64,
    requester_no: i64,
    patch: &BoardPatch,
    photo_urls: &[String],
) -> AppResult<Vec<String>> {
    if photo_urls.is_empty() {
        return Err(AppError::BadRequest(
            "Attach at least one image or the default image".to_string(),
        ));
    }

    let board = board_or_not_found(db::get_board(pool, board_no).await?)?;
    ensure_owner(board.user_no, requester_no, "board")?;

    if let Some(category_no) = patch.category_no {
        validate_category(pool, category_no).await?;
    }
    if let Some(area_no) = patch.area_no {
        validate_area(pool, area_no).await?;
    }

    // The deadline is re-derived from creation time, never taken as an
    // absolute date from the client.
    let deadline = match patch.deadline_days {
        Some(days) => {
            let created_at = DateTime::parse_from_rfc3339(&board.created_at)
                .context("Stored created_at is not RFC 3339")?;
            let end = kst::days_after(created_at, days);
            if end <= kst::now() {
                return Err(AppError::BadRequest(
                    "Please choose a different period".to_string(),
                ));
            }
            Some(kst::to_db(end))
        }
        None => None,
    };

    let update = BoardRowUpdate {
        title: patch.title.clone(),
        description: patch.description.clone(),
        summary: patch.summary.clone(),
        price: patch.price,
        target: patch.target,
        category_no: patch.category_no,
        area_no: patch.area_no,
        deadline,
    };

    let old_photos = db::list_board_photos(pool, board_no).await?;

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let updated = db::update_board_row(&mut *tx, board_no, &update).await?;
    if updated == 0 {
        return Err(AppError::Internal(anyhow!("Board update affected no rows")));
    }

    let replaced = if photo_urls[0] == DEFAULT_PHOTO {
        // Sentinel: keep whatever photos the board already has.
        Vec::new()
    } else {
        if !old_photos.is_empty() {
            db::delete_board_photos(&mut *tx, board_no).await?;
        }

        let written = db::insert_board_photos(&mut *tx, board_no, photo_urls).await?;
        if written != photo_urls.len() as u64 {
            return Err(AppError::Internal(anyhow!(
                "Board photo write mismatch: requested {}, wrote {written}",
                photo_urls.len()
            )));
        }

        old_photos.into_iter().map(|p| p.photo_url).collect()
    };

    tx.commit().await.context("Failed to commit board update")?;

    Ok(replaced)
}

/// Soft-delete a board (owner only).
pub async fn delete_board(pool: &SqlitePool, board_no: i64, requester_no: i64) -> AppResult<()> {
    let board = board_or_not_found(db::get_board(pool, board_no).await?)?;
    ensure_owner(board.user_no, requester_no, "board")?;

    let affected = db::soft_delete_board(pool, board_no).await?;
    if affected == 0 {
        return Err(AppError::Internal(anyhow!("Board was not deleted")));
    }

    Ok(())
}

/// Close a board ahead of its deadline (owner only).
pub async fn close_board(pool: &SqlitePool, board_no: i64, requester_no: i64) -> AppResult<()> {
    let board = board_or_not_found(db::get_board(pool, board_no).await?)?;
    ensure_owner(board.user_no, requester_no, "board")?;

    if board.is_deadline {
        return Err(AppError::BadRequest(
            "This board is already closed".to_string(),
        ));
    }

    let affected = db::set_board_closed(pool, board_no, true).await?;
    if affected == 0 {
        return Err(AppError::Internal(anyhow!("Board was not closed")));
    }

    Ok(())
}

/// Reopen a closed board (owner only). Permitted only while the deadline has
/// not yet elapsed; boards the sweep closed for good stay closed.
pub async fn cancel_close(pool: &SqlitePool, board_no: i64, requester_no: i64) -> AppResult<()> {
    let board = board_or_not_found(db::get_board(pool, board_no).await?)?;
    ensure_owner(board.user_no, requester_no, "board")?;

    if let Some(deadline) = &board.deadline {
        let deadline = DateTime::parse_from_rfc3339(deadline)
            .context("Stored deadline is not RFC 3339")?;
        if deadline <= kst::now() {
            return Err(AppError::BadRequest(
                "The deadline has already passed".to_string(),
            ));
        }
    }

    if !board.is_deadline {
        return Err(AppError::BadRequest(
            "This board is still active".to_string(),
        ));
    }

    let affected = db::set_board_closed(pool, board_no, false).await?;
    if affected == 0 {
        return Err(AppError::Internal(anyhow!("Board was not reopened")));
    }

    Ok(())
}

/// Read one board for display.
///
/// An authenticated viewer counts as a view: the hit cache is bumped and the
/// returned hit count is the cache-adjusted value. Anonymous reads leave the
/// count untouched.
pub async fn read_board(
    pool: &SqlitePool,
    hits: &HitCache,
    board_no: i64,
    viewer_no: Option<i64>,
) -> AppResult<BoardDetail> {
    let mut detail = db::read_board_detail(pool, board_no, kst::now())
        .await?
        .ok_or_else(|| AppError::NotFound("Board not found".to_string()))?;

    if viewer_no.is_some() {
        detail.hit = hits.record_view(board_no, detail.hit);
    }

    Ok(detail)
}

/// Boards in one category, paginated. Category 1 is the catch-all feed.
pub async fn boards_by_category(
    pool: &SqlitePool,
    category_no: i64,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<BoardSummary>> {
    validate_category(pool, category_no).await?;

    let filter = db::BoardFilter {
        category_no: (category_no != 1).then_some(category_no),
        ..db::BoardFilter::default()
    };

    Ok(db::filter_boards(pool, &filter, kst::now(), limit, offset).await?)
}
