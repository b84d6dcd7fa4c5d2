//! Integration tests for the transactional create/update flow and the
//! owner-gated lifecycle operations.

mod support;

use campus_market::boards::{self, DEFAULT_PHOTO};
use campus_market::db::{self, BoardPatch};
use campus_market::error::AppError;
use campus_market::kst;
use support::{new_board, photos, seed_lookups, seed_user, setup_db};

#[tokio::test]
async fn test_create_board_writes_board_and_photos() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let board_no = boards::create_board(db.pool(), &new_board(user_no, "Wanted", 10_000), &photos(3))
        .await
        .unwrap();

    let board = db::get_board(db.pool(), board_no).await.unwrap().unwrap();
    assert_eq!(board.title, "Wanted");
    assert_eq!(board.price, 10_000);
    assert!(board.deadline.is_some());
    assert!(!board.is_deadline);

    let stored = db::list_board_photos(db.pool(), board_no).await.unwrap();
    assert_eq!(stored.len(), 3);
    let orders: Vec<i64> = stored.iter().map(|p| p.photo_order).collect();
    assert_eq!(orders, vec![1, 2, 3]);

    // The relation write bumped the category usage counter.
    let category = db::get_category(db.pool(), 2).await.unwrap().unwrap();
    assert_eq!(category.hit, 1);
}

#[tokio::test]
async fn test_create_board_missing_references_fail_before_write() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let mut bad_category = new_board(user_no, "Wanted", 0);
    bad_category.category_no = 99;
    let err = boards::create_board(db.pool(), &bad_category, &photos(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let mut bad_area = new_board(user_no, "Wanted", 0);
    bad_area.area_no = 99;
    let err = boards::create_board(db.pool(), &bad_area, &photos(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM boards")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn test_create_board_requires_photo_payload() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let err = boards::create_board(db.pool(), &new_board(user_no, "Wanted", 0), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_create_board_default_photo_sentinel_writes_no_photo_rows() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let board_no = boards::create_board(
        db.pool(),
        &new_board(user_no, "Wanted", 0),
        &[DEFAULT_PHOTO.to_string()],
    )
    .await
    .unwrap();

    let stored = db::list_board_photos(db.pool(), board_no).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_uncommitted_transaction_persists_nothing() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    {
        let mut tx = db.pool().begin().await.unwrap();
        let board_no = db::insert_board(
            &mut *tx,
            &new_board(user_no, "Doomed", 0),
            None,
            &kst::to_db(kst::now()),
        )
        .await
        .unwrap();
        db::insert_board_photos(&mut *tx, board_no, &photos(3)).await.unwrap();
        // Dropped without commit: the whole unit must vanish.
    }

    let boards_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM boards")
        .fetch_one(db.pool())
        .await
        .unwrap();
    let photos_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM board_photos")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(boards_count.0, 0);
    assert_eq!(photos_count.0, 0);
}

#[tokio::test]
async fn test_update_by_non_owner_is_rejected_and_unchanged() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;
    let intruder = seed_user(db.pool(), "b@test.com", "beta").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 500), &photos(1))
        .await
        .unwrap();

    let patch = BoardPatch {
        title: Some("Hijacked".to_string()),
        ..BoardPatch::default()
    };
    let err = boards::update_board(db.pool(), board_no, intruder, &patch, &photos(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let board = db::get_board(db.pool(), board_no).await.unwrap().unwrap();
    assert_eq!(board.title, "Wanted");
    assert_eq!(board.price, 500);
}

#[tokio::test]
async fn test_partial_update_preserves_omitted_fields_and_clears_deadline() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 500), &photos(2))
        .await
        .unwrap();

    // Only the price is supplied; the deadline is absent, which clears it.
    let patch = BoardPatch {
        price: Some(900),
        ..BoardPatch::default()
    };
    let replaced =
        boards::update_board(db.pool(), board_no, owner, &patch, &[DEFAULT_PHOTO.to_string()])
            .await
            .unwrap();
    assert!(replaced.is_empty());

    let board = db::get_board(db.pool(), board_no).await.unwrap().unwrap();
    assert_eq!(board.title, "Wanted");
    assert_eq!(board.price, 900);
    assert!(board.deadline.is_none());

    // The sentinel left the photo set alone.
    let stored = db::list_board_photos(db.pool(), board_no).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_update_replaces_photo_set_and_returns_old_keys() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 0), &photos(2))
        .await
        .unwrap();

    let fresh = vec!["photos/boards/new.jpg".to_string()];
    let replaced = boards::update_board(db.pool(), board_no, owner, &BoardPatch::default(), &fresh)
        .await
        .unwrap();

    assert_eq!(replaced, photos(2));

    let stored = db::list_board_photos(db.pool(), board_no).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].photo_url, "photos/boards/new.jpg");
    assert_eq!(stored[0].photo_order, 1);
}

#[tokio::test]
async fn test_update_rejects_elapsed_deadline_window() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 0), &photos(1))
        .await
        .unwrap();

    // Re-derived from creation time, zero days is already in the past.
    let patch = BoardPatch {
        deadline_days: Some(0),
        ..BoardPatch::default()
    };
    let err = boards::update_board(db.pool(), board_no, owner, &patch, &[DEFAULT_PHOTO.to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_close_and_cancel_close_rules() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;
    let stranger = seed_user(db.pool(), "b@test.com", "beta").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 0), &photos(1))
        .await
        .unwrap();

    // Only the owner may close.
    let err = boards::close_board(db.pool(), board_no, stranger).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    boards::close_board(db.pool(), board_no, owner).await.unwrap();
    assert!(db::get_board(db.pool(), board_no).await.unwrap().unwrap().is_deadline);

    // Closing twice is a client error.
    let err = boards::close_board(db.pool(), board_no, owner).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Deadline still in the future: reopening is allowed.
    boards::cancel_close(db.pool(), board_no, owner).await.unwrap();
    assert!(!db::get_board(db.pool(), board_no).await.unwrap().unwrap().is_deadline);

    // Reopening an active board is a client error.
    let err = boards::cancel_close(db.pool(), board_no, owner).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_cancel_close_fails_once_deadline_elapsed() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 0), &photos(1))
        .await
        .unwrap();

    // Force the stored deadline into the past and mark the board closed, as
    // the sweep would have.
    let past = kst::to_db(kst::days_after(kst::now(), -1));
    sqlx::query("UPDATE boards SET deadline = ?, is_deadline = 1 WHERE no = ?")
        .bind(&past)
        .bind(board_no)
        .execute(db.pool())
        .await
        .unwrap();

    let err = boards::cancel_close(db.pool(), board_no, owner).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_cancel_close_with_null_deadline_succeeds() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;

    let mut board = new_board(owner, "Open ended", 0);
    board.deadline_days = None;
    let board_no = boards::create_board(db.pool(), &board, &photos(1)).await.unwrap();

    boards::close_board(db.pool(), board_no, owner).await.unwrap();
    boards::cancel_close(db.pool(), board_no, owner).await.unwrap();

    assert!(!db::get_board(db.pool(), board_no).await.unwrap().unwrap().is_deadline);
}

#[tokio::test]
async fn test_soft_delete_hides_board_from_reads() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 0), &photos(1))
        .await
        .unwrap();

    boards::delete_board(db.pool(), board_no, owner).await.unwrap();

    assert!(db::get_board(db.pool(), board_no).await.unwrap().is_none());

    // The tombstoned row itself is retained.
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM boards WHERE deleted_at IS NOT NULL")
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(count.0, 1);
}
