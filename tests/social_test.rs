//! Integration tests for the social aggregates: likes, reviews, comments,
//! letters, specs and reports.

mod support;

use campus_market::boards;
use campus_market::db::{self, NewReview, ReportCheckTable};
use campus_market::kst;
use support::{new_board, photos, seed_lookups, seed_user, setup_db};

#[tokio::test]
async fn test_user_like_round_trip() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let me = seed_user(db.pool(), "a@test.com", "alpha").await;
    let them = seed_user(db.pool(), "b@test.com", "beta").await;

    assert!(!db::user_like_exists(db.pool(), me, them).await.unwrap());

    db::insert_user_like(db.pool(), me, them).await.unwrap();
    assert!(db::user_like_exists(db.pool(), me, them).await.unwrap());

    // Likes are directional.
    assert!(!db::user_like_exists(db.pool(), them, me).await.unwrap());

    let profile = db::get_profile(db.pool(), them).await.unwrap().unwrap();
    assert_eq!(profile.like_count, 1);

    assert_eq!(db::delete_user_like(db.pool(), me, them).await.unwrap(), 1);
    assert_eq!(db::delete_user_like(db.pool(), me, them).await.unwrap(), 0);
}

#[tokio::test]
async fn test_board_like_round_trip() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;
    let fan = seed_user(db.pool(), "b@test.com", "beta").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 0), &photos(1))
        .await
        .unwrap();

    db::insert_board_like(db.pool(), board_no, fan).await.unwrap();
    assert!(db::board_like_exists(db.pool(), board_no, fan).await.unwrap());

    let detail = db::read_board_detail(db.pool(), board_no, kst::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.like_count, 1);

    assert_eq!(db::delete_board_like(db.pool(), board_no, fan).await.unwrap(), 1);
}

#[tokio::test]
async fn test_review_duplicate_detection_and_listing() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let seller = seed_user(db.pool(), "a@test.com", "alpha").await;
    let buyer = seed_user(db.pool(), "b@test.com", "beta").await;

    let board_no = boards::create_board(db.pool(), &new_board(seller, "Wanted", 0), &photos(1))
        .await
        .unwrap();

    let review = NewReview {
        board_no,
        reviewer_no: buyer,
        target_user_no: seller,
        description: "Quick and friendly".to_string(),
        rating: 5,
    };
    db::insert_review(db.pool(), &review).await.unwrap();

    assert!(db::review_exists(db.pool(), board_no, buyer).await.unwrap());
    assert!(!db::review_exists(db.pool(), board_no, seller).await.unwrap());

    let reviews = db::list_reviews_for_user(db.pool(), seller, 10, 1).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].reviewer_nickname, "beta");
    assert_eq!(reviews[0].board_title, "Wanted");

    assert_eq!(db::count_reviews_for_user(db.pool(), seller).await.unwrap(), 1);
    assert_eq!(
        db::average_rating_for_user(db.pool(), seller).await.unwrap(),
        Some(5.0)
    );
    assert_eq!(db::average_rating_for_user(db.pool(), buyer).await.unwrap(), None);
}

#[tokio::test]
async fn test_comments_thread_with_replies() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;
    let commenter = seed_user(db.pool(), "b@test.com", "beta").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 0), &photos(1))
        .await
        .unwrap();

    let comment_no = db::insert_comment(db.pool(), board_no, commenter, "Still available?")
        .await
        .unwrap();
    db::insert_reply(db.pool(), comment_no, owner, "It is!").await.unwrap();

    let comments = db::list_comments_for_board(db.pool(), board_no).await.unwrap();
    assert_eq!(comments.len(), 1);

    let replies = db::list_replies(db.pool(), comment_no).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content, "It is!");

    db::update_comment(db.pool(), comment_no, "Is it still available?")
        .await
        .unwrap();
    let comment = db::get_comment(db.pool(), comment_no).await.unwrap().unwrap();
    assert_eq!(comment.content, "Is it still available?");

    // Deleting the comment cascades to its replies.
    db::delete_comment(db.pool(), comment_no).await.unwrap();
    assert!(db::list_replies(db.pool(), comment_no).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_letters_conversation_and_read_flags() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let me = seed_user(db.pool(), "a@test.com", "alpha").await;
    let them = seed_user(db.pool(), "b@test.com", "beta").await;
    let other = seed_user(db.pool(), "c@test.com", "gamma").await;

    db::insert_letter(db.pool(), me, them, "Hello").await.unwrap();
    db::insert_letter(db.pool(), them, me, "Hi back").await.unwrap();
    db::insert_letter(db.pool(), other, me, "Unrelated").await.unwrap();

    let conversation = db::list_letters_between(db.pool(), me, them).await.unwrap();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[0].description, "Hello");

    // Reading the conversation marks only their letters to me as read.
    assert_eq!(db::mark_letters_read(db.pool(), me, them).await.unwrap(), 1);
    assert_eq!(db::mark_letters_read(db.pool(), me, them).await.unwrap(), 0);

    let conversation = db::list_letters_between(db.pool(), me, them).await.unwrap();
    assert!(conversation[1].reading_flag);
    assert!(!conversation[0].reading_flag);
}

#[tokio::test]
async fn test_spec_create_with_photos_is_transactional() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let urls = vec![
        "photos/specs/cert.jpg".to_string(),
        "photos/specs/award.jpg".to_string(),
    ];

    let mut tx = db.pool().begin().await.unwrap();
    let spec_no = db::insert_spec(&mut *tx, user_no, "Barista certificate", "Level 2")
        .await
        .unwrap();
    let written = db::insert_spec_photos(&mut *tx, spec_no, &urls).await.unwrap();
    assert_eq!(written, urls.len() as u64);
    tx.commit().await.unwrap();

    let specs = db::list_specs_for_user(db.pool(), user_no, 10, 1).await.unwrap();
    assert_eq!(specs.len(), 1);

    let photos = db::list_spec_photos(db.pool(), spec_no).await.unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].photo_order, 1);

    db::soft_delete_spec(db.pool(), spec_no).await.unwrap();
    assert!(db::get_spec(db.pool(), spec_no).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reports_attach_checks_per_target_kind() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let owner = seed_user(db.pool(), "a@test.com", "alpha").await;
    let reporter = seed_user(db.pool(), "b@test.com", "beta").await;

    let board_no = boards::create_board(db.pool(), &new_board(owner, "Wanted", 0), &photos(1))
        .await
        .unwrap();

    // Checkboxes are seeded by migration.
    let checkboxes = db::list_report_checkboxes(db.pool()).await.unwrap();
    assert!(checkboxes.len() >= 3);

    let mut tx = db.pool().begin().await.unwrap();
    let board_report = db::insert_board_report(&mut *tx, board_no, reporter, "Spam listing")
        .await
        .unwrap();
    db::insert_board_report_check(&mut *tx, board_report, 1).await.unwrap();
    db::insert_board_report_check(&mut *tx, board_report, 3).await.unwrap();
    tx.commit().await.unwrap();

    let report = db::get_board_report(db.pool(), board_report).await.unwrap().unwrap();
    assert_eq!(report.board_no, board_no);
    assert_eq!(report.reporter_no, reporter);

    let checks = db::list_report_checks(db.pool(), ReportCheckTable::Board, board_report)
        .await
        .unwrap();
    assert_eq!(checks, vec![1, 3]);

    let mut tx = db.pool().begin().await.unwrap();
    let user_report = db::insert_user_report(&mut *tx, owner, reporter, "Abusive messages")
        .await
        .unwrap();
    db::insert_user_report_check(&mut *tx, user_report, 2).await.unwrap();
    tx.commit().await.unwrap();

    let checks = db::list_report_checks(db.pool(), ReportCheckTable::User, user_report)
        .await
        .unwrap();
    assert_eq!(checks, vec![2]);
}

#[tokio::test]
async fn test_faq_lifecycle_and_search() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let manager = seed_user(db.pool(), "m@test.com", "manager").await;

    let mut tx = db.pool().begin().await.unwrap();
    let faq_no = db::insert_faq(&mut *tx, "How do I close a board?", "Use the close button.", manager)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let faqs = db::list_faqs(db.pool()).await.unwrap();
    assert_eq!(faqs.len(), 1);
    assert!(faqs[0].modifier_no.is_none());

    let mut tx = db.pool().begin().await.unwrap();
    let affected = db::update_faq(&mut *tx, faq_no, None, Some("Open the board page."), manager)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(affected, 1);

    let faqs = db::list_faqs(db.pool()).await.unwrap();
    assert_eq!(faqs[0].answer, "Open the board page.");
    assert_eq!(faqs[0].question, "How do I close a board?");
    assert_eq!(faqs[0].modifier_no, Some(manager));

    let hits = db::search_faqs(db.pool(), "close").await.unwrap();
    assert_eq!(hits.len(), 1);
    let misses = db::search_faqs(db.pool(), "refund").await.unwrap();
    assert!(misses.is_empty());

    assert_eq!(db::delete_faq(db.pool(), faq_no).await.unwrap(), 1);
}

#[tokio::test]
async fn test_hot_categories_rank_by_usage() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    // Each create bumps the owning category's counter.
    boards::create_board(db.pool(), &new_board(user_no, "One", 0), &photos(1))
        .await
        .unwrap();
    boards::create_board(db.pool(), &new_board(user_no, "Two", 0), &photos(1))
        .await
        .unwrap();

    let hot = db::hot_categories(db.pool(), 3).await.unwrap();
    assert_eq!(hot.len(), 1);
    assert_eq!(hot[0].no, 2);
    assert_eq!(hot[0].hit, 2);
}
