//! Integration tests for users, sessions and the password-reset flow.

mod support;

use campus_market::auth::{generate_token, hash_password, hash_token, verify_password};
use campus_market::db::{self, ProfilePatch};
use campus_market::kst;
use chrono::Duration;
use support::{seed_lookups, seed_user, setup_db};

#[tokio::test]
async fn test_user_lookup_by_email_and_nickname() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let by_email = db::get_user_by_email(db.pool(), "a@test.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.no, user_no);
    assert!(!by_email.manager);

    let by_nickname = db::get_user_by_nickname(db.pool(), "alpha")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_nickname.no, user_no);

    assert!(db::get_user_by_email(db.pool(), "missing@test.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_password_round_trip() {
    let hash = hash_password("market_pw_1").unwrap();
    assert!(verify_password("market_pw_1", &hash).unwrap());
    assert!(!verify_password("market_pw_2", &hash).unwrap());
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let token = generate_token();
    let expires_at = kst::to_db(kst::now() + Duration::hours(1));
    db::insert_session(db.pool(), user_no, &token, &expires_at)
        .await
        .unwrap();

    let session = db::get_session_by_token(db.pool(), &token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.user_no, user_no);
    assert!(session.expires_at > kst::to_db(kst::now()));

    assert_eq!(db::delete_session(db.pool(), &token).await.unwrap(), 1);
    assert!(db::get_session_by_token(db.pool(), &token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_password_reset_tokens_are_stored_hashed() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let token = generate_token();
    let expires_at = kst::to_db(kst::now() + Duration::hours(1));
    db::insert_password_reset(db.pool(), user_no, &hash_token(&token), &expires_at)
        .await
        .unwrap();

    // The raw token never hits the table.
    assert!(db::get_password_reset(db.pool(), &token).await.unwrap().is_none());

    let reset = db::get_password_reset(db.pool(), &hash_token(&token))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reset.user_no, user_no);

    db::update_user_password(db.pool(), user_no, &hash_password("fresh_pw_9").unwrap())
        .await
        .unwrap();
    let user = db::get_user(db.pool(), user_no).await.unwrap().unwrap();
    assert!(verify_password("fresh_pw_9", &user.password_hash).unwrap());

    assert_eq!(db::delete_password_reset(db.pool(), reset.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_profile_view_and_partial_update() {
    let (db, _temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;
    let user_no = seed_user(db.pool(), "a@test.com", "alpha").await;

    let profile = db::get_profile(db.pool(), user_no).await.unwrap().unwrap();
    assert_eq!(profile.nickname, "alpha");
    assert_eq!(profile.school_name.as_deref(), Some("Hanzomon University"));
    assert_eq!(profile.major_name.as_deref(), Some("Industrial Design"));
    assert_eq!(profile.like_count, 0);

    let patch = ProfilePatch {
        nickname: Some("alpha-two".to_string()),
        phone: Some("010-1234-5678".to_string()),
        ..ProfilePatch::default()
    };
    assert_eq!(db::update_profile(db.pool(), user_no, &patch).await.unwrap(), 1);

    let profile = db::get_profile(db.pool(), user_no).await.unwrap().unwrap();
    assert_eq!(profile.nickname, "alpha-two");
    assert_eq!(profile.phone.as_deref(), Some("010-1234-5678"));
    // Untouched fields survive.
    assert_eq!(profile.school_name.as_deref(), Some("Hanzomon University"));
}
