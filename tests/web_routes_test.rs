//! Router-level tests driving the JSON API through tower's oneshot.

mod support;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use campus_market::boards::HitCache;
use campus_market::config::Config;
use campus_market::email::Mailer;
use campus_market::storage::StorageClient;
use campus_market::web::{create_app, AppState, FaqCache};
use serial_test::serial;
use tempfile::TempDir;
use tower::util::ServiceExt;

use support::{seed_lookups, setup_db};

async fn test_app() -> (Router, TempDir) {
    // Dummy credentials: the bucket handle is built eagerly but nothing talks
    // to S3 in these tests.
    std::env::set_var("AWS_ACCESS_KEY_ID", "test-access-key");
    std::env::set_var("AWS_SECRET_ACCESS_KEY", "test-secret-key");

    let (db, temp_dir) = setup_db().await;
    seed_lookups(db.pool()).await;

    let config = Config {
        database_path: PathBuf::from(":memory:"),
        web_host: "127.0.0.1".to_string(),
        web_port: 0,
        hit_flush_interval: Duration::from_secs(60),
        deadline_sweep_interval: Duration::from_secs(60),
        s3_bucket: "test-bucket".to_string(),
        s3_region: "ap-northeast-2".to_string(),
        s3_endpoint: None,
        s3_prefix: "photos/".to_string(),
        mail_relay_url: "http://127.0.0.1:9/send".to_string(),
        mail_from: "no-reply@campus.market".to_string(),
        mail_api_key: None,
        mail_question_inbox: "support@campus.market".to_string(),
        session_ttl: Duration::from_secs(3600),
        password_reset_ttl: Duration::from_secs(3600),
        faq_cache_ttl: Duration::from_secs(300),
    };

    let storage = StorageClient::new(&config).await.unwrap();
    let mailer = Mailer::new(&config);

    let state = AppState {
        db,
        config: Arc::new(config),
        storage,
        mailer,
        hits: Arc::new(HitCache::new()),
        faqs: Arc::new(FaqCache::default()),
    };

    (create_app(state), temp_dir)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn signup_and_signin(app: &Router, email: &str, nickname: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            serde_json::json!({
                "email": email,
                "nickname": nickname,
                "name": "Test User",
                "password": "market_pw_1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signin",
            serde_json::json!({ "email": email, "password": "market_pw_1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
#[serial]
async fn test_healthz() {
    let (app, _temp_dir) = test_app().await;

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_signup_duplicate_email_conflicts() {
    let (app, _temp_dir) = test_app().await;

    signup_and_signin(&app, "a@test.com", "alpha").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            serde_json::json!({
                "email": "a@test.com",
                "nickname": "other",
                "name": "Other",
                "password": "market_pw_1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["status"], 409);
}

#[tokio::test]
#[serial]
async fn test_board_create_requires_login() {
    let (app, _temp_dir) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/boards",
            serde_json::json!({
                "title": "Wanted",
                "description": "Help me move",
                "price": 0,
                "target": true,
                "category_no": 2,
                "area_no": 1,
                "photo_urls": ["default.png"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_board_create_read_and_view_counting() {
    let (app, _temp_dir) = test_app().await;
    let cookie = signup_and_signin(&app, "a@test.com", "alpha").await;

    let mut request = json_request(
        "POST",
        "/boards",
        serde_json::json!({
            "title": "Guitar lessons",
            "description": "One hour, beginner friendly",
            "price": 15000,
            "target": true,
            "category_no": 2,
            "area_no": 1,
            "deadline": 7,
            "photo_urls": ["default.png"],
        }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let board_no = body["response"]["board_no"].as_i64().unwrap();

    // Anonymous read: no view recorded.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/boards/{board_no}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["response"]["authorization"], false);
    assert_eq!(body["response"]["board"]["hit"], 0);

    // Authenticated reads bump the cache-adjusted count.
    for expected in 1..=2 {
        let mut request = Request::get(format!("/boards/{board_no}"))
            .body(Body::empty())
            .unwrap();
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());

        let response = app.clone().oneshot(request).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["response"]["authorization"], true);
        assert_eq!(body["response"]["board"]["hit"], expected);
    }
}

#[tokio::test]
#[serial]
async fn test_update_by_non_owner_is_unauthorized() {
    let (app, _temp_dir) = test_app().await;
    let owner_cookie = signup_and_signin(&app, "a@test.com", "alpha").await;
    let intruder_cookie = signup_and_signin(&app, "b@test.com", "beta").await;

    let mut request = json_request(
        "POST",
        "/boards",
        serde_json::json!({
            "title": "Wanted",
            "description": "Help me move",
            "price": 0,
            "target": true,
            "category_no": 2,
            "area_no": 1,
            "photo_urls": ["default.png"],
        }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, owner_cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;
    let board_no = body["response"]["board_no"].as_i64().unwrap();

    let mut request = json_request(
        "PATCH",
        &format!("/boards/{board_no}"),
        serde_json::json!({
            "title": "Hijacked",
            "photo_urls": ["default.png"],
        }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, intruder_cookie.parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_report_target_kinds_dispatch() {
    let (app, _temp_dir) = test_app().await;
    let cookie = signup_and_signin(&app, "a@test.com", "alpha").await;
    let _other = signup_and_signin(&app, "b@test.com", "beta").await;

    let mut request = json_request(
        "POST",
        "/reports",
        serde_json::json!({
            "target": { "kind": "user", "user_no": 2 },
            "description": "Abusive messages",
            "checks": [1, 2, 2],
        }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let report_no = body["response"]["report_no"].as_i64().unwrap();

    let response = app
        .oneshot(
            Request::get(format!("/reports/user/{report_no}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // Duplicate checkbox ids collapsed.
    assert_eq!(body["response"]["checks"], serde_json::json!([1, 2]));
}
