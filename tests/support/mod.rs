//! Shared fixtures for integration tests: a throwaway database plus seed
//! rows for the lookup tables every aggregate hangs off.

use campus_market::auth::hash_password;
use campus_market::db::{self, Database, NewBoard, NewUser};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub async fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

/// Seed one school, major, area and two categories (1 is the catch-all).
pub async fn seed_lookups(pool: &SqlitePool) {
    for (table, name) in [
        ("schools", "Hanzomon University"),
        ("majors", "Industrial Design"),
        ("areas", "Seoul"),
        ("categories", "All"),
        ("categories", "Design"),
        ("areas", "Busan"),
    ] {
        sqlx::query(&format!("INSERT INTO {table} (name) VALUES (?)"))
            .bind(name)
            .execute(pool)
            .await
            .expect("Failed to seed lookup row");
    }
}

pub async fn seed_user(pool: &SqlitePool, email: &str, nickname: &str) -> i64 {
    let user = NewUser {
        email: email.to_string(),
        nickname: nickname.to_string(),
        name: "Test User".to_string(),
        phone: None,
        photo_url: "default.png".to_string(),
        password_hash: hash_password("market_pw_1").unwrap(),
        school_no: Some(1),
        major_no: Some(1),
    };

    db::insert_user(pool, &user).await.expect("Failed to seed user")
}

pub fn new_board(user_no: i64, title: &str, price: i64) -> NewBoard {
    NewBoard {
        title: title.to_string(),
        description: "A board for testing".to_string(),
        summary: None,
        price,
        target: true,
        user_no,
        category_no: 2,
        area_no: 1,
        deadline_days: Some(7),
    }
}

pub fn photos(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("photos/boards/{i}.jpg")).collect()
}
