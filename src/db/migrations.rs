use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

/// Run all pending migrations.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    create_migration_table(pool).await?;
    let current_version = get_schema_version(pool).await?;

    if current_version < 1 {
        debug!("Running migration v1");
        run_migration_v1(pool).await?;
        set_schema_version(pool, 1).await?;
    }

    if current_version < 2 {
        debug!("Running migration v2");
        run_migration_v2(pool).await?;
        set_schema_version(pool, 2).await?;
    }

    if current_version < 3 {
        debug!("Running migration v3");
        run_migration_v3(pool).await?;
        set_schema_version(pool, 3).await?;
    }

    Ok(())
}

async fn create_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS _schema_version (
            version INTEGER PRIMARY KEY
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create schema version table")?;

    Ok(())
}

async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT version FROM _schema_version LIMIT 1")
        .fetch_optional(pool)
        .await
        .context("Failed to get schema version")?;

    Ok(row.map_or(0, |(v,)| v))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("DELETE FROM _schema_version")
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO _schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

async fn run_migration_v1(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v1: creating initial schema");

    // Lookup tables
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS schools (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create schools table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS majors (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create majors table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS areas (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create areas table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS categories (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            hit INTEGER NOT NULL DEFAULT 0
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create categories table")?;

    // Users and sessions
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS users (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            nickname TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            phone TEXT,
            photo_url TEXT NOT NULL DEFAULT 'default.png',
            password_hash TEXT NOT NULL,
            school_no INTEGER REFERENCES schools(no),
            major_no INTEGER REFERENCES majors(no),
            manager INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            deleted_at TEXT
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_no INTEGER NOT NULL REFERENCES users(no) ON DELETE CASCADE,
            token TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create sessions table")?;

    // Board aggregate
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS boards (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            summary TEXT,
            price INTEGER NOT NULL DEFAULT 0 CHECK (price >= 0),
            target INTEGER NOT NULL DEFAULT 0,
            is_deadline INTEGER NOT NULL DEFAULT 0,
            hit INTEGER NOT NULL DEFAULT 0,
            user_no INTEGER NOT NULL REFERENCES users(no),
            category_no INTEGER NOT NULL REFERENCES categories(no),
            area_no INTEGER NOT NULL REFERENCES areas(no),
            deadline TEXT,
            created_at TEXT NOT NULL,
            deleted_at TEXT
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create boards table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS board_photos (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            board_no INTEGER NOT NULL REFERENCES boards(no) ON DELETE CASCADE,
            photo_url TEXT NOT NULL,
            photo_order INTEGER NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create board_photos table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS board_likes (
            board_no INTEGER NOT NULL REFERENCES boards(no) ON DELETE CASCADE,
            user_no INTEGER NOT NULL REFERENCES users(no) ON DELETE CASCADE,
            UNIQUE (board_no, user_no)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create board_likes table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS user_likes (
            liked_me_no INTEGER NOT NULL REFERENCES users(no) ON DELETE CASCADE,
            liked_user_no INTEGER NOT NULL REFERENCES users(no) ON DELETE CASCADE,
            UNIQUE (liked_me_no, liked_user_no)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create user_likes table")?;

    // Comments and replies
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS comments (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            board_no INTEGER NOT NULL REFERENCES boards(no) ON DELETE CASCADE,
            user_no INTEGER NOT NULL REFERENCES users(no),
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create comments table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS replies (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            comment_no INTEGER NOT NULL REFERENCES comments(no) ON DELETE CASCADE,
            user_no INTEGER NOT NULL REFERENCES users(no),
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create replies table")?;

    // Reviews
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS reviews (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            board_no INTEGER NOT NULL REFERENCES boards(no),
            reviewer_no INTEGER NOT NULL REFERENCES users(no),
            target_user_no INTEGER NOT NULL REFERENCES users(no),
            description TEXT NOT NULL,
            rating INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (board_no, reviewer_no)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create reviews table")?;

    // Reports
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS report_checkboxes (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create report_checkboxes table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS reported_boards (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            board_no INTEGER NOT NULL REFERENCES boards(no),
            reporter_no INTEGER NOT NULL REFERENCES users(no),
            description TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create reported_boards table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS reported_users (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            user_no INTEGER NOT NULL REFERENCES users(no),
            reporter_no INTEGER NOT NULL REFERENCES users(no),
            description TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create reported_users table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS board_report_checks (
            report_no INTEGER NOT NULL REFERENCES reported_boards(no) ON DELETE CASCADE,
            checkbox_no INTEGER NOT NULL REFERENCES report_checkboxes(no),
            UNIQUE (report_no, checkbox_no)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create board_report_checks table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS user_report_checks (
            report_no INTEGER NOT NULL REFERENCES reported_users(no) ON DELETE CASCADE,
            checkbox_no INTEGER NOT NULL REFERENCES report_checkboxes(no),
            UNIQUE (report_no, checkbox_no)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create user_report_checks table")?;

    // FAQs
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS faqs (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            manager_no INTEGER NOT NULL REFERENCES users(no),
            modifier_no INTEGER REFERENCES users(no),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create faqs table")?;

    // Letters
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS letters (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_no INTEGER NOT NULL REFERENCES users(no),
            receiver_no INTEGER NOT NULL REFERENCES users(no),
            description TEXT NOT NULL,
            reading_flag INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create letters table")?;

    // Specs (user portfolio entries)
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS specs (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            user_no INTEGER NOT NULL REFERENCES users(no),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL,
            deleted_at TEXT
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create specs table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS spec_photos (
            no INTEGER PRIMARY KEY AUTOINCREMENT,
            spec_no INTEGER NOT NULL REFERENCES specs(no) ON DELETE CASCADE,
            photo_url TEXT NOT NULL,
            photo_order INTEGER NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create spec_photos table")?;

    // Password reset tokens (stored hashed)
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS password_resets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_no INTEGER NOT NULL REFERENCES users(no) ON DELETE CASCADE,
            token_hash TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create password_resets table")?;

    Ok(())
}

async fn run_migration_v2(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v2: indexes for hot query paths");

    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_boards_deadline ON boards(deadline) WHERE deadline IS NOT NULL",
        "CREATE INDEX IF NOT EXISTS idx_boards_category ON boards(category_no)",
        "CREATE INDEX IF NOT EXISTS idx_boards_area ON boards(area_no)",
        "CREATE INDEX IF NOT EXISTS idx_boards_user ON boards(user_no)",
        "CREATE INDEX IF NOT EXISTS idx_board_photos_board ON board_photos(board_no)",
        "CREATE INDEX IF NOT EXISTS idx_comments_board ON comments(board_no)",
        "CREATE INDEX IF NOT EXISTS idx_replies_comment ON replies(comment_no)",
        "CREATE INDEX IF NOT EXISTS idx_reviews_target ON reviews(target_user_no)",
        "CREATE INDEX IF NOT EXISTS idx_letters_pair ON letters(sender_no, receiver_no)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_token ON sessions(token)",
    ];

    for stmt in statements {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to run: {stmt}"))?;
    }

    Ok(())
}

async fn run_migration_v3(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v3: seeding lookup rows");

    let seeded: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM report_checkboxes")
        .fetch_one(pool)
        .await
        .context("Failed to count report checkboxes")?;

    if seeded.0 > 0 {
        return Ok(());
    }

    for content in [
        "Spam or advertising",
        "Abusive language",
        "Fraud or scam",
        "Inappropriate content",
        "Other",
    ] {
        sqlx::query("INSERT INTO report_checkboxes (content) VALUES (?)")
            .bind(content)
            .execute(pool)
            .await
            .context("Failed to seed report checkboxes")?;
    }

    Ok(())
}
