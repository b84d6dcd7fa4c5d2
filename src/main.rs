use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use campus_market::boards::{closer, hit_cache, HitCache};
use campus_market::config::Config;
use campus_market::db::Database;
use campus_market::email::Mailer;
use campus_market::storage::StorageClient;
use campus_market::web::{self, AppState, FaqCache};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    init_tracing()?;

    info!("Starting campus-market");

    // Load and validate configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        web_port = config.web_port,
        flush_interval = ?config.hit_flush_interval,
        sweep_interval = ?config.deadline_sweep_interval,
        "Configuration loaded"
    );

    // Ensure the database directory exists
    if let Some(parent) = config.database_path.parent() {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }

    // Initialize database
    let db = Database::new(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    info!("Database initialized");

    // Initialize storage and mail clients
    let storage = StorageClient::new(&config)
        .await
        .context("Failed to initialize storage client")?;
    let mailer = Mailer::new(&config);

    // Shared caches
    let hits = Arc::new(HitCache::new());
    let faqs = Arc::new(FaqCache::new(config.faq_cache_ttl));

    // Start the view-count flush job
    let flush_cache = Arc::clone(&hits);
    let flush_pool = db.pool().clone();
    let flush_interval = config.hit_flush_interval;
    let flush_handle = tokio::spawn(async move {
        hit_cache::flush_loop(flush_cache, flush_pool, flush_interval).await;
    });
    info!("View-count flush job started");

    // Start the deadline sweep
    let sweep_db = db.clone();
    let sweep_interval = config.deadline_sweep_interval;
    let sweep_handle = tokio::spawn(async move {
        closer::close_loop(sweep_db, sweep_interval).await;
    });
    info!("Deadline sweep started");

    // Start the web server in the background
    let state = AppState {
        db,
        config: Arc::new(config),
        storage,
        mailer,
        hits,
        faqs,
    };
    let web_handle = tokio::spawn(async move {
        if let Err(e) = web::serve(state).await {
            error!("Web server error: {e:#}");
        }
    });

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutting down...");

    web_handle.abort();
    flush_handle.abort();
    sweep_handle.abort();

    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,campus_market=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        // Pretty-printed logging for development
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
