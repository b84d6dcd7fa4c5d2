mod auth;
mod boards;
mod comments;
mod email;
mod faq_cache;
mod faqs;
mod letters;
mod likes;
mod lookups;
mod photos;
mod profiles;
mod reports;
mod reviews;
mod routes;
mod specs;

pub use faq_cache::FaqCache;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::FromRef;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::boards::HitCache;
use crate::config::Config;
use crate::db::Database;
use crate::email::Mailer;
use crate::storage::StorageClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub storage: StorageClient,
    pub mailer: Mailer,
    pub hits: Arc<HitCache>,
    pub faqs: Arc<FaqCache>,
}

// Lets the auth extractors pull the pool straight out of any state that
// carries it.
impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.pool().clone()
    }
}

/// Start the web server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.web_host, state.config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let app = create_app(state);

    info!(addr = %addr, "Starting web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app)
        .await
        .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
