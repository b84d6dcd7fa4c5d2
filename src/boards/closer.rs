//! Periodic sweep that closes boards past their deadline.

use std::time::Duration;

use tracing::{debug, error, info};

use crate::db::Database;
use crate::kst;

/// Run the deadline sweep forever on a fixed interval.
///
/// Each pass flips `is_deadline` on every open board whose deadline has
/// elapsed; a second pass with no intervening time passage touches nothing.
pub async fn close_loop(db: Database, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;

        match crate::db::close_expired(db.pool(), kst::now()).await {
            Ok(0) => debug!("No boards past deadline"),
            Ok(affected) => info!(affected, "Closed expired boards"),
            Err(e) => error!("Deadline sweep failed: {e:#}"),
        }
    }
}
