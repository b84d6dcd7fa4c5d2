//! Write-back cache for board view counts.
//!
//! Reads increment an in-memory delta instead of writing the board row; a
//! periodic job drains the whole map into one bulk update. The map is not
//! durable: deltas die with the process, which undercounts but never
//! corrupts, since the persisted value is a floor.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::{debug, error, info};

use crate::db;

#[derive(Debug, Default)]
pub struct HitCache {
    pending: Mutex<HashMap<i64, i64>>,
}

impl HitCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Record one view of a board and return the cache-adjusted hit count.
    ///
    /// `baseline_hit` is the persisted value the caller just read; the
    /// effective count is that floor plus every view still waiting to be
    /// flushed. No I/O happens here.
    pub fn record_view(&self, board_no: i64, baseline_hit: i64) -> i64 {
        let mut pending = self.pending.lock().unwrap();
        let delta = pending.entry(board_no).or_insert(0);
        *delta += 1;
        baseline_hit + *delta
    }

    /// The delta currently pending for a board (0 when none).
    #[must_use]
    pub fn pending_delta(&self, board_no: i64) -> i64 {
        self.pending
            .lock()
            .unwrap()
            .get(&board_no)
            .copied()
            .unwrap_or(0)
    }

    /// Drain every pending delta into one bulk conditional update.
    ///
    /// The map is swapped out before the write is issued, so views recorded
    /// during the write land in the next cycle instead of being lost. On a
    /// failed write the drained deltas are merged back into the live map and
    /// the error propagates.
    ///
    /// # Errors
    ///
    /// Returns an error if the bulk update fails.
    pub async fn flush(&self, pool: &SqlitePool) -> Result<u64> {
        let drained = {
            let mut pending = self.pending.lock().unwrap();
            std::mem::take(&mut *pending)
        };

        if drained.is_empty() {
            return Ok(0);
        }

        let mut deltas: Vec<(i64, i64)> = drained.iter().map(|(no, d)| (*no, *d)).collect();
        deltas.sort_unstable_by_key(|(no, _)| *no);

        match db::apply_hit_deltas(pool, &deltas).await {
            Ok(affected) => Ok(affected),
            Err(e) => {
                // Merge the drained deltas back so they survive to the next
                // flush attempt. Increments recorded during the failed write
                // are already in the live map and simply add up.
                let mut pending = self.pending.lock().unwrap();
                for (board_no, delta) in drained {
                    *pending.entry(board_no).or_insert(0) += delta;
                }
                Err(e)
            }
        }
    }
}

/// Run the flush job forever on a fixed interval.
pub async fn flush_loop(cache: std::sync::Arc<HitCache>, pool: SqlitePool, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;

        match cache.flush(&pool).await {
            Ok(0) => debug!("No pending view counts to flush"),
            Ok(affected) => info!(affected, "Flushed view counts"),
            Err(e) => error!("View count flush failed: {e:#}"),
        }
    }
}
