//! Read-through cache for the FAQ listing.
//!
//! The FAQ page is read constantly and mutated rarely, so responses come
//! from an in-memory copy with a TTL; manager mutations drop the copy.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::{self, Faq};

#[derive(Debug, Clone)]
struct CachedFaqs {
    faqs: Vec<Faq>,
    cached_at: Instant,
}

impl CachedFaqs {
    fn is_valid(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

pub struct FaqCache {
    cache: RwLock<Option<CachedFaqs>>,
    ttl: Duration,
}

impl FaqCache {
    /// Create a new FAQ cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(None),
            ttl,
        }
    }

    /// Get FAQs from cache, or fetch fresh data when expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the database fetch fails.
    pub async fn get_or_refresh(&self, pool: &SqlitePool) -> Result<Vec<Faq>> {
        {
            let cache = self.cache.read().unwrap();
            if let Some(ref cached) = *cache {
                if cached.is_valid(self.ttl) {
                    return Ok(cached.faqs.clone());
                }
            }
        }

        let faqs = db::list_faqs(pool).await?;

        {
            let mut cache = self.cache.write().unwrap();
            *cache = Some(CachedFaqs {
                faqs: faqs.clone(),
                cached_at: Instant::now(),
            });
        }

        Ok(faqs)
    }

    /// Drop the cached copy; the next read refetches.
    pub fn invalidate(&self) {
        let mut cache = self.cache.write().unwrap();
        *cache = None;
    }
}

impl Default for FaqCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}
