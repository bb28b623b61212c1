use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::eto::Sample;
use crate::source::SourceId;

struct CacheEntry {
    samples: Arc<Vec<Sample>>,
    loaded_at: Instant,
}

/// In-memory sample tables keyed by source identity
///
/// Owned by the service layer; entries live until explicitly invalidated or
/// until they are older than `max_age` (if set). Clones share storage.
#[derive(Clone, Default)]
pub struct SampleCache {
    entries: Arc<RwLock<HashMap<SourceId, CacheEntry>>>,
    max_age: Option<Duration>,
}

impl SampleCache {
    pub fn new(max_age: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_age,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match self.max_age {
            Some(max_age) => entry.loaded_at.elapsed() < max_age,
            None => true,
        }
    }

    /// Cached table for `id`, `None` if absent or expired
    pub async fn get(&self, id: &SourceId) -> Option<Arc<Vec<Sample>>> {
        let entries = self.entries.read().await;
        entries
            .get(id)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| Arc::clone(&entry.samples))
    }

    pub async fn insert(&self, id: SourceId, samples: Vec<Sample>) -> Arc<Vec<Sample>> {
        let samples = Arc::new(samples);
        debug!("Caching {} samples for {}", samples.len(), id);
        self.entries.write().await.insert(
            id,
            CacheEntry {
                samples: Arc::clone(&samples),
                loaded_at: Instant::now(),
            },
        );
        samples
    }

    /// Drop one source's table; returns whether anything was cached
    pub async fn invalidate(&self, id: &SourceId) -> bool {
        let removed = self.entries.write().await.remove(id).is_some();
        if removed {
            info!("Invalidated cached samples for {}", id);
        }
        removed
    }

    /// Drop every cached table; returns how many were dropped
    pub async fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        info!("Invalidated {} cached sample tables", count);
        count
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Return the cached table or run `loader` and cache its result
    ///
    /// Loader errors are returned as-is and nothing is cached.
    pub async fn get_or_load<F, Fut, E>(
        &self,
        id: &SourceId,
        loader: F,
    ) -> Result<Arc<Vec<Sample>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Sample>, E>>,
    {
        if let Some(samples) = self.get(id).await {
            debug!("Cache hit for {}", id);
            return Ok(samples);
        }

        debug!("Cache miss for {}, loading", id);
        let samples = loader().await?;
        Ok(self.insert(id.clone(), samples).await)
    }
}
