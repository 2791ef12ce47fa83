use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

/// Per-account name suggestion lists, already in display order.
#[derive(Clone)]
pub struct NameCache {
    inner: Cache<String, Arc<Vec<String>>>,
    // bumped on every invalidation
    generation: Arc<AtomicU64>,
}

impl NameCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(10_000) // accounts, not names
                .time_to_live(ttl)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get(&self, company_id: &str) -> Option<Arc<Vec<String>>> {
        self.inner.get(company_id).await
    }

    /// Read before loading the names that will be passed to [`NameCache::put`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Caches `names` loaded at `generation`. If an invalidation happened
    /// since, the entry is dropped again so the stale list is not served.
    pub async fn put(
        &self,
        company_id: &str,
        names: Vec<String>,
        generation: u64,
    ) -> Arc<Vec<String>> {
        let names = Arc::new(names);
        self.inner
            .insert(company_id.to_string(), Arc::clone(&names))
            .await;
        if self.generation() != generation {
            self.inner.invalidate(company_id).await;
        }
        names
    }

    /// Drops the cached list after any mutation of the account's entries.
    pub async fn invalidate(&self, company_id: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate(company_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn put_get_invalidate() {
        let cache = NameCache::new(Duration::from_secs(60));
        assert!(cache.get("a").await.is_none());

        let generation = cache.generation();
        cache
            .put("a", vec!["アオキ".into(), "タナカ".into()], generation)
            .await;
        assert_eq!(cache.get("a").await.unwrap().len(), 2);
        assert!(cache.get("b").await.is_none());

        cache.invalidate("a").await;
        assert!(cache.get("a").await.is_none());
    }

    #[actix_web::test]
    async fn invalidation_during_load_is_not_undone() {
        let cache = NameCache::new(Duration::from_secs(60));

        let generation = cache.generation();
        // a create lands while the names are being read
        cache.invalidate("a").await;
        let served = cache.put("a", vec!["アオキ".into()], generation).await;

        assert_eq!(served.len(), 1);
        assert!(cache.get("a").await.is_none());

        let generation = cache.generation();
        cache.put("a", vec!["アオキ".into()], generation).await;
        assert!(cache.get("a").await.is_some());
    }
}
