use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::types::BoardSnapshot;

struct CachedSnapshot {
    snapshot: BoardSnapshot,
    stored_at: Instant,
}

/// Board snapshots keyed by location, each valid for `ttl`.
pub struct BoardCache {
    inner: Arc<RwLock<HashMap<Option<String>, CachedSnapshot>>>,
    ttl: Duration,
}

impl BoardCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Snapshot for `location` if it is younger than the TTL.
    pub async fn get(&self, location: Option<&str>) -> Option<BoardSnapshot> {
        let entries = self.inner.read().await;
        entries
            .get(&location.map(str::to_string))
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
            .map(|cached| cached.snapshot.clone())
    }

    /// Snapshot for `location` regardless of age.
    pub async fn get_any(&self, location: Option<&str>) -> Option<BoardSnapshot> {
        let entries = self.inner.read().await;
        entries
            .get(&location.map(str::to_string))
            .map(|cached| cached.snapshot.clone())
    }

    pub async fn insert(&self, snapshot: BoardSnapshot) {
        let mut entries = self.inner.write().await;
        entries.insert(
            snapshot.location.clone(),
            CachedSnapshot {
                snapshot,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate(&self, location: Option<&str>) {
        let mut entries = self.inner.write().await;
        entries.remove(&location.map(str::to_string));
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

impl Clone for BoardCache {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ttl: self.ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(location: Option<&str>) -> BoardSnapshot {
        BoardSnapshot {
            location: location.map(str::to_string),
            taken_at: NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            entries: Vec::new(),
        }
    }

    #[tokio::test]
    async fn entries_are_keyed_by_location() {
        let cache = BoardCache::new(Duration::from_secs(60));
        cache.insert(snapshot(Some("plant-1"))).await;
        cache.insert(snapshot(None)).await;

        assert!(cache.get(Some("plant-1")).await.is_some());
        assert!(cache.get(None).await.is_some());
        assert!(cache.get(Some("plant-2")).await.is_none());

        let shared = cache.clone();
        shared.invalidate(Some("plant-1")).await;
        assert!(cache.get(Some("plant-1")).await.is_none());
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert_eq!(shared.len().await, 0);
    }

    #[tokio::test]
    async fn expired_entries_are_only_served_on_request() {
        let cache = BoardCache::new(Duration::ZERO);
        cache.insert(snapshot(Some("plant-1"))).await;
        assert!(cache.get(Some("plant-1")).await.is_none());
        assert!(cache.get_any(Some("plant-1")).await.is_some());
    }
}
