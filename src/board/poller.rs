use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, FixedOffset};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::db::Database;
use crate::timeline::records::plant_now;

use super::cache::BoardCache;
use super::types::BoardSnapshot;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Where board snapshots come from.
#[derive(Clone)]
pub struct BoardSource {
    pub db: Database,
    pub plant_offset: FixedOffset,
    pub stale_after: ChronoDuration,
}

impl BoardSource {
    pub async fn snapshot(&self, location: Option<&str>) -> Result<BoardSnapshot> {
        let rows = self
            .db
            .latest_records(location.map(str::to_string))
            .await
            .with_context(|| format!("failed to load board rows for {}", describe(location)))?;

        Ok(BoardSnapshot::from_rows(
            location.map(str::to_string),
            &rows,
            self.plant_offset,
            plant_now(self.plant_offset),
            self.stale_after,
        ))
    }
}

fn describe(location: Option<&str>) -> &str {
    location.unwrap_or("all locations")
}

/// Cached snapshot when still fresh, otherwise a new one. A failed refresh
/// falls back to the expired entry when there is one.
pub async fn load_board(
    source: &BoardSource,
    cache: &BoardCache,
    location: Option<&str>,
) -> Result<BoardSnapshot> {
    if let Some(snapshot) = cache.get(location).await {
        return Ok(snapshot);
    }

    match source.snapshot(location).await {
        Ok(snapshot) => {
            cache.insert(snapshot.clone()).await;
            Ok(snapshot)
        }
        Err(err) => match cache.get_any(location).await {
            Some(stale) => {
                log_warn!("serving expired board for {}: {err:?}", describe(location));
                Ok(stale)
            }
            None => Err(err),
        },
    }
}

/// Refreshes every location into `cache` each `refresh` until cancelled.
pub async fn board_poller(
    source: BoardSource,
    cache: BoardCache,
    locations: Vec<Option<String>>,
    refresh: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for location in &locations {
                    let location = location.as_deref();
                    match source.snapshot(location).await {
                        Ok(snapshot) => {
                            log_info!(
                                "board refreshed for {}: {} machines, {} stale",
                                describe(location),
                                snapshot.entries.len(),
                                snapshot.stale_count()
                            );
                            cache.insert(snapshot).await;
                        }
                        Err(err) => log_error!("board refresh failed for {}: {err:?}", describe(location)),
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("board poller shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Machine, StoredRecord};
    use tempfile::TempDir;

    async fn source(dir: &TempDir) -> BoardSource {
        let db = Database::new(dir.path().join("board.db")).unwrap();
        db.upsert_machine(&Machine {
            machine_code: "M-01".into(),
            machine_name: "Grinder 1".into(),
            line_group: Some("A".into()),
            location: Some("plant-1".into()),
        })
        .await
        .unwrap();
        BoardSource {
            db,
            plant_offset: FixedOffset::east_opt(0).unwrap(),
            stale_after: ChronoDuration::minutes(10),
        }
    }

    #[tokio::test]
    async fn load_board_caches_until_invalidated() {
        let dir = TempDir::new().unwrap();
        let source = source(&dir).await;
        let cache = BoardCache::new(std::time::Duration::from_secs(60));

        let first = load_board(&source, &cache, Some("plant-1")).await.unwrap();
        assert_eq!(first.entries.len(), 1);
        assert_eq!(first.entries[0].category, crate::timeline::StatusCategory::SignalLoss);

        source
            .db
            .insert_raw_record(
                "M-01",
                StoredRecord {
                    created_at: plant_now(source.plant_offset),
                    machine_counter: Some(3),
                    operation_name: Some("Normal Operation".into()),
                },
            )
            .await
            .unwrap();

        let cached = load_board(&source, &cache, Some("plant-1")).await.unwrap();
        assert_eq!(cached, first);

        cache.invalidate(Some("plant-1")).await;
        let fresh = load_board(&source, &cache, Some("plant-1")).await.unwrap();
        assert_eq!(fresh.entries[0].status, "Normal Operation");
        assert!(!fresh.entries[0].stale);
    }

    #[tokio::test]
    async fn poller_fills_cache_and_stops_on_cancel() {
        let dir = TempDir::new().unwrap();
        let source = source(&dir).await;
        let cache = BoardCache::new(std::time::Duration::from_secs(60));
        let token = CancellationToken::new();

        let handle = tokio::spawn(board_poller(
            source,
            cache.clone(),
            vec![Some("plant-1".into()), None],
            Duration::from_millis(20),
            token.clone(),
        ));

        for _ in 0..100 {
            if cache.len().await == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        token.cancel();
        handle.await.unwrap();

        assert!(cache.get(Some("plant-1")).await.is_some());
        assert!(cache.get(None).await.is_some());
    }
}
