use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::cache::BoardCache;
use super::poller::{board_poller, BoardSource};

/// Owns the background board refresh task.
pub struct BoardController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl BoardController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(
        &mut self,
        source: BoardSource,
        cache: BoardCache,
        locations: Vec<Option<String>>,
        refresh: Duration,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("board poller already running");
        }

        let cancel_token = CancellationToken::new();
        info!(
            "Starting board poller for {} location(s) every {}s",
            locations.len(),
            refresh.as_secs()
        );

        let handle = tokio::spawn(board_poller(
            source,
            cache,
            locations,
            refresh,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("board poller task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for BoardController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::FixedOffset;
    use tempfile::TempDir;

    #[tokio::test]
    async fn rejects_double_start_and_stops_cleanly() {
        let dir = TempDir::new().unwrap();
        let source = BoardSource {
            db: Database::new(dir.path().join("board.db")).unwrap(),
            plant_offset: FixedOffset::east_opt(0).unwrap(),
            stale_after: chrono::Duration::minutes(10),
        };
        let cache = BoardCache::new(std::time::Duration::from_secs(60));
        let mut controller = BoardController::new();

        controller
            .start(source.clone(), cache.clone(), vec![None], Duration::from_secs(30))
            .unwrap();
        assert!(controller.is_running());
        assert!(controller
            .start(source, cache, vec![None], Duration::from_secs(30))
            .is_err());

        controller.stop().await.unwrap();
        assert!(!controller.is_running());
        controller.stop().await.unwrap();
    }
}
