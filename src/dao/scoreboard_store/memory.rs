//! Process-local storage backend.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    scoreboard_store::ScoreboardStore,
    storage::{StorageError, StorageResult},
};
use crate::state::scoreboard::{MatchState, StatePatch};

/// Keeps the live record in process memory behind a lock.
///
/// Suitable for single-process deployments and tests only: every worker
/// process would hold its own copy, and nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryScoreboardStore {
    record: Arc<RwLock<Option<MatchState>>>,
}

impl MemoryScoreboardStore {
    /// Create an empty store; the record is seeded on first access.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreboardStore for MemoryScoreboardStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<MatchState>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.record.write().await;
            Ok(guard.get_or_insert_with(MatchState::initial).clone())
        })
    }

    fn update(&self, patch: StatePatch) -> BoxFuture<'static, StorageResult<MatchState>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.record.write().await;
            let current = guard.get_or_insert_with(MatchState::initial);
            let merged = current
                .merged(&patch)
                .map_err(|source| StorageError::InvalidPatch { source })?;
            *current = merged.clone();
            Ok(merged)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: serde_json::Value) -> StatePatch {
        serde_json::from_value(value).expect("patch literal")
    }

    #[tokio::test]
    async fn load_seeds_the_record_and_is_idempotent() {
        let store = MemoryScoreboardStore::new();
        let first = store.load().await.unwrap();
        let second = store.load().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, MatchState::initial());
    }

    #[tokio::test]
    async fn updates_merge_and_persist() {
        let store = MemoryScoreboardStore::new();
        let updated = store.update(patch(json!({"score": 55}))).await.unwrap();
        assert_eq!(updated.score, 55);

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.score, 55);
        assert_eq!(reloaded.team2_name, "Australia");
    }

    #[tokio::test]
    async fn update_before_any_load_lands_on_the_defaults() {
        let store = MemoryScoreboardStore::new();
        let updated = store.update(patch(json!({"wickets": 2}))).await.unwrap();
        assert_eq!(updated.wickets, 2);
        assert_eq!(updated.score, 0);
    }

    #[tokio::test]
    async fn bad_patches_leave_the_record_untouched() {
        let store = MemoryScoreboardStore::new();
        assert!(store.update(patch(json!({"score": "five"}))).await.is_err());
        assert_eq!(store.load().await.unwrap().score, 0);
    }
}
