//! Read and write paths for the live record, including the degraded-mode policy.

use tracing::{debug, warn};

use crate::{
    error::ServiceError,
    state::{
        SharedState,
        scoreboard::{MatchState, StatePatch},
    },
};

/// Keys managed by storage backends that must never be patched from outside.
const RESERVED_KEYS: &[&str] = &["_id", "_rev"];

/// Current record for display purposes.
///
/// When no backend is reachable this serves the built-in defaults instead of
/// failing: the display page keeps rendering and writes are rejected elsewhere.
pub async fn live_state(state: &SharedState) -> MatchState {
    match state.scoreboard_store().await {
        Some(store) => match store.load().await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "scoreboard read failed; serving default record");
                MatchState::initial()
            }
        },
        None => {
            debug!("no storage backend installed; serving default record");
            MatchState::initial()
        }
    }
}

/// Merge an admin-submitted patch into the stored record.
pub async fn apply_update(
    state: &SharedState,
    mut patch: StatePatch,
) -> Result<MatchState, ServiceError> {
    patch.remove_keys(RESERVED_KEYS);
    let store = state.require_store().await?;
    Ok(store.update(patch).await?)
}
