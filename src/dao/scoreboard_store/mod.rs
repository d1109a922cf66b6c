//! The pluggable storage contract for the single live record, plus its backends.

#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;
use crate::state::scoreboard::{MatchState, StatePatch};

/// Abstraction over the persistence layer for the live match record.
///
/// Exactly one record exists; backends create it from the built-in defaults on
/// first access so callers never observe "not found".
pub trait ScoreboardStore: Send + Sync {
    /// Fetch the live record, seeding it when the backend holds none.
    ///
    /// First-access races are only as safe as the backend's create-if-absent
    /// primitive; the last writer of the initial default wins.
    fn load(&self) -> BoxFuture<'static, StorageResult<MatchState>>;

    /// Merge the patch into the stored record field by field and return the
    /// full result. Fields the patch does not mention are preserved.
    fn update(&self, patch: StatePatch) -> BoxFuture<'static, StorageResult<MatchState>>;

    /// Cheap connectivity probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
