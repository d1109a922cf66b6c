//! CouchDB storage backend.
//!
//! CouchDB stores whole documents, so field-level merge is emulated with an
//! explicit read-modify-write guarded by the document `_rev`.

mod config;
mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use store::CouchScoreboardStore;

use self::error::CouchDaoError;
use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::MergePatch { source } => StorageError::InvalidPatch { source },
            CouchDaoError::UpdateConflict { .. } => StorageError::Conflict {
                message: err.to_string(),
            },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
