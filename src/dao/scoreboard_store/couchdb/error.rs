//! Error types shared by the CouchDB storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::state::scoreboard::MergeError;

/// Convenient result alias returning [`CouchDaoError`] failures.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while interacting with CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Required environment variable is missing.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the absent variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB rejected a GET against the target database.
    #[error("failed to query CouchDB database `{database}`")]
    DatabaseQuery {
        /// Database that was queried.
        database: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB rejected a database creation request.
    #[error("failed to create CouchDB database `{database}`")]
    DatabaseCreate {
        /// Database that was being created.
        database: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for a database operation.
    #[error("unexpected CouchDB database response status {status} for `{database}`")]
    DatabaseStatus {
        /// Database the request targeted.
        database: String,
        /// Status CouchDB answered with.
        status: StatusCode,
    },
    /// A request to the record document could not be sent.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        /// Document path the request targeted.
        path: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for the record document.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus {
        /// Document path the request targeted.
        path: String,
        /// Status CouchDB answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed into the record document.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        /// Document path the response came from.
        path: String,
        /// Underlying decode error.
        #[source]
        source: reqwest::Error,
    },
    /// The submitted patch cannot be merged into the stored record.
    #[error("cannot merge patch into stored record")]
    MergePatch {
        /// What the merge machinery objected to.
        #[source]
        source: MergeError,
    },
    /// Every read-merge-write attempt lost the `_rev` race.
    #[error("gave up updating the record after {attempts} conflicting attempts")]
    UpdateConflict {
        /// How many attempts were made.
        attempts: u32,
    },
    /// The record document vanished between a conflicting write and the re-read.
    #[error("record document disappeared mid-update")]
    MissingDocument,
}
