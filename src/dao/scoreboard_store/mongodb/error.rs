use mongodb::error::Error as MongoError;
use thiserror::Error;

use crate::state::scoreboard::MergeError;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// Required environment variable is missing.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the absent variable.
        var: &'static str,
    },
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Building the driver client failed.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered the initial ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// How many pings were attempted.
        attempts: u32,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// A routine health-check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Seeding the record document failed.
    #[error("failed to seed the live record document")]
    SeedDocument {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Reading the record document failed.
    #[error("failed to load the live record document")]
    LoadDocument {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Applying a `$set` to the record document failed.
    #[error("failed to update the live record document")]
    UpdateDocument {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// The record document vanished between seeding and the follow-up operation.
    #[error("live record document disappeared mid-operation")]
    MissingDocument,
    /// A patch value could not be converted to BSON.
    #[error("failed to encode patch field `{field}` as BSON")]
    EncodePatch {
        /// The field being encoded.
        field: String,
        /// Underlying serializer error.
        #[source]
        source: mongodb::bson::error::Error,
    },
    /// The submitted patch cannot be applied to the record.
    #[error("cannot apply patch to the record")]
    InvalidPatch {
        /// What the merge machinery objected to.
        #[source]
        source: MergeError,
    },
}
