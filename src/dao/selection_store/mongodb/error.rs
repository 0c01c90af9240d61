//! Error types shared by the MongoDB storage implementation.

use thiserror::Error;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        /// The URI that failed to parse.
        uri: String,
        /// Driver-level parse error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Building the client from parsed options failed.
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        /// Driver-level construction error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The initial ping never succeeded within the retry budget.
    #[error("MongoDB did not answer the initial ping after {attempts} attempts")]
    InitialPing {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Last ping error observed.
        #[source]
        source: mongodb::error::Error,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB health ping failed")]
    HealthPing {
        /// Driver-level ping error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Creating an index on a collection failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Index key description.
        index: &'static str,
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Looking up a selection failed.
    #[error("failed to load selection for `{selected_name}`")]
    FindSelection {
        /// Name whose selection was being loaded.
        selected_name: String,
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
    /// Inserting a selection failed for a reason other than uniqueness.
    #[error("failed to insert selection for `{selected_name}`")]
    InsertSelection {
        /// Name whose selection was being inserted.
        selected_name: String,
        /// Driver-level error.
        #[source]
        source: mongodb::error::Error,
    },
    /// The unique index rejected an insert for an already-selected name.
    #[error("selection for `{selected_name}` already exists")]
    DuplicateSelection {
        /// Name whose selection already exists.
        selected_name: String,
    },
}
