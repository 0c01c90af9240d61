mod config;
mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use error::CouchDaoError;
pub use store::CouchSelectionStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::DuplicateSelection { selected_name } => {
                StorageError::duplicate(selected_name)
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
