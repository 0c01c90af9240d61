#[cfg(feature = "couch-store")]
pub mod couchdb;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::models::SelectionEntity;
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for gift-exchange selections.
pub trait SelectionStore: Send + Sync {
    /// Look up the selection recorded for a given roster name, if any.
    fn find_selection(
        &self,
        selected_name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<SelectionEntity>>>;
    /// Insert a completed selection. Fails with [`crate::dao::storage::StorageError::Duplicate`]
    /// when a selection for the same name already exists.
    fn insert_selection(&self, selection: SelectionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap connectivity probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
