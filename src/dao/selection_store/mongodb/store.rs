use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{
    Client, Collection, Database,
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::MongoSelectionDocument,
};
use crate::dao::{models::SelectionEntity, selection_store::SelectionStore, storage::StorageResult};

const SELECTION_COLLECTION_NAME: &str = "selections";
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed [`SelectionStore`] with a unique index on `selected_name`.
#[derive(Clone)]
pub struct MongoSelectionStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoSelectionStore {
    /// Establish a connection to MongoDB and ensure the uniqueness index is present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Uniqueness of `selected_name` is enforced here, at the store, so two
    /// sessions racing past the application-side pre-check cannot both insert.
    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"selected_name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("selected_name_unique_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: SELECTION_COLLECTION_NAME,
                index: "selected_name",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoSelectionDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoSelectionDocument>(SELECTION_COLLECTION_NAME)
    }

    async fn find_selection(&self, selected_name: &str) -> MongoResult<Option<SelectionEntity>> {
        let collection = self.collection().await;

        let document = collection
            .find_one(doc! { "selected_name": selected_name })
            .await
            .map_err(|source| MongoDaoError::FindSelection {
                selected_name: selected_name.to_owned(),
                source,
            })?;

        Ok(document.map(Into::into))
    }

    async fn insert_selection(&self, selection: SelectionEntity) -> MongoResult<()> {
        let selected_name = selection.selected_name.clone();
        let document: MongoSelectionDocument = selection.into();
        let collection = self.collection().await;

        collection.insert_one(&document).await.map_err(|source| {
            if is_duplicate_key(&source) {
                MongoDaoError::DuplicateSelection {
                    selected_name: selected_name.clone(),
                }
            } else {
                MongoDaoError::InsertSelection {
                    selected_name: selected_name.clone(),
                    source,
                }
            }
        })?;

        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

impl SelectionStore for MongoSelectionStore {
    fn find_selection(
        &self,
        selected_name: &str,
    ) -> BoxFuture<'static, StorageResult<Option<SelectionEntity>>> {
        let store = self.clone();
        let selected_name = selected_name.to_owned();
        Box::pin(async move {
            store
                .find_selection(&selected_name)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_selection(
        &self,
        selection: SelectionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_selection(selection).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
