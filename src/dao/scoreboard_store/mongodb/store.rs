use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{
    Collection, Database,
    bson::{Document, doc, serialize_to_bson},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::ReturnDocument,
};
use tokio::sync::RwLock;

use crate::dao::{scoreboard_store::ScoreboardStore, storage::StorageResult};
use crate::state::scoreboard::{MatchState, StatePatch};

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoScoreDocument, SCORE_DOC_ID, SCOREBOARD_COLLECTION},
};

/// MongoDB server error code for a duplicate `_id` insert.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Storage backend using MongoDB's native partial-document updates.
#[derive(Clone)]
pub struct MongoScoreboardStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: RwLock<Database>,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.database.read().await.clone();
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        *self.database.write().await = database;
        Ok(())
    }
}

impl MongoScoreboardStore {
    /// Establish a connection to MongoDB and seed the record document.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;

        let store = Self {
            inner: Arc::new(MongoInner {
                database: RwLock::new(database),
                config,
            }),
        };

        store.ensure_document().await?;
        Ok(store)
    }

    async fn collection(&self) -> Collection<MongoScoreDocument> {
        let guard = self.inner.database.read().await;
        guard.collection::<MongoScoreDocument>(SCOREBOARD_COLLECTION)
    }

    /// Create the record document if it does not exist yet.
    ///
    /// A plain insert keeps this idempotent under races: whoever loses gets a
    /// duplicate-key error and treats the record as already seeded.
    async fn ensure_document(&self) -> MongoResult<()> {
        match self.collection().await.insert_one(MongoScoreDocument::seed()).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Ok(()),
            Err(source) => Err(MongoDaoError::SeedDocument { source }),
        }
    }

    async fn fetch_record(&self) -> MongoResult<MatchState> {
        let document = self
            .collection()
            .await
            .find_one(doc! { "_id": SCORE_DOC_ID })
            .await
            .map_err(|source| MongoDaoError::LoadDocument { source })?
            .ok_or(MongoDaoError::MissingDocument)?;
        Ok(document.state)
    }

    async fn load_record(&self) -> MongoResult<MatchState> {
        self.ensure_document().await?;
        self.fetch_record().await
    }

    /// Apply the patch with a `$set` of exactly the submitted fields, so
    /// concurrent updates to disjoint fields are both retained.
    async fn update_record(&self, patch: &StatePatch) -> MongoResult<MatchState> {
        // `$set` bypasses the in-process merge, so the types are checked here.
        patch
            .type_check()
            .map_err(|source| MongoDaoError::InvalidPatch { source })?;
        self.ensure_document().await?;

        let mut changes = Document::new();
        for (key, value) in patch.iter() {
            let encoded = serialize_to_bson(value).map_err(|source| MongoDaoError::EncodePatch {
                field: key.clone(),
                source,
            })?;
            changes.insert(key.clone(), encoded);
        }

        if changes.is_empty() {
            return self.fetch_record().await;
        }

        let document = self
            .collection()
            .await
            .find_one_and_update(doc! { "_id": SCORE_DOC_ID }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateDocument { source })?
            .ok_or(MongoDaoError::MissingDocument)?;
        Ok(document.state)
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_err))
            if write_err.code == DUPLICATE_KEY_CODE
    )
}

impl ScoreboardStore for MongoScoreboardStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<MatchState>> {
        let store = self.clone();
        Box::pin(async move { store.load_record().await.map_err(Into::into) })
    }

    fn update(&self, patch: StatePatch) -> BoxFuture<'static, StorageResult<MatchState>> {
        let store = self.clone();
        Box::pin(async move { store.update_record(&patch).await.map_err(Into::into) })
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
