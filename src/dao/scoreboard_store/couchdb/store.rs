use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};

use crate::dao::{scoreboard_store::ScoreboardStore, storage::StorageResult};
use crate::state::scoreboard::{MatchState, StatePatch};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{CouchScoreDocument, SCORE_DOC_ID},
};

/// Read-merge-write attempts before an update gives up on `_rev` conflicts.
const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Outcome of a `PUT` against the record document.
enum PutOutcome {
    /// CouchDB accepted the document.
    Stored,
    /// Someone else wrote a newer `_rev` first.
    Conflict,
}

/// Storage backend talking to CouchDB over its HTTP API.
#[derive(Clone)]
pub struct CouchScoreboardStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchScoreboardStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            database: Arc::<str>::from(config.database),
            auth: config
                .username
                .zip(config.password)
                .map(|(user, pass)| (Arc::<str>::from(user), Arc::<str>::from(pass))),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some((user, pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn doc_request(&self, method: Method) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.database_url(), SCORE_DOC_ID);
        self.with_auth(self.client.request(method, url))
    }

    /// Check that the target database exists, creating it on a 404.
    async fn ensure_database(&self) -> CouchResult<()> {
        let url = self.database_url();
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: self.database.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                let created = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: self.database.to_string(),
                        source,
                    })?;
                if created.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database: self.database.to_string(),
                        status: created.status(),
                    })
                }
            }
            status if status.is_success() => Ok(()),
            status => Err(CouchDaoError::DatabaseStatus {
                database: self.database.to_string(),
                status,
            }),
        }
    }

    async fn fetch_document(&self) -> CouchResult<Option<CouchScoreDocument>> {
        let response = self
            .doc_request(Method::GET)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: SCORE_DOC_ID.to_owned(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<CouchScoreDocument>()
                .await
                .map(Some)
                .map_err(|source| CouchDaoError::DecodeResponse {
                    path: SCORE_DOC_ID.to_owned(),
                    source,
                }),
            status => Err(CouchDaoError::RequestStatus {
                path: SCORE_DOC_ID.to_owned(),
                status,
            }),
        }
    }

    async fn store_document(&self, document: &CouchScoreDocument) -> CouchResult<PutOutcome> {
        let response = self
            .doc_request(Method::PUT)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: SCORE_DOC_ID.to_owned(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Ok(PutOutcome::Conflict),
            status if status.is_success() => Ok(PutOutcome::Stored),
            status => Err(CouchDaoError::RequestStatus {
                path: SCORE_DOC_ID.to_owned(),
                status,
            }),
        }
    }

    async fn load_record(&self) -> CouchResult<MatchState> {
        if let Some(document) = self.fetch_document().await? {
            return Ok(document.state);
        }

        let seeded = CouchScoreDocument::seed();
        match self.store_document(&seeded).await? {
            PutOutcome::Stored => Ok(seeded.state),
            // Another caller seeded the record first; serve whatever won.
            PutOutcome::Conflict => self
                .fetch_document()
                .await?
                .map(|document| document.state)
                .ok_or(CouchDaoError::MissingDocument),
        }
    }

    /// Field-level merge emulated with a read-modify-write on the whole
    /// document. A competing writer bumps `_rev` and our `PUT` comes back 409,
    /// in which case the merge is retried on the fresh revision.
    async fn update_record(&self, patch: &StatePatch) -> CouchResult<MatchState> {
        for _attempt in 0..MAX_UPDATE_ATTEMPTS {
            let (rev, state) = match self.fetch_document().await? {
                Some(document) => (document.rev, document.state),
                None => (None, MatchState::initial()),
            };

            let merged = state
                .merged(patch)
                .map_err(|source| CouchDaoError::MergePatch { source })?;
            let document = CouchScoreDocument {
                id: SCORE_DOC_ID.to_owned(),
                rev,
                state: merged,
            };

            match self.store_document(&document).await? {
                PutOutcome::Stored => return Ok(document.state),
                PutOutcome::Conflict => continue,
            }
        }

        Err(CouchDaoError::UpdateConflict {
            attempts: MAX_UPDATE_ATTEMPTS,
        })
    }
}

impl ScoreboardStore for CouchScoreboardStore {
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
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .with_auth(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::DatabaseQuery {
                    database: store.database.to_string(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::DatabaseStatus {
                    database: store.database.to_string(),
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
