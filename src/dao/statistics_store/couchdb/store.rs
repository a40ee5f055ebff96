use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::sync::Mutex;

use crate::dao::{
    models::{StatisticKey, StoredValue},
    statistics_store::StatisticsStore,
    storage::StorageResult,
};

use super::{
    config::{CouchConfig, CouchCredentials},
    error::{CouchDaoError, CouchResult},
    models::{CouchStatisticsDocument, STATISTICS_DOC_ID},
};

/// Statistics kept in a single CouchDB document.
///
/// Every read fetches the whole document; writes merge into it under the
/// revision that was just read.
#[derive(Clone)]
pub struct CouchStatisticsStore {
    client: Client,
    database: Arc<str>,
    database_url: Arc<str>,
    credentials: Option<Arc<CouchCredentials>>,
    write_gate: Arc<Mutex<()>>,
}

impl CouchStatisticsStore {
    /// Connect and create the database when it does not exist yet.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            database_url: database_url(&config.base_url, &config.database).into(),
            database: config.database.into(),
            credentials: config.credentials.map(Arc::new),
            write_gate: Arc::new(Mutex::new(())),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => builder,
        }
    }

    async fn database_status(&self) -> CouchResult<StatusCode> {
        let response = self
            .with_auth(self.client.get(self.database_url.as_ref()))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: self.database.to_string(),
                source,
            })?;
        Ok(response.status())
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let status = match self.database_status().await? {
            StatusCode::NOT_FOUND => {
                self.with_auth(self.client.put(self.database_url.as_ref()))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: self.database.to_string(),
                        source,
                    })?
                    .status()
            }
            status => status,
        };

        if status.is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::DatabaseStatus {
                database: self.database.to_string(),
                status,
            })
        }
    }

    async fn send_document(&self, builder: RequestBuilder) -> CouchResult<Response> {
        self.with_auth(builder)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: STATISTICS_DOC_ID.to_string(),
                source,
            })
    }

    /// Current document, or an empty one when none was written yet.
    async fn fetch_statistics(&self) -> CouchResult<CouchStatisticsDocument> {
        let url = document_url(&self.database_url, STATISTICS_DOC_ID);
        let response = self.send_document(self.client.get(url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(CouchStatisticsDocument::empty()),
            status if status.is_success() => response.json().await.map_err(|source| {
                CouchDaoError::DecodeResponse {
                    path: STATISTICS_DOC_ID.to_string(),
                    source,
                }
            }),
            status => Err(CouchDaoError::RequestStatus {
                path: STATISTICS_DOC_ID.to_string(),
                status,
            }),
        }
    }

    async fn save_statistics(&self, document: &CouchStatisticsDocument) -> CouchResult<()> {
        let url = document_url(&self.database_url, STATISTICS_DOC_ID);
        let response = self.send_document(self.client.put(url).json(document)).await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(CouchDaoError::RequestStatus {
                path: STATISTICS_DOC_ID.to_string(),
                status,
            }),
        }
    }

    async fn merge(&self, entries: Vec<(StatisticKey, StoredValue)>) -> CouchResult<()> {
        // The revision read below must still be current when the PUT lands.
        let _gate = self.write_gate.lock().await;
        let mut document = self.fetch_statistics().await?;
        document.merge(entries);
        self.save_statistics(&document).await
    }
}

impl StatisticsStore for CouchStatisticsStore {
    fn get(&self, key: StatisticKey) -> BoxFuture<'static, StorageResult<Option<StoredValue>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.fetch_statistics().await?.value(key)) })
    }

    fn set(&self, key: StatisticKey, value: StoredValue) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.merge(vec![(key, value)]).await.map_err(Into::into) })
    }

    fn set_many(
        &self,
        entries: Vec<(StatisticKey, StoredValue)>,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move { self.merge(entries).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            match store.database_status().await? {
                status if status.is_success() => Ok(()),
                status => Err(CouchDaoError::DatabaseStatus {
                    database: store.database.to_string(),
                    status,
                }
                .into()),
            }
        })
    }
}

fn database_url(base_url: &str, database: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), database)
}

fn document_url(database_url: &str, doc_id: &str) -> String {
    format!("{database_url}/{doc_id}")
}
