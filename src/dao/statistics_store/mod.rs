/// CouchDB-backed store.
#[cfg(feature = "couch-store")]
pub mod couchdb;
mod file;

pub use file::FileStatisticsStore;

use std::{
    collections::HashMap,
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::dao::{
    models::{StatisticKey, StoredValue},
    storage::{StorageError, StorageResult},
};

/// Durable key/value persistence behind the statistics service.
///
/// Absent keys are reported as `None`; callers decide on defaults.
pub trait StatisticsStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: StatisticKey) -> BoxFuture<'static, StorageResult<Option<StoredValue>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: StatisticKey, value: StoredValue) -> BoxFuture<'static, StorageResult<()>>;

    /// Store several values at once.
    ///
    /// Backends that can write a batch in one operation should override this so
    /// the batch lands atomically.
    fn set_many(
        &self,
        entries: Vec<(StatisticKey, StoredValue)>,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            for (key, value) in entries {
                self.set(key, value).await?;
            }
            Ok(())
        })
    }

    /// Verify the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Process-local store for tests and for running without persistence.
#[derive(Clone, Default)]
pub struct InMemoryStatisticsStore {
    values: Arc<Mutex<HashMap<StatisticKey, StoredValue>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStatisticsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again) to exercise error paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of every stored entry.
    pub async fn entries(&self) -> HashMap<StatisticKey, StoredValue> {
        self.values.lock().await.clone()
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "in-memory store rejects writes".into(),
                io::Error::other("writes disabled"),
            ));
        }
        Ok(())
    }
}

impl StatisticsStore for InMemoryStatisticsStore {
    fn get(&self, key: StatisticKey) -> BoxFuture<'static, StorageResult<Option<StoredValue>>> {
        let values = self.values.clone();
        Box::pin(async move { Ok(values.lock().await.get(&key).copied()) })
    }

    fn set(&self, key: StatisticKey, value: StoredValue) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.check_writable()?;
            store.values.lock().await.insert(key, value);
            Ok(())
        })
    }

    fn set_many(
        &self,
        entries: Vec<(StatisticKey, StoredValue)>,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.check_writable()?;
            let mut guard = self.values.lock().await;
            guard.extend(entries);
            Ok(())
        })
    }
}
