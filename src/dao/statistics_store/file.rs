use std::{
    collections::{BTreeMap, HashMap},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

use crate::dao::{
    models::{StatisticKey, StoredValue},
    storage::{StorageError, StorageResult},
};

use super::StatisticsStore;

/// Statistics persisted as a single JSON document on local disk.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// document, so a batch is either fully visible or not at all.
#[derive(Clone)]
pub struct FileStatisticsStore {
    path: Arc<Path>,
    write_gate: Arc<Mutex<()>>,
}

impl FileStatisticsStore {
    /// Use the document at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            path: Arc::from(path),
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StorageResult<HashMap<StatisticKey, StoredValue>> {
        let contents = match fs::read_to_string(&*self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "statistics file not found; starting empty");
                return Ok(HashMap::new());
            }
            Err(err) => {
                return Err(StorageError::unavailable(
                    format!("failed to read `{}`", self.path.display()),
                    err,
                ));
            }
        };

        let raw: BTreeMap<String, StoredValue> =
            serde_json::from_str(&contents).map_err(|err| {
                StorageError::unavailable(format!("failed to parse `{}`", self.path.display()), err)
            })?;

        let mut values = HashMap::with_capacity(raw.len());
        for (name, value) in raw {
            match StatisticKey::parse(&name) {
                Some(key) => {
                    values.insert(key, value);
                }
                None => warn!(key = %name, "ignoring unknown statistics key"),
            }
        }
        Ok(values)
    }

    async fn write_all(&self, values: &HashMap<StatisticKey, StoredValue>) -> StorageResult<()> {
        let document = values
            .iter()
            .map(|(key, value)| (key.as_str(), *value))
            .collect::<BTreeMap<_, _>>();
        let payload = serde_json::to_vec_pretty(&document).map_err(|err| {
            StorageError::unavailable("failed to encode statistics".into(), err)
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|err| {
                StorageError::unavailable(format!("failed to create `{}`", parent.display()), err)
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await.map_err(|err| {
            StorageError::unavailable(format!("failed to write `{}`", tmp.display()), err)
        })?;
        fs::rename(&tmp, &*self.path).await.map_err(|err| {
            StorageError::unavailable(format!("failed to replace `{}`", self.path.display()), err)
        })
    }

    async fn merge(&self, entries: Vec<(StatisticKey, StoredValue)>) -> StorageResult<()> {
        let _gate = self.write_gate.lock().await;
        let mut values = self.read_all().await?;
        values.extend(entries);
        self.write_all(&values).await
    }
}

impl StatisticsStore for FileStatisticsStore {
    fn get(&self, key: StatisticKey) -> BoxFuture<'static, StorageResult<Option<StoredValue>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.read_all().await?.get(&key).copied()) })
    }

    fn set(&self, key: StatisticKey, value: StoredValue) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.merge(vec![(key, value)]).await })
    }

    fn set_many(
        &self,
        entries: Vec<(StatisticKey, StoredValue)>,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(self.merge(entries))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.read_all().await.map(|_| ()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use uuid::Uuid;

    fn temp_store() -> FileStatisticsStore {
        let path = std::env::temp_dir()
            .join(format!("movie-quiz-{}", Uuid::new_v4().simple()))
            .join("statistics.json");
        FileStatisticsStore::new(path)
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let store = temp_store();
        assert_eq!(store.get(StatisticKey::GamesCount).await.unwrap(), None);
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn values_survive_a_new_handle() {
        let store = temp_store();
        let played_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        store
            .set_many(vec![
                (StatisticKey::GamesCount, StoredValue::Integer(2)),
                (StatisticKey::BestGameDate, StoredValue::Timestamp(played_at)),
            ])
            .await
            .unwrap();

        let reopened = FileStatisticsStore::new(store.path().to_path_buf());
        assert_eq!(
            reopened.get(StatisticKey::GamesCount).await.unwrap(),
            Some(StoredValue::Integer(2))
        );
        assert_eq!(
            reopened.get(StatisticKey::BestGameDate).await.unwrap(),
            Some(StoredValue::Timestamp(played_at))
        );
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn unknown_keys_are_ignored() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"{"gamesCount":{"integer":3},"legacyStreak":{"integer":9}}"#,
        )
        .unwrap();

        assert_eq!(
            store.get(StatisticKey::GamesCount).await.unwrap(),
            Some(StoredValue::Integer(3))
        );
    }

    #[tokio::test]
    async fn malformed_document_is_reported() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        let err = store.get(StatisticKey::GamesCount).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }
}
