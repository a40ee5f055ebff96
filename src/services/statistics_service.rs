use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    clock::Clock,
    dao::{
        models::{StatisticKey, StoredValue},
        statistics_store::StatisticsStore,
        storage::{StorageError, StorageResult},
    },
    state::game::{AggregateStatistics, GameResult},
};

/// Owns the aggregate statistics persisted in a [`StatisticsStore`].
///
/// `record` is the only mutator; reads never write back defaults. Reads take the
/// same gate as `record`, so they never observe a half-written batch.
pub struct StatisticsService {
    store: Arc<dyn StatisticsStore>,
    clock: Clock,
    record_gate: Mutex<()>,
}

impl StatisticsService {
    /// Service over `store`; `clock` dates a best game that was never stored.
    pub fn new(store: Arc<dyn StatisticsStore>, clock: Clock) -> Self {
        Self {
            store,
            clock,
            record_gate: Mutex::new(()),
        }
    }

    /// Fold `result` into the persisted statistics and return the new aggregate.
    ///
    /// The read and the batched write happen under one lock, so concurrent
    /// records never lose an update.
    pub async fn record(&self, result: GameResult) -> StorageResult<AggregateStatistics> {
        let _gate = self.record_gate.lock().await;

        let current = self.read_aggregate().await?;
        let (next, replaces_best) = current.record(result);

        let mut entries = vec![
            (
                StatisticKey::GamesCount,
                StoredValue::Integer(next.games_played),
            ),
            (
                StatisticKey::TotalCorrectAnswers,
                StoredValue::Integer(next.total_correct),
            ),
            (
                StatisticKey::TotalQuestionsAsked,
                StoredValue::Integer(next.total_questions),
            ),
        ];
        if replaces_best {
            entries.extend([
                (
                    StatisticKey::BestGameCorrect,
                    StoredValue::Integer(u64::from(result.correct)),
                ),
                (
                    StatisticKey::BestGameTotal,
                    StoredValue::Integer(u64::from(result.total)),
                ),
                (
                    StatisticKey::BestGameDate,
                    StoredValue::Timestamp(result.played_at),
                ),
            ]);
        }
        self.store.set_many(entries).await?;

        info!(
            correct = result.correct,
            total = result.total,
            games_played = next.games_played,
            new_best = replaces_best,
            "round recorded"
        );

        Ok(next)
    }

    /// Aggregate statistics as currently persisted. Absent keys read as zero.
    pub async fn current_statistics(&self) -> StorageResult<AggregateStatistics> {
        let _gate = self.record_gate.lock().await;
        self.read_aggregate().await
    }

    /// Share of correct answers over every recorded round, in percent.
    pub async fn accuracy_percent(&self) -> StorageResult<f64> {
        Ok(self.current_statistics().await?.accuracy_percent())
    }

    /// Check that the backing store is reachable.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.store.health_check().await
    }

    async fn read_aggregate(&self) -> StorageResult<AggregateStatistics> {
        let games_played = self.read_integer(StatisticKey::GamesCount).await?;
        let total_correct = self.read_integer(StatisticKey::TotalCorrectAnswers).await?;
        let total_questions = self.read_integer(StatisticKey::TotalQuestionsAsked).await?;
        let best_correct = self.read_count(StatisticKey::BestGameCorrect).await?;
        let best_total = self.read_count(StatisticKey::BestGameTotal).await?;
        let best_date = match self.store.get(StatisticKey::BestGameDate).await? {
            Some(value) => value.as_timestamp().ok_or_else(|| {
                StorageError::corrupted(StatisticKey::BestGameDate.as_str(), "expected a timestamp")
            })?,
            None => {
                debug!("no best game date stored, using current time");
                self.clock.now()
            }
        };

        Ok(AggregateStatistics {
            games_played,
            total_correct,
            total_questions,
            best_game: GameResult::new(best_correct, best_total, best_date),
        })
    }

    async fn read_integer(&self, key: StatisticKey) -> StorageResult<u64> {
        match self.store.get(key).await? {
            Some(value) => value
                .as_integer()
                .ok_or_else(|| StorageError::corrupted(key.as_str(), "expected an integer")),
            None => Ok(0),
        }
    }

    async fn read_count(&self, key: StatisticKey) -> StorageResult<u32> {
        let value = self.read_integer(key).await?;
        u32::try_from(value)
            .map_err(|_| StorageError::corrupted(key.as_str(), format!("{value} out of range")))
    }
}
