use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, time::SystemTime};

/// Keys under which the aggregate statistics are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticKey {
    /// Number of completed rounds.
    GamesCount,
    /// Correct answers of the best round.
    BestGameCorrect,
    /// Question count of the best round.
    BestGameTotal,
    /// When the best round was played.
    BestGameDate,
    /// Correct answers summed over every round.
    TotalCorrectAnswers,
    /// Questions asked summed over every round.
    TotalQuestionsAsked,
}

impl StatisticKey {
    /// Every persisted key, in a stable order.
    pub const ALL: [StatisticKey; 6] = [
        StatisticKey::GamesCount,
        StatisticKey::BestGameCorrect,
        StatisticKey::BestGameTotal,
        StatisticKey::BestGameDate,
        StatisticKey::TotalCorrectAnswers,
        StatisticKey::TotalQuestionsAsked,
    ];

    /// Name of the key inside the backing store.
    pub fn as_str(self) -> &'static str {
        match self {
            StatisticKey::GamesCount => "gamesCount",
            StatisticKey::BestGameCorrect => "bestGameCorrect",
            StatisticKey::BestGameTotal => "bestGameTotal",
            StatisticKey::BestGameDate => "bestGameDate",
            StatisticKey::TotalCorrectAnswers => "totalCorrectAnswers",
            StatisticKey::TotalQuestionsAsked => "totalQuestionsAsked",
        }
    }

    /// Resolve a stored key name. Unknown names yield `None` so foreign keys are skipped.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for StatisticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value stored under a [`StatisticKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredValue {
    /// Non-negative counter.
    Integer(u64),
    /// Point in time.
    Timestamp(SystemTime),
}

impl StoredValue {
    /// Counter value, if this is an integer.
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            StoredValue::Integer(value) => Some(*value),
            StoredValue::Timestamp(_) => None,
        }
    }

    /// Timestamp value, if this is a timestamp.
    pub fn as_timestamp(&self) -> Option<SystemTime> {
        match self {
            StoredValue::Timestamp(value) => Some(*value),
            StoredValue::Integer(_) => None,
        }
    }
}

/// Movie entry of the on-disk catalog feeding the question source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieEntity {
    /// Display title, used in logs only.
    pub title: String,
    /// Audience rating on a 0-10 scale.
    pub rating: f32,
    /// Poster image path, relative to the catalog file.
    pub image: PathBuf,
}

/// JSON layout of the catalog file.
#[derive(Debug, Deserialize)]
pub struct MovieCatalogEntity {
    /// Movies questions are drawn from.
    pub movies: Vec<MovieEntity>,
}
