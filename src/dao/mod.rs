/// Persisted model definitions.
pub mod models;
/// Question supply for quiz rounds.
pub mod question_source;
/// Key/value persistence of aggregate statistics.
pub mod statistics_store;
/// Storage abstraction layer errors.
pub mod storage;
