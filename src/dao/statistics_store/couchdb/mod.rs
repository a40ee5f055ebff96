mod config;
mod error;
mod models;
mod store;

pub use config::{CouchConfig, CouchCredentials, DEFAULT_STATISTICS_DATABASE};
pub use error::{CouchDaoError, CouchResult};
pub use store::CouchStatisticsStore;
