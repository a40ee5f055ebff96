//! Library crate for movie-quiz-back, exposing modules for binaries and integration tests.

pub mod clock;
pub mod config;
/// Question sources and statistics stores.
pub mod dao;
/// Wire and view models.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Quiz, statistics and delivery services.
pub mod services;
/// Shared application state and the quiz state machine.
pub mod state;
