//! Movie Quiz Back binary entrypoint wiring the quiz session, statistics store, REST and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
#[cfg(feature = "couch-store")]
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_quiz_back::{
    clock::Clock,
    config::{AppConfig, StatisticsBackend},
    dao::{
        question_source::MovieCatalogSource,
        statistics_store::{FileStatisticsStore, InMemoryStatisticsStore, StatisticsStore},
    },
    routes,
    services::{
        quiz_service::{QuizOrchestrator, QuizSettings},
        quiz_session::QuizSession,
        sse_events::SsePresenter,
        statistics_service::StatisticsService,
    },
    state::{AppState, SSE_CHANNEL_CAPACITY, SharedState, SseHub},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let clock = Clock::System;

    let store = build_statistics_store(&config).await;
    let statistics = Arc::new(StatisticsService::new(store, clock));

    let hub = SseHub::new(SSE_CHANNEL_CAPACITY);
    let session = QuizSession::new(
        Arc::new(MovieCatalogSource::new(config.catalog_path.clone())),
        statistics.clone(),
        Arc::new(SsePresenter::new(hub.clone())),
        clock,
    );
    let quiz = QuizOrchestrator::new(
        session,
        QuizSettings {
            total_questions: config.total_questions,
            feedback_delay: config.feedback_delay,
        },
    );

    let app_state = AppState::new(quiz, statistics, hub);
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    app_state.quiz().shutdown();
    info!("server stopped");

    Ok(())
}

/// Pick the statistics backend named in the configuration.
///
/// An unreachable CouchDB falls back to process memory so the quiz stays playable.
async fn build_statistics_store(config: &AppConfig) -> Arc<dyn StatisticsStore> {
    match config.statistics_backend {
        StatisticsBackend::File => {
            info!(path = %config.statistics_path.display(), "using file statistics store");
            Arc::new(FileStatisticsStore::new(config.statistics_path.clone()))
        }
        StatisticsBackend::Memory => {
            info!("using in-memory statistics store; statistics are lost on exit");
            Arc::new(InMemoryStatisticsStore::new())
        }
        #[cfg(feature = "couch-store")]
        StatisticsBackend::Couch => {
            use movie_quiz_back::dao::statistics_store::couchdb::{
                CouchConfig, CouchStatisticsStore,
            };

            let connected = match CouchConfig::from_env() {
                Ok(couch) => CouchStatisticsStore::connect(couch).await,
                Err(err) => Err(err),
            };
            match connected {
                Ok(store) => {
                    info!("connected to CouchDB statistics store");
                    Arc::new(store)
                }
                Err(err) => {
                    error!(error = %err, "CouchDB unavailable; falling back to in-memory statistics");
                    Arc::new(InMemoryStatisticsStore::new())
                }
            }
        }
        #[cfg(not(feature = "couch-store"))]
        StatisticsBackend::Couch => {
            tracing::warn!("built without couch-store; falling back to in-memory statistics");
            Arc::new(InMemoryStatisticsStore::new())
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
