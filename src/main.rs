//! Santa draw backend binary entrypoint wiring the REST and storage layers.

use std::{env, io, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use config::AppConfig;
use dao::{selection_store::SelectionStore, storage::StorageError};
use services::{session_reaper, storage_supervisor};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    tokio::spawn(storage_supervisor::run(app_state.clone(), connect_store));
    tokio::spawn(session_reaper::run(
        app_state.clone(),
        session_reaper::DEFAULT_SESSION_TTL,
    ));

    let app = build_router(app_state);

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

    Ok(())
}

/// Connect to the storage backend selected by `SANTA_STORE` (`mongo` or `couch`).
async fn connect_store() -> Result<Arc<dyn SelectionStore>, StorageError> {
    let backend = env::var("SANTA_STORE").unwrap_or_else(|_| "mongo".into());

    match backend.as_str() {
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use dao::selection_store::mongodb::{MongoConfig, MongoSelectionStore};

            let config = MongoConfig::from_env().await.map_err(StorageError::from)?;
            let store = MongoSelectionStore::connect(config)
                .await
                .map_err(StorageError::from)?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            use dao::selection_store::couchdb::{CouchConfig, CouchSelectionStore};

            let config = CouchConfig::from_env().map_err(StorageError::from)?;
            let store = CouchSelectionStore::connect(config)
                .await
                .map_err(StorageError::from)?;
            Ok(Arc::new(store))
        }
        other => Err(StorageError::unavailable(
            format!("unknown storage backend `{other}`"),
            io::Error::new(io::ErrorKind::InvalidInput, "unsupported SANTA_STORE value"),
        )),
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
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

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
