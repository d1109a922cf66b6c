//! Scorecast backend binary entrypoint wiring routes, sessions, and storage.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scorecast_back::{
    config::AppConfig,
    dao::scoreboard_store::memory::MemoryScoreboardStore,
    routes,
    state::{AppState, SharedState},
};

#[cfg(any(feature = "couch-store", feature = "mongo-store"))]
use scorecast_back::{dao::scoreboard_store::ScoreboardStore, services::storage_supervisor};

/// Environment variable selecting the storage backend.
const STORE_ENV: &str = "SCORECAST_STORE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());
    select_storage_backend(&app_state).await?;

    // Build the HTTP router once the shared state is ready.
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

/// Install the backend named by `SCORECAST_STORE`.
///
/// Remote backends are handed to the storage supervisor, which connects in the
/// background and flips degraded mode as connectivity changes; until then the
/// service starts degraded and serves defaults.
async fn select_storage_backend(state: &SharedState) -> anyhow::Result<()> {
    let backend = env::var(STORE_ENV).unwrap_or_else(|_| "memory".into());

    match backend.as_str() {
        "memory" => {
            info!("using in-memory scoreboard store; state will not survive a restart");
            state
                .install_store(Arc::new(MemoryScoreboardStore::new()))
                .await;
        }
        #[cfg(feature = "couch-store")]
        "couchdb" => {
            use scorecast_back::dao::scoreboard_store::couchdb::{
                CouchConfig, CouchScoreboardStore,
            };

            let config = CouchConfig::from_env().context("reading CouchDB configuration")?;
            info!(database = %config.database, "using CouchDB scoreboard store");
            tokio::spawn(storage_supervisor::run(state.clone(), move || {
                let config = config.clone();
                async move {
                    CouchScoreboardStore::connect(config)
                        .await
                        .map(|store| Arc::new(store) as Arc<dyn ScoreboardStore>)
                        .map_err(Into::into)
                }
            }));
        }
        #[cfg(feature = "mongo-store")]
        "mongodb" => {
            use scorecast_back::dao::scoreboard_store::mongodb::{
                MongoConfig, MongoScoreboardStore,
            };

            let config = MongoConfig::from_env()
                .await
                .context("reading MongoDB configuration")?;
            info!(database = %config.database_name, "using MongoDB scoreboard store");
            tokio::spawn(storage_supervisor::run(state.clone(), move || {
                let config = config.clone();
                async move {
                    MongoScoreboardStore::connect(config)
                        .await
                        .map(|store| Arc::new(store) as Arc<dyn ScoreboardStore>)
                        .map_err(Into::into)
                }
            }));
        }
        other => anyhow::bail!("unsupported {STORE_ENV} backend `{other}`"),
    }

    Ok(())
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
