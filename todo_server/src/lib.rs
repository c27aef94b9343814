//! # todo_server
//!
//! The HTTP face of [`tododb`]: a REST API under `/api`, the same operations
//! as typed procedures under `/rpc/:procedure`, and optionally the browser
//! client's static files.
//!
//! ```ignore
//! let config = Config::parse();
//! todo_server::run(config).await?;
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
};

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::{Command, Config};
use state::AppState;
use tododb::migration;

/// The complete router: API routes, CORS, and the static client when configured.
pub fn app(state: AppState, config: &Config) -> Router {
    let mut router = routes::api(state);

    if let Some(dir) = &config.static_dir {
        log::info!("Serving static files from {}", dir.display());
        let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(spa);
    }

    router.layer(cors(config))
}

fn cors(config: &Config) -> CorsLayer {
    match &config.frontend_url {
        // Credentialed requests need an explicit origin, method and header list.
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.clone())
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Run the configured command: serve by default, or `migrate`.
pub async fn run(config: Config) -> anyhow::Result<()> {
    match config.command {
        Some(Command::Migrate { status }) => {
            migrate(&config, status).await?;
            Ok(())
        }
        None => serve(config).await,
    }
}

/// Apply pending migrations, or with `status_only` just list them.
/// Returns the versions applied or pending.
pub async fn migrate(config: &Config, status_only: bool) -> anyhow::Result<Vec<&'static str>> {
    let db = state::database(config)
        .connect()
        .await
        .context("Failed to connect to the database")?;

    if status_only {
        let pending: Vec<_> = migration::pending(db.inner())
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();
        if pending.is_empty() {
            log::info!("No pending migrations");
        }
        for version in &pending {
            log::info!("Pending: {version}");
        }
        return Ok(pending);
    }

    let applied = migration::migrate(db.inner())
        .await
        .context("Migration failed")?;
    log::info!("Applied {} migration(s)", applied.len());
    Ok(applied)
}

/// Build state from `config`, bind, and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    log::info!("Initializing state...");
    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize application state")?;

    let app = app(state, &config);

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    log::info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
