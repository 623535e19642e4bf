mod config;
mod error;
mod orchestrator;
mod reaper;
mod retriever;
mod routes;
mod state;
mod storage;
mod task;
mod translate;
mod tts;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Keys usually live in a .env next to the binary
    let dotenv_path = dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("translate_audio_backend=debug,tower_http=debug")),
        )
        .init();

    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize app state; this also creates the audio directory
    let app_state = AppState::new(&config).await?;

    if let Some(ttl) = config.storage.audio_ttl_secs {
        reaper::spawn(
            app_state.local_store.dir().to_path_buf(),
            Duration::from_secs(ttl),
            Duration::from_secs(config.storage.reap_interval_secs),
        );
    }

    // Build application
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
