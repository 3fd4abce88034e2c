mod config;
mod errors;
mod matching;
mod routes;
mod state;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::matching::{MatchEngine, MatchingConfig};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (every variable has a default)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ScoreCheck API v{}", env!("CARGO_PKG_VERSION"));

    // Load matching config (built-in defaults unless MATCHING_CONFIG points at a file)
    let matching_config = match &config.matching_config {
        Some(path) => {
            let loaded = MatchingConfig::from_file(path)?;
            info!("Loaded matching config from {}", path.display());
            loaded
        }
        None => MatchingConfig::default(),
    };
    info!(
        terms = matching_config.vocabulary.len(),
        synonyms = matching_config.synonyms.len(),
        "Matching vocabulary ready"
    );

    // Build the engine once; it is immutable and shared across requests
    let engine = Arc::new(MatchEngine::new(matching_config));

    let state = AppState {
        config: config.clone(),
        engine,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // TODO: tighten CORS in production
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
