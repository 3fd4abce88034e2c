use std::sync::Arc;

use crate::config::Config;
use crate::matching::MatchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Matching pipeline built once at startup; read-only across requests.
    pub engine: Arc<MatchEngine>,
}
