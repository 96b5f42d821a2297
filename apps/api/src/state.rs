use crate::ai_tools::orchestrator::AiTools;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Store, generator, normalizer and reducer behind one cloneable handle.
    pub tools: AiTools,
}
