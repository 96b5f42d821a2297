mod ai_tools;
mod config;
mod documents;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::ai_tools::orchestrator::AiTools;
use crate::ai_tools::reducer::KeywordSectionReducer;
use crate::config::Config;
use crate::documents::pdf::PdfExtractBackend;
use crate::documents::DocumentNormalizer;
use crate::llm_client::LazyLlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgEntityStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let store = PgEntityStore::connect(&config.database_url).await?;

    // The HTTP client is built on first use; a missing key fails that call, not startup.
    let generator = LazyLlmClient::new(config.anthropic_api_key.clone());
    if config.anthropic_api_key.is_some() {
        info!("Generation enabled (model: {})", llm_client::MODEL);
    } else {
        warn!("ANTHROPIC_API_KEY is not set; generation requests will fail");
    }

    let tools = AiTools::new(
        Arc::new(store),
        Arc::new(generator),
        DocumentNormalizer::new(Arc::new(PdfExtractBackend)),
        Arc::new(KeywordSectionReducer),
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        tools,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
