mod config;
mod db;
mod errors;
mod hashing;
mod models;
mod remix;
mod routes;
mod state;
mod store;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::try_create_pool;
use crate::remix::{RemixClient, MODEL};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::ContentStore;
use crate::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; business logic never reads the environment.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Remix API v{}", env!("CARGO_PKG_VERSION"));

    // Persistence is optional: without store configuration the gateway
    // degrades to "unavailable" outcomes instead of failing startup.
    let pool = try_create_pool(config.database_url.as_deref()).await;
    let store = ContentStore::new(pool);
    if store.is_available() {
        info!("Persistence gateway enabled");
    } else {
        info!("Persistence gateway disabled (store not configured)");
    }

    // Initialize remix client. A missing API key is not fatal here — it
    // becomes a configuration error at generation time.
    let remix = RemixClient::new(config.openai_api_url.clone(), config.openai_api_key.clone());
    info!("Remix client initialized (model: {MODEL})");

    // Build app state
    let state = AppState {
        store,
        remix,
        workflow: Arc::new(Mutex::new(Workflow::new())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
