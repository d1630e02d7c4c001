mod config;
mod editing;
mod errors;
mod generation;
mod llm_client;
mod models;
mod persistence;
mod routes;
mod session;
mod state;
mod transfer;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::{BulletGenerator, LlmBulletGenerator, OfflineBulletGenerator};
use crate::llm_client::LlmClient;
use crate::persistence::{load_session, KeyValueStore, MemoryStore, PersistScheduler, RedisStore};
use crate::routes::build_router;
use crate::session::SessionController;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume editor API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let restored = load_session(store.as_ref()).await;

    let persist = PersistScheduler::spawn(store, config.persist_debounce);
    info!("Persisting edits after {:?} of quiet", config.persist_debounce);

    let generator = build_generator(&config)?;

    let session = SessionController::new(restored, generator, persist, config.generation_timeout);

    let state = AppState {
        session: session.clone(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flushing pending edits before exit");
    session.shutdown().await;

    Ok(())
}

/// Redis when `REDIS_URL` is set, otherwise a process-local map.
async fn build_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisStore::connect(url, config.store_key_prefix.clone())
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("REDIS_URL not set; edits are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// LLM-backed generator when an API key is configured, otherwise the offline
/// fallback generator.
fn build_generator(config: &Config) -> Result<Arc<dyn BulletGenerator>> {
    match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.generation_timeout)
                .context("Failed to build LLM client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Ok(Arc::new(LlmBulletGenerator::new(llm)))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; generation uses sample bullets");
            Ok(Arc::new(OfflineBulletGenerator))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
