mod cms;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod publication;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::FutureExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cms::odoo::OdooConnector;
use crate::config::Config;
use crate::db::Database;
use crate::generation::scoring::ArticleScorer;
use crate::llm_client::LlmClient;
use crate::publication::scheduler::{CycleJob, Scheduler};
use crate::publication::social::LlmSocialWriter;
use crate::publication::Publisher;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Blogwright API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL: connected (and migrated) on first use
    let db = Database::new(config.database_url.clone());
    let store = Arc::new(PgStore::new(db.clone()));

    // LLM writers
    // Each attempt gets a slice of the call budget so retries fit.
    let llm = LlmClient::new(config.attempt_timeout_secs())?;
    let configured = config.credentials.configured();
    if configured.is_empty() {
        warn!("No AI writer API keys configured; generation will fail until one is set");
    } else {
        info!(
            "AI writers configured: {}",
            configured
                .iter()
                .map(|(p, _)| p.label())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let scorer = ArticleScorer::new(config.cta_locale);
    let publisher = Arc::new(Publisher::new(
        store.clone(),
        Arc::new(OdooConnector),
        Arc::new(llm.clone()),
        Arc::new(LlmSocialWriter::new(llm.clone(), config.credentials.clone())),
        scorer,
        config.credentials.clone(),
        Duration::from_secs(config.provider_timeout_secs),
        config.site_url.clone(),
    ));

    // Weekly publication schedule
    let scheduler = Arc::new(Scheduler::new());
    if config.scheduler.enabled {
        let job_publisher = publisher.clone();
        let job: CycleJob = Arc::new(move || {
            let publisher = job_publisher.clone();
            async move {
                // Failures are logged and recorded by the cycle itself.
                let _ = publisher.run_cycle().await;
            }
            .boxed()
        });
        scheduler.start(config.scheduler.clone(), job);
    } else {
        info!("Scheduler disabled (SCHEDULER_ENABLED not set)");
    }

    // Build app state
    let state = AppState {
        db,
        store,
        writer: Arc::new(llm),
        scorer,
        publisher,
        scheduler: scheduler.clone(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop();
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
