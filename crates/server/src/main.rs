// crates/server/src/main.rs
//! career-log server binary.
//!
//! Startup order: configuration, logging, metrics, database, event
//! publisher, then (when a language model is configured) the analyzer and
//! the daily scheduler. Ctrl-C stops accepting requests and flushes the
//! publisher before exit.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use career_log_core::llm::create_provider;
use career_log_core::ConversationAnalyzer;
use career_log_db::Database;
use career_log_server::jobs::{
    BatchState, DailyAnalysisScheduler, EventPublisher, SchedulerConfig,
};
use career_log_server::{create_app, init_metrics, AppConfig, AppState, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str =
    "warn,career_log_server=info,career_log_db=info,career_log_core=info";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);
    init_metrics();

    let db = match &config.db_path {
        Some(path) => Database::new(path).await,
        None => Database::open_default().await,
    }
    .context("failed to open database")?;
    tracing::info!(path = %db.db_path().display(), "database ready");

    let publisher = Arc::new(EventPublisher::spawn(Arc::new(db.clone()), config.publisher));
    let batch = Arc::new(BatchState::new());

    let state = match create_provider(&config.llm) {
        Ok(provider) => {
            tracing::info!(
                provider = provider.name(),
                model = provider.model(),
                "language model configured"
            );
            let scheduler = Arc::new(DailyAnalysisScheduler::new(
                db.clone(),
                ConversationAnalyzer::new(provider),
                publisher.clone(),
                batch.clone(),
                SchedulerConfig {
                    cron: config.analysis_cron.clone(),
                    timezone: config.timezone,
                    window_boundary: config.window_boundary,
                },
            )?);
            scheduler.clone().spawn_daily();
            AppState::with_scheduler(db.clone(), publisher.clone(), batch, scheduler)
        }
        Err(e) => {
            tracing::warn!(error = %e, "no language model available; daily analysis disabled");
            AppState::new(db.clone(), publisher.clone())
        }
    };

    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "career-log listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    publisher.flush().await;
    tracing::info!(dropped = publisher.dropped(), "publisher flushed; bye");
    Ok(())
}
