use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hubdesk::config::AppConfig;
use hubdesk::db;
use hubdesk::handlers;
use hubdesk::services::history::{HistoryStore, LogCommitHook};
use hubdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        card_luhn_check = config.card_luhn_check,
        allow_past_visit_dates = config.allow_past_visit_dates,
        "booking policy"
    );

    let conn = db::init_db(&config.database_url)
        .with_context(|| format!("failed to initialise database at {}", config.database_url))?;
    let history = HistoryStore::load(&conn).with_hook(LogCommitHook);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        history: Mutex::new(history),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
