//! Ballpark API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ballpark_common::config::AppConfig;
use ballpark_common::db::create_pool;
use ballpark_engine::{Dispatcher, PgUserRepository};
use ballpark_notifier::LineClient;
use ballpark_stats::MlbStatsClient;

use ballpark_api::routes::create_router;
use ballpark_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "ballpark_api=info,ballpark_engine=info,ballpark_notifier=info,tower_http=info",
            )
        }))
        .init();

    tracing::info!("Starting Ballpark API server...");

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;

    let http_timeout = Duration::from_secs(config.http_timeout_secs);
    let stats = MlbStatsClient::new(config.mlb_api_base_url.as_str(), http_timeout)?;
    let line = LineClient::new(
        config.line_api_base_url.as_str(),
        config.line_channel_id.as_str(),
        config.line_channel_secret.as_str(),
        http_timeout,
    )?;

    let dispatcher = Dispatcher::from_config(
        &config,
        Arc::new(stats),
        Arc::new(PgUserRepository::new(pool)),
        Arc::new(line),
    )?;

    let settings = dispatcher.settings();
    tracing::info!(
        message_format = %config.message_format,
        chunk_size = settings.chunk_size,
        concurrency = settings.concurrency,
        display_offset = %settings.display_offset,
        "Dispatcher configured"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(dispatcher, config);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
