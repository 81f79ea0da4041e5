use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use milton_api::{app, AppState};
use milton_store::app_config::Config;
use milton_store::{
    DbClient, PgCatalogRepository, PgOrderRepository, RedisClient, RedisSessionStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "milton_api=debug,milton_order=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Milton Tours on port {}", config.server.port);

    let timeout = config.store.timeout();

    // Postgres
    let db = DbClient::new(&config.database, timeout)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    // Redis sessions
    let redis = RedisClient::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;
    let sessions = RedisSessionStore::new(redis, config.session.ttl_seconds, timeout);

    let state = AppState::new(
        Arc::new(PgCatalogRepository::new(db.clone())),
        Arc::new(PgOrderRepository::new(db)),
        Arc::new(sessions),
        config.session.cookie_name.clone(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(state)).await.context("Server error")?;

    Ok(())
}
