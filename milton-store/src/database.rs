use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use milton_core::{CoreError, CoreResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::{info, warn};
use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
    timeout: Duration,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig, timeout: Duration) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Self { pool, timeout })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Runs a query under the configured deadline and maps its error.
    pub async fn bounded<T, F>(&self, op: &str, fut: F) -> CoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        with_deadline(self.timeout, op, fut, map_sqlx_error).await
    }
}

pub(crate) async fn with_deadline<T, E, F>(
    timeout: Duration,
    op: &str,
    fut: F,
    map_err: fn(E) -> CoreError,
) -> CoreResult<T>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(map_err),
        Err(_) => {
            warn!("Store call {} timed out after {:?}", op, timeout);
            Err(CoreError::Persistence(format!("{} timed out", op)))
        }
    }
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::RowNotFound => CoreError::not_found("row"),
        other => persistence(other),
    }
}

pub(crate) fn persistence(err: impl Display) -> CoreError {
    CoreError::persistence(err)
}
