use std::time::Duration;
use async_trait::async_trait;
use milton_core::session::SessionRecord;
use milton_core::{CoreError, CoreResult, SessionStore};
use redis::{AsyncCommands, RedisResult};
use tracing::debug;
use crate::database::{persistence, with_deadline};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn get_session(&self, session_id: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(session_key(session_id)).await
    }

    /// Writes the session and restarts its expiry.
    pub async fn set_session(
        &self,
        session_id: &str,
        payload: &str,
        ttl_seconds: u64,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(session_key(session_id), payload, ttl_seconds).await?;
        debug!("Session stored: {}", session_id);
        Ok(())
    }
}

fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

/// Session records serialized as JSON under `session:{id}` with a sliding TTL.
pub struct RedisSessionStore {
    redis: RedisClient,
    ttl_seconds: u64,
    timeout: Duration,
}

impl RedisSessionStore {
    pub fn new(redis: RedisClient, ttl_seconds: u64, timeout: Duration) -> Self {
        Self { redis, ttl_seconds, timeout }
    }
}

fn map_redis_error(err: redis::RedisError) -> CoreError {
    persistence(err)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> CoreResult<Option<SessionRecord>> {
        let payload = with_deadline(
            self.timeout,
            "load_session",
            self.redis.get_session(session_id),
            map_redis_error,
        )
        .await?;

        match payload {
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
                CoreError::persistence(format!("corrupt session {}: {}", session_id, e))
            }),
            None => Ok(None),
        }
    }

    async fn save(&self, session_id: &str, record: &SessionRecord) -> CoreResult<()> {
        let json = serde_json::to_string(record).map_err(persistence)?;
        with_deadline(
            self.timeout,
            "save_session",
            self.redis.set_session(session_id, &json, self.ttl_seconds),
            map_redis_error,
        )
        .await
    }
}
