//! Redis connection backing per-session state

use redis::{aio::MultiplexedConnection, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Open a client and make sure the server answers
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Invalid Redis URL {}: {}", url, e)))?;
        let service = Self { client };

        let mut conn = service.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!("Redis answered {}", pong);

        Ok(service)
    }

    /// INCR `key` and push its expiry `ttl_seconds` out, in one transaction
    pub async fn incr_with_ttl(&self, key: &str, ttl_seconds: u64) -> AppResult<i64> {
        let mut conn = self.connection().await?;

        let (value,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(value)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}
