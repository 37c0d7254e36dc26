//! Per-session key-value state

use async_trait::async_trait;

use crate::{config::SessionConfig, error::AppResult};

use super::redis::RedisService;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Count one more home page visit for the session and return the new total
    async fn increment_visits(&self, session_id: &str) -> AppResult<i64>;
}

/// Session state kept in Redis, expiring with the session cookie
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: RedisService,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(redis: RedisService, config: &SessionConfig) -> Self {
        Self {
            redis,
            ttl_seconds: config.ttl_seconds,
        }
    }
}

fn visits_key(session_id: &str) -> String {
    format!("session:{}:num_visits", session_id)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn increment_visits(&self, session_id: &str) -> AppResult<i64> {
        self.redis
            .incr_with_ttl(&visits_key(session_id), self.ttl_seconds)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visits_key() {
        assert_eq!(
            visits_key("0b7c5e0e-7a53-4a4c-9a57-3f1d0f1b2c3d"),
            "session:0b7c5e0e-7a53-4a4c-9a57-3f1d0f1b2c3d:num_visits"
        );
    }
}
