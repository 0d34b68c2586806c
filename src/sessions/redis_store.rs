use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::info;

use super::{new_token, session_key, SessionStore};
use crate::error::AppError;

/// Sessions kept in Redis with `SET EX`, so expiry is Redis' job.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(Self { conn, ttl_seconds })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: i64) -> Result<String, AppError> {
        let token = new_token();
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(session_key(&token), user_id, self.ttl_seconds)
            .await?;
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<i64>, AppError> {
        let mut conn = self.conn.clone();
        let user_id: Option<i64> = conn.get(session_key(token)).await?;
        Ok(user_id)
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(session_key(token)).await?;
        info!("Session revoked");
        Ok(())
    }

    fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}
