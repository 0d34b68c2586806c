//! Login sessions: opaque token -> user id.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::AppError;

pub mod memory;
pub mod redis_store;

pub use self::memory::MemorySessionStore;
pub use self::redis_store::RedisSessionStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issues a fresh token for `user_id`.
    async fn create(&self, user_id: i64) -> Result<String, AppError>;

    /// User id behind a live token, `None` for unknown or expired tokens.
    async fn resolve(&self, token: &str) -> Result<Option<i64>, AppError>;

    async fn revoke(&self, token: &str) -> Result<(), AppError>;

    fn ttl_seconds(&self) -> u64;
}

pub(crate) fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Storage key for a token. Raw tokens are never stored.
pub(crate) fn session_key(token: &str) -> String {
    format!("session:{:x}", Sha256::digest(token.as_bytes()))
}
