use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::{sync::Mutex, time::Instant};

use super::{new_token, session_key, SessionStore};
use crate::error::AppError;

pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (i64, Instant)>>,
    ttl_seconds: u64,
}

impl MemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl_seconds,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i64) -> Result<String, AppError> {
        let token = new_token();
        let expires_at = Instant::now() + Duration::from_secs(self.ttl_seconds);
        self.sessions
            .lock()
            .await
            .insert(session_key(&token), (user_id, expires_at));
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<i64>, AppError> {
        let mut sessions = self.sessions.lock().await;
        let key = session_key(token);
        let Some(&(user_id, expires_at)) = sessions.get(&key) else {
            return Ok(None);
        };
        if Instant::now() < expires_at {
            return Ok(Some(user_id));
        }
        sessions.remove(&key);
        Ok(None)
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.sessions.lock().await.remove(&session_key(token));
        Ok(())
    }

    fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}
