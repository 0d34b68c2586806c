//! Registration, login and logout.
//!
//! Only this module and the request extractor know about sessions; the rest of
//! the services take the user id as a plain argument.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{NewUser, User};
use crate::repository::Repository;
use crate::sessions::SessionStore;

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn Repository>,
    sessions: Arc<dyn SessionStore>,
    bcrypt_cost: u32,
}

#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// bcrypt is CPU-bound, keep it off the async workers.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("password check task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("stored password hash is unreadable: {e}")))
}

impl AuthService {
    pub fn new(repo: Arc<dyn Repository>, sessions: Arc<dyn SessionStore>, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            sessions,
            bcrypt_cost,
        }
    }

    pub fn session_ttl_seconds(&self) -> u64 {
        self.sessions.ttl_seconds()
    }

    pub async fn register(&self, registration: Registration) -> Result<User, AppError> {
        let name = registration.name.trim().to_string();
        let email = normalize_email(&registration.email);
        if name.is_empty() || email.is_empty() || registration.password.is_empty() {
            return Err(AppError::invalid("all fields are required"));
        }
        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::AlreadyExists("email already in use".into()));
        }

        let password_hash = hash_password(registration.password, self.bcrypt_cost).await?;
        // A concurrent registration of the same email still loses on the unique index.
        let user = self
            .repo
            .insert_user(NewUser {
                name,
                email,
                password_hash,
                is_admin: false,
            })
            .await?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Returns the user and a new session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let email = normalize_email(email);
        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            warn!("Login failed: unknown email");
            return Err(AppError::Unauthorized);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            warn!("Login failed for user {}", user.id);
            return Err(AppError::Unauthorized);
        }

        let token = self.sessions.create(user.id).await?;
        info!("User {} logged in", user.id);
        Ok((user, token))
    }

    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.revoke(token).await
    }

    /// User id behind a session token.
    pub async fn authenticate(&self, token: &str) -> Result<i64, AppError> {
        self.sessions
            .resolve(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
