use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::JsonBody;
use crate::error::AppError;
use crate::middleware::{AuthUser, SESSION_COOKIE};
use crate::models::User;
use crate::services::auth::Registration;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

// POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    #[validate(email(message = "email is invalid"))]
    email: String,
    #[validate(length(min = 1, message = "password is required"))]
    password: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(mut req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.name = req.name.trim().to_string();
    req.email = req.email.trim().to_string();
    req.validate()
        .map_err(|e| AppError::invalid(e.to_string()))?;

    let user = state
        .auth
        .register(Registration {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// POST /api/auth/login
#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    user: User,
    token: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, token) = state.auth.login(&req.email, &req.password).await?;
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.auth.session_ttl_seconds()
    );
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { user, token }),
    ))
}

// POST /api/auth/logout
async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.auth.logout(&user.token).await?;
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}
