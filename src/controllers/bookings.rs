use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{JsonBody, PathParam};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showtimes/{id}/bookings", post(create_booking))
        .route("/bookings", get(get_user_bookings))
}

/* ---------- BOOKINGS ---------- */

// POST /api/showtimes/{id}/bookings
#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    seats: Vec<i32>,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    PathParam(showtime_id): PathParam<i64>,
    JsonBody(req): JsonBody<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .bookings
        .book(user.user_id, showtime_id, &req.seats)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.bookings.bookings_for_user(user.user_id).await?;
    Ok(Json(bookings))
}
