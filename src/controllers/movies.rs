use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::PathParam;
use crate::error::AppError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
        .route("/showtimes/{id}", get(get_showtime))
        .route("/showtimes/{id}/seats", get(get_taken_seats))
}

// GET /api/movies
async fn list_movies(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.list_movies().await?))
}

// GET /api/movies/{id}
async fn get_movie(
    State(state): State<Arc<AppState>>,
    PathParam(movie_id): PathParam<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.movie_detail(movie_id).await?))
}

// GET /api/showtimes/{id}
async fn get_showtime(
    State(state): State<Arc<AppState>>,
    PathParam(showtime_id): PathParam<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.showtime_detail(showtime_id).await?))
}

#[derive(Debug, Serialize)]
struct TakenSeatsResponse {
    showtime_id: i64,
    taken: Vec<i32>,
}

// GET /api/showtimes/{id}/seats
async fn get_taken_seats(
    State(state): State<Arc<AppState>>,
    PathParam(showtime_id): PathParam<i64>,
) -> Result<impl IntoResponse, AppError> {
    let taken = state.ledger.taken_seats(showtime_id).await?;
    Ok(Json(TakenSeatsResponse {
        showtime_id,
        taken: taken.into_iter().collect(),
    }))
}
