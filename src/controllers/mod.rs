pub mod auth;
pub mod bookings;
pub mod movies;

use axum::{
    extract::{FromRequest, FromRequestParts},
    Router,
};
use std::sync::Arc;

use crate::error::AppError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(movies::routes())
        .merge(bookings::routes())
}

/// `Json` body whose rejection is reported as [`AppError::InvalidInput`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `Path` parameters whose rejection is reported as [`AppError::InvalidInput`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);
