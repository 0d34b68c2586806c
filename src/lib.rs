pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod sessions;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use repository::Repository;
use services::{AuthService, BookingService, CatalogReader, SeatLedger};
use sessions::SessionStore;

// Shared state for every request handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogReader,
    pub ledger: SeatLedger,
    pub bookings: BookingService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        sessions: Arc<dyn SessionStore>,
        bcrypt_cost: u32,
    ) -> Arc<Self> {
        let ledger = SeatLedger::new(repo.clone());
        Arc::new(Self {
            catalog: CatalogReader::new(repo.clone(), ledger.clone()),
            bookings: BookingService::new(repo.clone(), ledger.clone()),
            auth: AuthService::new(repo, sessions, bcrypt_cost),
            ledger,
        })
    }
}

/// Full HTTP application: banner, health check and the JSON API under `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Movie Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
