use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A committed purchase of one or more seats. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub showtime_id: i64,
    /// Seat indices, ascending.
    pub seats: Vec<i32>,
    pub seat_labels: Vec<String>,
    pub total_price_cents: i64,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub showtime_id: i64,
    pub seats: Vec<i32>,
    pub seat_labels: Vec<String>,
    pub total_price_cents: i64,
}
