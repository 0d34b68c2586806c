use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::SeatGrid;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Showtime {
    pub id: i64,
    pub movie_id: i64,
    pub start_time: DateTime<Utc>,
    /// Price of a single seat.
    pub price_cents: i64,
    pub seat_rows: i32,
    pub seat_columns: i32,
}

impl Showtime {
    pub fn grid(&self) -> SeatGrid {
        // Row and column bounds are enforced by the showtimes CHECK constraints.
        SeatGrid {
            rows: self.seat_rows,
            columns: self.seat_columns,
        }
    }

    pub fn seat_count(&self) -> i32 {
        self.grid().capacity()
    }
}

#[derive(Debug, Clone)]
pub struct NewShowtime {
    pub movie_id: i64,
    pub start_time: DateTime<Utc>,
    pub price_cents: i64,
    pub grid: SeatGrid,
}
