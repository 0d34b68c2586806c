use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

use super::{BookingRepository, CatalogRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Booking, Movie, NewBooking, NewMovie, NewShowtime, NewUser, Showtime, User};

/// In-process repository with the same contract as the Postgres one.
///
/// All tables sit behind one mutex, so `commit_booking` checks and claims its
/// seats in a single critical section, mirroring the unique index on
/// `booking_seats (showtime_id, seat_index)`.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    movies: Vec<Movie>,
    showtimes: Vec<Showtime>,
    bookings: Vec<Booking>,
    // (showtime_id, seat_index) -> booking_id
    booking_seats: HashMap<(i64, i32), i64>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

#[async_trait]
impl CatalogRepository for MemoryRepository {
    async fn list_movies(&self) -> Result<Vec<Movie>, AppError> {
        Ok(self.tables.lock().await.movies.clone())
    }

    async fn find_movie(&self, id: i64) -> Result<Option<Movie>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn showtimes_for_movie(&self, movie_id: i64) -> Result<Vec<Showtime>, AppError> {
        let tables = self.tables.lock().await;
        let mut showtimes: Vec<Showtime> = tables
            .showtimes
            .iter()
            .filter(|s| s.movie_id == movie_id)
            .cloned()
            .collect();
        showtimes.sort_by_key(|s| (s.start_time, s.id));
        Ok(showtimes)
    }

    async fn find_showtime(&self, id: i64) -> Result<Option<Showtime>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.showtimes.iter().find(|s| s.id == id).cloned())
    }

    async fn count_movies(&self) -> Result<i64, AppError> {
        Ok(self.tables.lock().await.movies.len() as i64)
    }

    async fn insert_movie(&self, movie: NewMovie) -> Result<Movie, AppError> {
        let mut tables = self.tables.lock().await;
        let movie = Movie {
            id: next_id(tables.movies.len()),
            title: movie.title,
            description: movie.description,
            duration_minutes: movie.duration_minutes,
            poster_url: movie.poster_url,
        };
        tables.movies.push(movie.clone());
        Ok(movie)
    }

    async fn insert_showtime(&self, showtime: NewShowtime) -> Result<Showtime, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.movies.iter().any(|m| m.id == showtime.movie_id) {
            return Err(AppError::invalid("movie does not exist"));
        }
        let created = Showtime {
            id: next_id(tables.showtimes.len()),
            movie_id: showtime.movie_id,
            start_time: showtime.start_time,
            price_cents: showtime.price_cents,
            seat_rows: showtime.grid.rows,
            seat_columns: showtime.grid.columns,
        };
        tables.showtimes.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists("email already in use".into()));
        }
        let created = User {
            id: next_id(tables.users.len()),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BookingRepository for MemoryRepository {
    async fn taken_seats(&self, showtime_id: i64) -> Result<BTreeSet<i32>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .booking_seats
            .keys()
            .filter(|(showtime, _)| *showtime == showtime_id)
            .map(|(_, seat)| *seat)
            .collect())
    }

    async fn commit_booking(&self, booking: NewBooking) -> Result<Booking, AppError> {
        let mut tables = self.tables.lock().await;

        let showtime = tables
            .showtimes
            .iter()
            .find(|s| s.id == booking.showtime_id)
            .ok_or_else(|| AppError::not_found("showtime", booking.showtime_id))?;
        let grid = showtime.grid();
        if !tables.users.iter().any(|u| u.id == booking.user_id) {
            return Err(AppError::not_found("user", booking.user_id));
        }
        if booking.seats.iter().any(|seat| !grid.contains(*seat)) {
            return Err(AppError::invalid("seat does not exist for this showtime"));
        }
        if booking
            .seats
            .iter()
            .any(|seat| tables.booking_seats.contains_key(&(booking.showtime_id, *seat)))
        {
            return Err(AppError::seat_taken());
        }

        let created = Booking {
            id: next_id(tables.bookings.len()),
            user_id: booking.user_id,
            showtime_id: booking.showtime_id,
            seats: booking.seats,
            seat_labels: booking.seat_labels,
            total_price_cents: booking.total_price_cents,
            booked_at: Utc::now(),
        };
        for seat in &created.seats {
            tables
                .booking_seats
                .insert((created.showtime_id, *seat), created.id);
        }
        tables.bookings.push(created.clone());
        Ok(created)
    }

    async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at).then(b.id.cmp(&a.id)));
        Ok(bookings)
    }
}
