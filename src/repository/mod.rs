//! Persistence seam.
//!
//! Everything the services read or write goes through [`Repository`]. The
//! production implementation is [`postgres::PgRepository`]; [`memory::MemoryRepository`]
//! keeps the same contract in process for tests and local runs.
//!
//! Contract for [`BookingRepository::commit_booking`]: the booking row and all
//! of its seats are written atomically, and if any seat is already taken the
//! whole commit fails with [`AppError::Conflict`] and nothing is written.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::AppError;
use crate::models::{Booking, Movie, NewBooking, NewMovie, NewShowtime, NewUser, Showtime, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<Movie>, AppError>;

    async fn find_movie(&self, id: i64) -> Result<Option<Movie>, AppError>;

    /// Showtimes of a movie ordered by start time.
    async fn showtimes_for_movie(&self, movie_id: i64) -> Result<Vec<Showtime>, AppError>;

    async fn find_showtime(&self, id: i64) -> Result<Option<Showtime>, AppError>;

    async fn count_movies(&self) -> Result<i64, AppError>;

    async fn insert_movie(&self, movie: NewMovie) -> Result<Movie, AppError>;

    /// Inserts the showtime together with its full seat inventory.
    async fn insert_showtime(&self, showtime: NewShowtime) -> Result<Showtime, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`AppError::AlreadyExists`] when the email is already registered.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Indices of the seats of `showtime_id` referenced by a committed booking.
    async fn taken_seats(&self, showtime_id: i64) -> Result<BTreeSet<i32>, AppError>;

    async fn commit_booking(&self, booking: NewBooking) -> Result<Booking, AppError>;

    /// Bookings of a user, newest first.
    async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError>;
}

pub trait Repository: CatalogRepository + UserRepository + BookingRepository {}

impl<T> Repository for T where T: CatalogRepository + UserRepository + BookingRepository {}
