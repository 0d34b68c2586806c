use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{collections::BTreeSet, time::Duration};
use tracing::{debug, info};

use super::{BookingRepository, CatalogRepository, UserRepository};
use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{Booking, Movie, NewBooking, NewMovie, NewShowtime, NewUser, Showtime, User};

/// Postgres-backed repository.
///
/// Double-booking is rejected by the primary key of `booking_seats`, not by
/// anything in this process, so the guarantee holds across replicas. Transactions
/// run at the default READ COMMITTED level: a second writer of the same seat
/// blocks on the first one's index entry and fails with a unique violation once
/// it commits.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

const BOOKING_SELECT: &str = r#"
    SELECT b.id, b.user_id, b.showtime_id, b.total_price_cents, b.booked_at,
           ARRAY_AGG(bs.seat_index ORDER BY bs.seat_index) AS seats,
           ARRAY_AGG(s.label ORDER BY bs.seat_index) AS seat_labels
    FROM bookings b
    JOIN booking_seats bs ON bs.booking_id = b.id
    JOIN seats s ON s.showtime_id = bs.showtime_id AND s.seat_index = bs.seat_index
"#;

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }
}

/// Maps constraint violations to domain errors; everything else stays a
/// database error.
fn classify(err: sqlx::Error, on_unique: fn() -> AppError, on_foreign_key: fn() -> AppError) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return on_unique();
        }
        if db_err.is_foreign_key_violation() {
            return on_foreign_key();
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl CatalogRepository for PgRepository {
    async fn list_movies(&self) -> Result<Vec<Movie>, AppError> {
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, duration_minutes, poster_url FROM movies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn find_movie(&self, id: i64) -> Result<Option<Movie>, AppError> {
        let movie = sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, duration_minutes, poster_url FROM movies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(movie)
    }

    async fn showtimes_for_movie(&self, movie_id: i64) -> Result<Vec<Showtime>, AppError> {
        let showtimes = sqlx::query_as::<_, Showtime>(
            "SELECT id, movie_id, start_time, price_cents, seat_rows, seat_columns
             FROM showtimes
             WHERE movie_id = $1
             ORDER BY start_time, id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(showtimes)
    }

    async fn find_showtime(&self, id: i64) -> Result<Option<Showtime>, AppError> {
        let showtime = sqlx::query_as::<_, Showtime>(
            "SELECT id, movie_id, start_time, price_cents, seat_rows, seat_columns
             FROM showtimes
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(showtime)
    }

    async fn count_movies(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_movie(&self, movie: NewMovie) -> Result<Movie, AppError> {
        let movie = sqlx::query_as::<_, Movie>(
            "INSERT INTO movies (title, description, duration_minutes, poster_url)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, description, duration_minutes, poster_url",
        )
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(movie.duration_minutes)
        .bind(&movie.poster_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(movie)
    }

    async fn insert_showtime(&self, showtime: NewShowtime) -> Result<Showtime, AppError> {
        let grid = showtime.grid;
        let indices: Vec<i32> = grid.indices().collect();
        let labels = grid.labels(&indices);

        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Showtime>(
            "INSERT INTO showtimes (movie_id, start_time, price_cents, seat_rows, seat_columns)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, movie_id, start_time, price_cents, seat_rows, seat_columns",
        )
        .bind(showtime.movie_id)
        .bind(showtime.start_time)
        .bind(showtime.price_cents)
        .bind(grid.rows)
        .bind(grid.columns)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            classify(
                e,
                || AppError::Internal("unexpected unique violation on showtimes".into()),
                || AppError::invalid("movie does not exist"),
            )
        })?;

        sqlx::query(
            "INSERT INTO seats (showtime_id, seat_index, label)
             SELECT $1, t.seat_index, t.label
             FROM UNNEST($2::INT4[], $3::TEXT[]) AS t(seat_index, label)",
        )
        .bind(created.id)
        .bind(&indices[..])
        .bind(&labels[..])
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Created showtime {} with {} seats", created.id, indices.len());
        Ok(created)
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, is_admin)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, password_hash, is_admin, created_at",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            classify(
                e,
                || AppError::AlreadyExists("email already in use".into()),
                || AppError::Internal("unexpected foreign key violation on users".into()),
            )
        })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl BookingRepository for PgRepository {
    async fn taken_seats(&self, showtime_id: i64) -> Result<BTreeSet<i32>, AppError> {
        let taken = sqlx::query_scalar::<_, i32>(
            "SELECT seat_index FROM booking_seats WHERE showtime_id = $1",
        )
        .bind(showtime_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(taken.into_iter().collect())
    }

    async fn commit_booking(&self, booking: NewBooking) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted: Result<(i64, DateTime<Utc>), sqlx::Error> = sqlx::query_as(
            "INSERT INTO bookings (user_id, showtime_id, total_price_cents)
             VALUES ($1, $2, $3)
             RETURNING id, booked_at",
        )
        .bind(booking.user_id)
        .bind(booking.showtime_id)
        .bind(booking.total_price_cents)
        .fetch_one(&mut *tx)
        .await;

        let (id, booked_at) = match inserted {
            Ok(row) => row,
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(classify(
                    e,
                    || AppError::Internal("unexpected unique violation on bookings".into()),
                    || AppError::not_found("user or showtime", "referenced by booking"),
                ));
            }
        };

        // The primary key on (showtime_id, seat_index) is the double-booking guard.
        let seats = sqlx::query(
            "INSERT INTO booking_seats (booking_id, showtime_id, seat_index)
             SELECT $1, $2, UNNEST($3::INT4[])",
        )
        .bind(id)
        .bind(booking.showtime_id)
        .bind(&booking.seats[..])
        .execute(&mut *tx)
        .await;

        if let Err(e) = seats {
            let _ = tx.rollback().await;
            return Err(classify(e, AppError::seat_taken, || {
                AppError::invalid("seat does not exist for this showtime")
            }));
        }

        tx.commit().await?;

        Ok(Booking {
            id,
            user_id: booking.user_id,
            showtime_id: booking.showtime_id,
            seats: booking.seats,
            seat_labels: booking.seat_labels,
            total_price_cents: booking.total_price_cents,
            booked_at,
        })
    }

    async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError> {
        let query = format!(
            "{BOOKING_SELECT}
             WHERE b.user_id = $1
             GROUP BY b.id
             ORDER BY b.booked_at DESC, b.id DESC"
        );
        let bookings = sqlx::query_as::<_, Booking>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(bookings)
    }
}
