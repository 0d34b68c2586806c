use serde::Serialize;
use std::sync::Arc;

use super::ledger::SeatLedger;
use crate::error::AppError;
use crate::models::{Movie, SeatRow, Showtime};
use crate::repository::Repository;

/// Read-only view over movies and showtimes.
#[derive(Clone)]
pub struct CatalogReader {
    repo: Arc<dyn Repository>,
    ledger: SeatLedger,
}

#[derive(Debug, Serialize)]
pub struct MovieDetail {
    pub movie: Movie,
    pub showtimes: Vec<Showtime>,
}

#[derive(Debug, Serialize)]
pub struct ShowtimeDetail {
    pub showtime: Showtime,
    pub movie: Movie,
    pub seat_count: i32,
    pub free_seats: usize,
    pub rows: Vec<SeatRow>,
}

impl CatalogReader {
    pub fn new(repo: Arc<dyn Repository>, ledger: SeatLedger) -> Self {
        Self { repo, ledger }
    }

    pub async fn list_movies(&self) -> Result<Vec<Movie>, AppError> {
        self.repo.list_movies().await
    }

    pub async fn movie_detail(&self, movie_id: i64) -> Result<MovieDetail, AppError> {
        let (movie, showtimes) = futures::try_join!(
            self.repo.find_movie(movie_id),
            self.repo.showtimes_for_movie(movie_id),
        )?;
        let movie = movie.ok_or_else(|| AppError::not_found("movie", movie_id))?;
        Ok(MovieDetail { movie, showtimes })
    }

    pub async fn showtime_detail(&self, showtime_id: i64) -> Result<ShowtimeDetail, AppError> {
        let showtime = self
            .repo
            .find_showtime(showtime_id)
            .await?
            .ok_or_else(|| AppError::not_found("showtime", showtime_id))?;
        let movie = self
            .repo
            .find_movie(showtime.movie_id)
            .await?
            .ok_or_else(|| AppError::not_found("movie", showtime.movie_id))?;
        let rows = self.ledger.seat_map(&showtime).await?;
        let free_seats = rows
            .iter()
            .flat_map(|row| &row.seats)
            .filter(|seat| !seat.taken)
            .count();

        Ok(ShowtimeDetail {
            seat_count: showtime.seat_count(),
            showtime,
            movie,
            free_seats,
            rows,
        })
    }
}
