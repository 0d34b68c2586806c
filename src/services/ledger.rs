//! Seat ledger: which seats of a showtime are taken.
//!
//! Read-only. A seat is taken exactly when a committed booking references it,
//! so the ledger derives everything from the repository's booking seats and
//! never stores a status of its own.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{SeatRow, Showtime};
use crate::repository::Repository;

#[derive(Clone)]
pub struct SeatLedger {
    repo: Arc<dyn Repository>,
}

impl SeatLedger {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Taken seat indices of a showtime.
    pub async fn taken_seats(&self, showtime_id: i64) -> Result<BTreeSet<i32>, AppError> {
        self.ensure_showtime(showtime_id).await?;
        self.repo.taken_seats(showtime_id).await
    }

    /// Whether every requested seat is currently free. The answer can be stale
    /// by the time a booking commits.
    pub async fn check_free(
        &self,
        showtime_id: i64,
        seats: &BTreeSet<i32>,
    ) -> Result<bool, AppError> {
        let showtime = self
            .repo
            .find_showtime(showtime_id)
            .await?
            .ok_or_else(|| AppError::not_found("showtime", showtime_id))?;
        self.seats_free(&showtime, seats).await
    }

    /// [`Self::check_free`] for a showtime the caller has already loaded.
    pub async fn seats_free(
        &self,
        showtime: &Showtime,
        seats: &BTreeSet<i32>,
    ) -> Result<bool, AppError> {
        let taken = self.repo.taken_seats(showtime.id).await?;
        Ok(taken.is_disjoint(seats))
    }

    /// Full seat grid of a showtime, grouped by row.
    pub async fn seat_map(&self, showtime: &Showtime) -> Result<Vec<SeatRow>, AppError> {
        let taken = self.repo.taken_seats(showtime.id).await?;
        Ok(showtime.grid().layout(&taken))
    }

    async fn ensure_showtime(&self, showtime_id: i64) -> Result<(), AppError> {
        match self.repo.find_showtime(showtime_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("showtime", showtime_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewBooking, NewMovie, NewShowtime, NewUser, SeatGrid};
    use crate::repository::{
        BookingRepository, CatalogRepository, MemoryRepository, UserRepository,
    };
    use chrono::Utc;

    async fn setup() -> (SeatLedger, Arc<MemoryRepository>, Showtime) {
        let repo = Arc::new(MemoryRepository::new());
        let movie = repo
            .insert_movie(NewMovie {
                title: "Interstellar".into(),
                description: "Wormholes".into(),
                duration_minutes: 169,
                poster_url: None,
            })
            .await
            .unwrap();
        let showtime = repo
            .insert_showtime(NewShowtime {
                movie_id: movie.id,
                start_time: Utc::now(),
                price_cents: 1200,
                grid: SeatGrid::new(5, 8).unwrap(),
            })
            .await
            .unwrap();
        let user = repo
            .insert_user(NewUser {
                name: "Grace".into(),
                email: "grace@example.com".into(),
                password_hash: "x".into(),
                is_admin: false,
            })
            .await
            .unwrap();
        repo.commit_booking(NewBooking {
            user_id: user.id,
            showtime_id: showtime.id,
            seats: vec![3, 4],
            seat_labels: vec!["A3".into(), "A4".into()],
            total_price_cents: 2400,
        })
        .await
        .unwrap();

        (SeatLedger::new(repo.clone()), repo, showtime)
    }

    #[tokio::test]
    async fn reports_taken_seats() {
        let (ledger, _, showtime) = setup().await;
        let taken = ledger.taken_seats(showtime.id).await.unwrap();
        assert_eq!(taken, [3, 4].into_iter().collect());
    }

    #[tokio::test]
    async fn check_free_is_false_when_any_seat_overlaps() {
        let (ledger, _, showtime) = setup().await;

        let free: BTreeSet<i32> = [1, 2].into_iter().collect();
        let overlapping: BTreeSet<i32> = [2, 3].into_iter().collect();

        assert!(ledger.check_free(showtime.id, &free).await.unwrap());
        assert!(!ledger.check_free(showtime.id, &overlapping).await.unwrap());
    }

    #[tokio::test]
    async fn seats_free_agrees_with_check_free() {
        let (ledger, _, showtime) = setup().await;

        let free: BTreeSet<i32> = [5, 6].into_iter().collect();
        let overlapping: BTreeSet<i32> = [4, 5].into_iter().collect();

        assert!(ledger.seats_free(&showtime, &free).await.unwrap());
        assert!(!ledger.seats_free(&showtime, &overlapping).await.unwrap());
        assert!(ledger.check_free(999, &free).await.is_err());
    }

    #[tokio::test]
    async fn unknown_showtime_is_not_found() {
        let (ledger, _, _) = setup().await;
        let err = ledger.taken_seats(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "showtime", .. }));
    }

    #[tokio::test]
    async fn seat_map_covers_the_whole_grid() {
        let (ledger, _, showtime) = setup().await;
        let rows = ledger.seat_map(&showtime).await.unwrap();

        let seats: Vec<_> = rows.iter().flat_map(|r| &r.seats).collect();
        assert_eq!(seats.len(), 40);
        let taken: Vec<&str> = seats
            .iter()
            .filter(|s| s.taken)
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(taken, vec!["A3", "A4"]);
    }
}
