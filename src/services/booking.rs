//! Booking service: turns a seat selection into a committed booking.
//!
//! The ledger pre-check only gives a fast answer for the common case. The
//! repository commit is the authority: a seat claimed between the check and the
//! commit still surfaces as [`AppError::Conflict`], and nothing is written.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::ledger::SeatLedger;
use crate::error::AppError;
use crate::models::{Booking, NewBooking};
use crate::repository::Repository;

#[derive(Clone)]
pub struct BookingService {
    repo: Arc<dyn Repository>,
    ledger: SeatLedger,
}

/// Validates the raw seat list of a request: non-empty, no repeats.
pub fn parse_selection(seats: &[i32]) -> Result<BTreeSet<i32>, AppError> {
    if seats.is_empty() {
        return Err(AppError::invalid("select at least one seat"));
    }
    let selection: BTreeSet<i32> = seats.iter().copied().collect();
    if selection.len() != seats.len() {
        return Err(AppError::invalid("a seat was selected more than once"));
    }
    Ok(selection)
}

impl BookingService {
    pub fn new(repo: Arc<dyn Repository>, ledger: SeatLedger) -> Self {
        Self { repo, ledger }
    }

    pub async fn book(
        &self,
        user_id: i64,
        showtime_id: i64,
        seats: &[i32],
    ) -> Result<Booking, AppError> {
        let selection = parse_selection(seats)?;

        let showtime = self
            .repo
            .find_showtime(showtime_id)
            .await?
            .ok_or_else(|| AppError::not_found("showtime", showtime_id))?;
        let grid = showtime.grid();
        if let Some(bad) = selection.iter().find(|seat| !grid.contains(**seat)) {
            return Err(AppError::invalid(format!(
                "seat {bad} is outside 1..={}",
                grid.capacity()
            )));
        }

        if self.repo.find_user(user_id).await?.is_none() {
            return Err(AppError::not_found("user", user_id));
        }

        if !self.ledger.seats_free(&showtime, &selection).await? {
            warn!(
                "Booking rejected: seats {:?} of showtime {} already taken",
                selection, showtime.id
            );
            return Err(AppError::seat_taken());
        }

        let count = selection.len() as i64;
        let total_price_cents = showtime
            .price_cents
            .checked_mul(count)
            .ok_or_else(|| AppError::invalid("booking total is out of range"))?;
        let seats: Vec<i32> = selection.into_iter().collect();

        let booking = self
            .repo
            .commit_booking(NewBooking {
                user_id,
                showtime_id: showtime.id,
                seat_labels: grid.labels(&seats),
                seats,
                total_price_cents,
            })
            .await
            .inspect_err(|e| {
                if let AppError::Conflict(_) = e {
                    warn!("Booking for showtime {} lost a race at commit", showtime.id);
                }
            })?;

        info!(
            "Booking {} committed: user {} showtime {} seats {:?}",
            booking.id, booking.user_id, booking.showtime_id, booking.seat_labels
        );
        Ok(booking)
    }

    pub async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError> {
        self.repo.bookings_for_user(user_id).await
    }
}
