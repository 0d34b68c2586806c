//! Demo data, inserted once at startup when the catalog is empty.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use tracing::info;

use super::auth::hash_password;
use crate::error::AppError;
use crate::models::{NewMovie, NewShowtime, NewUser, SeatGrid};
use crate::repository::Repository;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password";

const SEAT_ROWS: i32 = 5;
const SEAT_COLUMNS: i32 = 8;
const SHOWTIMES_PER_MOVIE: i64 = 3;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub movies: usize,
    pub showtimes: usize,
    pub demo_user_created: bool,
}

fn demo_movies() -> Vec<NewMovie> {
    vec![
        NewMovie {
            title: "Interstellar".into(),
            description: "A team of explorers travel through a wormhole in space in an attempt to ensure humanity's survival.".into(),
            duration_minutes: 169,
            poster_url: Some("https://m.media-amazon.com/images/I/91kFYg4fX3L._AC_SL1500_.jpg".into()),
        },
        NewMovie {
            title: "Inception".into(),
            description: "A thief who steals corporate secrets through dream-sharing technology is given an inverse task of planting an idea.".into(),
            duration_minutes: 148,
            poster_url: Some("https://m.media-amazon.com/images/I/51s+JvFsHkL._AC_.jpg".into()),
        },
        NewMovie {
            title: "The Dark Knight".into(),
            description: "Batman faces the Joker, a criminal mastermind who plunges Gotham into anarchy.".into(),
            duration_minutes: 152,
            poster_url: Some("https://m.media-amazon.com/images/I/51K8ouYrHeL._AC_.jpg".into()),
        },
    ]
}

/// Showtimes start two hours after the current hour, three hours apart,
/// priced 10.00, 12.00, 14.00.
fn demo_schedule(now: DateTime<Utc>) -> Result<Vec<(DateTime<Utc>, i64)>, AppError> {
    let base = now
        .duration_trunc(TimeDelta::hours(1))
        .map_err(|e| AppError::Internal(format!("cannot round seed time: {e}")))?
        + TimeDelta::hours(2);

    Ok((0..SHOWTIMES_PER_MOVIE)
        .map(|i| (base + TimeDelta::hours(3 * i), 1000 + 200 * i))
        .collect())
}

pub async fn seed_demo_data(repo: &dyn Repository, bcrypt_cost: u32) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    if repo.count_movies().await? > 0 {
        info!("Catalog already populated, skipping demo movies");
    } else {
        let grid = SeatGrid::new(SEAT_ROWS, SEAT_COLUMNS)
            .ok_or_else(|| AppError::Internal("invalid demo seat grid".into()))?;
        let schedule = demo_schedule(Utc::now())?;

        for movie in demo_movies() {
            let movie = repo.insert_movie(movie).await?;
            report.movies += 1;
            for (start_time, price_cents) in &schedule {
                repo.insert_showtime(NewShowtime {
                    movie_id: movie.id,
                    start_time: *start_time,
                    price_cents: *price_cents,
                    grid,
                })
                .await?;
                report.showtimes += 1;
            }
        }
    }

    if repo.find_user_by_email(DEMO_EMAIL).await?.is_none() {
        let password_hash = hash_password(DEMO_PASSWORD.to_string(), bcrypt_cost).await?;
        repo.insert_user(NewUser {
            name: "Demo User".into(),
            email: DEMO_EMAIL.into(),
            password_hash,
            is_admin: true,
        })
        .await?;
        report.demo_user_created = true;
    }

    info!(
        "Seeded {} movies, {} showtimes, demo user created: {}",
        report.movies, report.showtimes, report.demo_user_created
    );
    Ok(report)
}
