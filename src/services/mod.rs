pub mod auth;
pub mod booking;
pub mod catalog;
pub mod ledger;
pub mod seed;

pub use auth::AuthService;
pub use booking::BookingService;
pub use catalog::CatalogReader;
pub use ledger::SeatLedger;
