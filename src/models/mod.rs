pub mod booking;
pub mod movie;
pub mod seat;
pub mod showtime;
pub mod user;

pub use booking::{Booking, NewBooking};
pub use movie::{Movie, NewMovie};
pub use seat::{Seat, SeatGrid, SeatRow};
pub use showtime::{NewShowtime, Showtime};
pub use user::{NewUser, User};
