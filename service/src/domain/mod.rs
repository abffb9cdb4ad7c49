//! Domain definitions.

pub mod booking;
pub mod bus;
pub mod notification;
pub mod payment;
pub mod route;
pub mod schedule;
pub mod seat;
pub mod user;

pub use self::{
    booking::Booking, bus::Bus, notification::Notification, payment::Payment,
    route::Route, schedule::Schedule, seat::Seat, user::User,
};
