//! [`Command`] definition.

pub mod add_seats;
pub mod authorize_user_session;
pub mod book_ticket;
pub mod cancel_booking;
pub mod create_user;
pub mod create_user_session;
pub mod delete_user;
pub mod delete_user_session;
pub mod initiate_payment;
pub mod refresh_user_session;
pub mod release_seats;
pub mod reserve_seats;
pub mod send_notification;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_seats::AddSeats, authorize_user_session::AuthorizeUserSession,
    book_ticket::BookTicket, cancel_booking::CancelBooking,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_user::DeleteUser, delete_user_session::DeleteUserSession,
    initiate_payment::InitiatePayment,
    refresh_user_session::RefreshUserSession, release_seats::ReleaseSeats,
    reserve_seats::ReserveSeats, send_notification::SendNotification,
};
