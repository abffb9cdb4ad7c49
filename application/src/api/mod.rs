//! GraphQL API definitions.

pub mod booking;
pub mod bus;
mod mutation;
pub mod notification;
pub mod payment;
mod query;
pub mod scalar;
pub mod schedule;
pub mod seat;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    booking::Booking,
    bus::Bus,
    mutation::Mutation,
    notification::Notification,
    payment::Payment,
    query::Query,
    schedule::{Route, Schedule},
    seat::Seat,
    subscription::Subscription,
    user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PrivilegeError {
        #[code = "NOT_STAFF"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an operator or an admin"]
        Staff,

        #[code = "NOT_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an admin"]
        Admin,

        #[code = "NOT_BOOKING_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` does not own the `Booking`"]
        BookingOwner,
    }
}
