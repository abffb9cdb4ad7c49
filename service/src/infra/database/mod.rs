//! [`Database`]-related implementations.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Postgres`] error.
    #[cfg(feature = "postgres")]
    Postgres(postgres::Error),

    /// [`Memory`] error.
    #[cfg(any(test, feature = "memory"))]
    Memory(memory::Error),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the unique `constraint`
    /// (or of any unique constraint, if [`None`]).
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_unique_violation(constraint),
            #[cfg(any(test, feature = "memory"))]
            Self::Memory(e) => e.is_unique_violation(constraint),
        }
    }
}

/// Names of the unique constraints the domain relies on.
pub mod constraint {
    /// Seat numbers are unique within a bus.
    pub const SEAT_NUMBER: &str = "seats_bus_id_number_key";

    /// At most one payment exists per booking.
    pub const PAYMENT_BOOKING: &str = "payments_booking_id_key";

    /// Email addresses are unique among active users.
    pub const USER_EMAIL: &str = "users_email_active_key";
}
