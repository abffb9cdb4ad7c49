//! [`Booking`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{schedule, user};
#[cfg(doc)]
use crate::domain::{Schedule, Seat, User};

/// Reservation of one or more [`Seat`]s on a [`Schedule`] made by a [`User`].
///
/// [`Seat`]s refer back to their [`Booking`], while the [`Booking`] itself
/// exclusively owns its fare and [`Status`].
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Booking`].
    pub user_id: user::Id,

    /// ID of the booked [`Schedule`].
    pub schedule_id: schedule::Id,

    /// Fare of all the booked [`Seat`]s together.
    pub total_fare: Money,

    /// Current [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`DateTime`] when this [`Booking`] was made.
    pub created_at: CreationDateTime,
}

impl Booking {
    /// Cancels this [`Booking`].
    ///
    /// Cancelling an already [`Cancelled`] [`Booking`] changes nothing.
    ///
    /// [`Cancelled`]: Status::Cancelled
    pub fn cancel(&mut self) {
        self.status = Status::Cancelled;
    }
}

/// ID of a [`Booking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "[`Booking`] holds its seats."]
        Confirmed = 1,

        #[doc = "[`Booking`] released its seats. Terminal."]
        Cancelled = 2,
    }
}

/// [`DateTime`] when a [`Booking`] was made.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;
