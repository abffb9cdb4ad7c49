//! [`Payment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::booking;
#[cfg(doc)]
use crate::domain::Booking;

/// Payment recorded for a [`Booking`].
///
/// At most one [`Payment`] exists per [`Booking`], and it never affects seats.
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the paid [`Booking`].
    pub booking_id: booking::Id,

    /// Paid amount, as reported by the payer.
    pub amount: Money,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`DateTime`] when this [`Payment`] was recorded.
    pub created_at: CreationDateTime,
}

/// ID of a [`Payment`].
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
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "Money has been received."]
        Successful = 1,

        #[doc = "Money has not been received."]
        Failed = 2,
    }
}

/// [`DateTime`] when a [`Payment`] was recorded.
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;
