//! [`Schedule`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{bus, route};
#[cfg(doc)]
use crate::domain::{Bus, Route};

/// Trip of a [`Bus`] along a [`Route`] on some [`Date`].
///
/// Seats are resolved through the [`Bus`], so all the [`Schedule`]s of the
/// same [`Bus`] share one seat pool, whatever their [`Date`]s are.
#[derive(Clone, Debug)]
pub struct Schedule {
    /// ID of this [`Schedule`].
    pub id: Id,

    /// ID of the [`Bus`] serving this [`Schedule`].
    pub bus_id: bus::Id,

    /// ID of the [`Route`] this [`Schedule`] follows.
    pub route_id: route::Id,

    /// [`DateTime`] of departure.
    pub departure_at: DepartureDateTime,

    /// [`DateTime`] of arrival.
    pub arrival_at: ArrivalDateTime,

    /// Fare of a single seat.
    pub fare: Money,

    /// [`Date`] this [`Schedule`] runs on.
    pub date: Date,
}

/// ID of a [`Schedule`].
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

/// [`DateTime`] of a [`Schedule`] departure.
pub type DepartureDateTime = DateTimeOf<(Schedule, unit::Departure)>;

/// [`DateTime`] of a [`Schedule`] arrival.
pub type ArrivalDateTime = DateTimeOf<(Schedule, unit::Arrival)>;
