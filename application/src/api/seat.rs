//! [`Seat`]-related definitions.

use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;

use crate::{api::scalar, Context};

/// A seat of a `Bus`.
#[derive(Clone, Debug, From)]
pub struct Seat(domain::Seat);

/// A seat of a `Bus`.
#[graphql_object(context = Context)]
impl Seat {
    /// Number of this `Seat`, unique within its `Bus`.
    #[must_use]
    pub fn number(&self) -> Number {
        self.0.number.clone().into()
    }

    /// Current occupancy of this `Seat`.
    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        self.0.occupancy.into()
    }

    /// Indicator whether this `Seat` may be booked right now.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.0.is_available()
    }
}

/// Number of a `Seat`, like `A1`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "SeatNumber",
    with = scalar::Via::<domain::seat::Number>,
)]
pub struct Number(domain::seat::Number);

/// Occupancy of a `Seat`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "SeatOccupancy")]
pub enum Occupancy {
    /// `Seat` is available.
    Vacant,

    /// `Seat` is held by an operator.
    Held,

    /// `Seat` is bound to a `Booking`.
    Booked,
}

impl From<domain::seat::Occupancy> for Occupancy {
    fn from(occupancy: domain::seat::Occupancy) -> Self {
        use domain::seat::Occupancy as O;
        match occupancy {
            O::Vacant => Self::Vacant,
            O::Held => Self::Held,
            O::Booked(_) => Self::Booked,
        }
    }
}

/// Converts the provided [`Number`]s into [`domain::seat::Number`]s.
pub(crate) fn numbers(
    numbers: impl IntoIterator<Item = Number>,
) -> Vec<domain::seat::Number> {
    numbers.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod spec {
    use service::domain::{booking, bus, seat};

    use super::{numbers, Number, Occupancy, Seat};

    fn number(n: &str) -> seat::Number {
        seat::Number::new(n).unwrap()
    }

    #[test]
    fn booked_seat_is_not_available() {
        let mut seat = seat::Seat::new(bus::Id::new(), number("A1"));
        seat.occupancy = seat::Occupancy::Booked(booking::Id::new());
        let seat = Seat::from(seat);

        assert_eq!(seat.occupancy(), Occupancy::Booked);
        assert!(!seat.is_available());
        assert_eq!(seat.number().to_string(), "A1");
    }

    #[test]
    fn keeps_requested_order() {
        let requested = vec![Number::from(number("B2")), number("A1").into()];

        assert_eq!(numbers(requested), vec![number("B2"), number("A1")]);
    }
}
