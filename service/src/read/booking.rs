//! [`Booking`] read model definition.

use crate::domain::{seat, Booking};

/// [`Booking`] together with the numbers of the seats bound to it.
///
/// A cancelled [`Booking`] has no seats bound.
#[derive(Clone, Debug)]
pub struct Details {
    /// The [`Booking`] itself.
    pub booking: Booking,

    /// [`seat::Number`]s bound to the [`Booking`], in ascending order.
    pub seats: Vec<seat::Number>,
}
