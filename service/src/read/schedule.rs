//! [`Schedule`] read model definition.
//!
//! [`Schedule`]: crate::domain::Schedule

use common::Date;

use crate::domain::route;

/// Search of [`Schedule`]s running between two [`route::Place`]s on a
/// [`Date`].
///
/// [`Schedule`]: crate::domain::Schedule
#[derive(Clone, Debug)]
pub struct Search {
    /// [`route::Place`] to depart from.
    pub origin: route::Place,

    /// [`route::Place`] to arrive at.
    pub destination: route::Place,

    /// [`Date`] of the trip.
    pub date: Date,
}
