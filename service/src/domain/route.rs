//! [`Route`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Route between two [`Place`]s served by schedules.
#[derive(Clone, Debug)]
pub struct Route {
    /// ID of this [`Route`].
    pub id: Id,

    /// [`Place`] this [`Route`] starts at.
    pub origin: Place,

    /// [`Place`] this [`Route`] ends at.
    pub destination: Place,
}

/// ID of a [`Route`].
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

/// Origin or destination of a [`Route`].
///
/// Compared case-sensitively, exactly as stored.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Place(String);

impl Place {
    /// Creates a new [`Place`] if the given `place` is valid.
    #[must_use]
    pub fn new(place: impl Into<String>) -> Option<Self> {
        let place = place.into();
        Self::check(&place).then_some(Self(place))
    }

    /// Checks whether the given `place` is a valid [`Place`].
    fn check(place: impl AsRef<str>) -> bool {
        let place = place.as_ref();
        place.trim() == place && !place.is_empty() && place.len() <= 100
    }
}

impl FromStr for Place {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Place`")
    }
}
