//! [`Bus`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bus owning a fixed pool of seats.
#[derive(Clone, Debug)]
pub struct Bus {
    /// ID of this [`Bus`].
    pub id: Id,

    /// Registration [`Number`] of this [`Bus`].
    pub number: Number,

    /// Human-readable [`Name`] of this [`Bus`], if any.
    pub name: Option<Name>,

    /// Maximum number of seats this [`Bus`] may carry.
    pub total_seats: Capacity,

    /// [`DateTime`] when this [`Bus`] was registered.
    pub created_at: CreationDateTime,
}

/// ID of a [`Bus`].
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

/// Registration number of a [`Bus`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Number`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number && !number.is_empty() && number.len() <= 50
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `bus::Number`")
    }
}

/// Name of a [`Bus`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 100
    }
}

/// Seating capacity of a [`Bus`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
pub struct Capacity(u16);

impl Capacity {
    /// Creates a new [`Capacity`], if the given `seats` is positive.
    #[must_use]
    pub fn new(seats: u16) -> Option<Self> {
        (seats > 0).then_some(Self(seats))
    }
}

/// [`DateTime`] when a [`Bus`] was registered.
pub type CreationDateTime = DateTimeOf<(Bus, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Capacity, Number};

    #[test]
    fn capacity_is_positive() {
        assert!(Capacity::new(0).is_none());

        assert_eq!(Capacity::new(3).map(u16::from), Some(3));
    }

    #[test]
    fn number_is_trimmed_and_bounded() {
        assert!(Number::new("KA-01-F-1234").is_some());
        assert!(Number::new("").is_none());
        assert!(Number::new(" KA-01").is_none());
        assert!(Number::new("X".repeat(51)).is_none());
    }
}
