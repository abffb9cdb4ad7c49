//! [`Seat`] definitions.

use std::{collections::BTreeSet, fmt};

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, bus};
#[cfg(doc)]
use crate::domain::{Booking, Bus};

/// Seat of a [`Bus`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Seat {
    /// ID of this [`Seat`].
    pub id: Id,

    /// ID of the [`Bus`] this [`Seat`] belongs to for its whole lifetime.
    pub bus_id: bus::Id,

    /// [`Number`] of this [`Seat`], unique within its [`Bus`].
    pub number: Number,

    /// Current [`Occupancy`] of this [`Seat`].
    pub occupancy: Occupancy,
}

impl Seat {
    /// Creates a new [`Vacant`] [`Seat`] in the provided [`Bus`].
    ///
    /// [`Vacant`]: Occupancy::Vacant
    #[must_use]
    pub fn new(bus_id: bus::Id, number: Number) -> Self {
        Self {
            id: Id::new(),
            bus_id,
            number,
            occupancy: Occupancy::Vacant,
        }
    }

    /// Indicates whether this [`Seat`] may be booked or held right now.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.occupancy.is_available()
    }
}

/// ID of a [`Seat`].
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

/// Number of a [`Seat`], like `A1`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
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
        number.trim() == number
            && !number.is_empty()
            && number.chars().count() <= 10
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `seat::Number`")
    }
}

/// Occupancy of a [`Seat`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Occupancy {
    /// [`Seat`] is available.
    Vacant,

    /// [`Seat`] is held by an operator without any [`Booking`].
    Held,

    /// [`Seat`] is bound to the [`Booking`] with the provided ID.
    Booked(booking::Id),
}

impl Occupancy {
    /// Restores an [`Occupancy`] from its persisted availability flag and
    /// [`Booking`] binding.
    ///
    /// [`None`] is returned for an available [`Seat`] bound to a [`Booking`].
    #[must_use]
    pub fn from_parts(
        is_available: bool,
        booking_id: Option<booking::Id>,
    ) -> Option<Self> {
        match (is_available, booking_id) {
            (true, None) => Some(Self::Vacant),
            (false, None) => Some(Self::Held),
            (false, Some(id)) => Some(Self::Booked(id)),
            (true, Some(_)) => None,
        }
    }

    /// Indicates whether this [`Occupancy`] allows to take a [`Seat`].
    #[must_use]
    pub fn is_available(self) -> bool {
        matches!(self, Self::Vacant)
    }

    /// Returns ID of the [`Booking`] this [`Occupancy`] is bound to, if any.
    #[must_use]
    pub fn booking_id(self) -> Option<booking::Id> {
        match self {
            Self::Booked(id) => Some(id),
            Self::Vacant | Self::Held => None,
        }
    }
}

/// Non-empty set of distinct [`Number`]s requested in one operation.
///
/// Iterates in ascending order, which is the order [`Seat`] rows are locked in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection(Vec<Number>);

impl Selection {
    /// Creates a new [`Selection`] out of the provided [`Number`]s.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::Empty`] if no [`Number`]s are provided.
    /// - [`SelectionError::Duplicate`] if some [`Number`] is repeated.
    pub fn new(
        numbers: impl IntoIterator<Item = Number>,
    ) -> Result<Self, SelectionError> {
        let mut set = BTreeSet::new();
        for n in numbers {
            if set.contains(&n) {
                return Err(SelectionError::Duplicate(n));
            }
            _ = set.insert(n);
        }
        if set.is_empty() {
            return Err(SelectionError::Empty);
        }
        Ok(Self(set.into_iter().collect()))
    }

    /// Returns the number of [`Seat`]s in this [`Selection`].
    #[expect(clippy::len_without_is_empty, reason = "never empty")]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the [`Number`]s of this [`Selection`] in ascending order.
    #[must_use]
    pub fn numbers(&self) -> &[Number] {
        &self.0
    }

    /// Indicates whether this [`Selection`] contains the provided [`Number`].
    #[must_use]
    pub fn contains(&self, number: &Number) -> bool {
        self.0.binary_search(number).is_ok()
    }
}

/// Error of creating a [`Selection`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum SelectionError {
    /// No [`Seat`]s requested.
    #[display("no seats requested")]
    Empty,

    /// [`Seat`] requested more than once.
    #[display("seat `{_0}` is requested more than once")]
    Duplicate(Number),
}

/// List of [`Number`]s reported back to a caller.
#[derive(Clone, Debug, Default, Eq, From, Into, PartialEq)]
pub struct Numbers(Vec<Number>);

impl Numbers {
    /// Returns the listed [`Number`]s.
    #[must_use]
    pub fn as_slice(&self) -> &[Number] {
        &self.0
    }
}

impl fmt::Display for Numbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

/// [`Seat`]s of one [`Bus`] changing their [`Occupancy`] all together.
///
/// Every transition either applies to all the [`Seat`]s of this [`Batch`] or
/// leaves them untouched.
#[derive(Clone, Debug, From)]
pub struct Batch(Vec<Seat>);

impl Batch {
    /// Picks the [`Seat`]s of the provided [`Selection`] out of the `seats` of
    /// a [`Bus`].
    ///
    /// # Errors
    ///
    /// With the [`Numbers`] of the [`Selection`] not present in `seats`.
    pub fn pick(
        seats: impl IntoIterator<Item = Seat>,
        selection: &Selection,
    ) -> Result<Self, Numbers> {
        let mut picked = seats
            .into_iter()
            .filter(|s| selection.contains(&s.number))
            .collect::<Vec<_>>();
        picked.sort_by(|a, b| a.number.cmp(&b.number));

        let unknown = selection
            .numbers()
            .iter()
            .filter(|n| picked.binary_search_by(|s| s.number.cmp(n)).is_err())
            .cloned()
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            return Err(Numbers(unknown));
        }

        Ok(Self(picked))
    }

    /// Binds all the [`Seat`]s of this [`Batch`] to the provided [`Booking`].
    ///
    /// # Errors
    ///
    /// With the [`Numbers`] of unavailable [`Seat`]s, if any.
    pub fn occupy(&mut self, booking_id: booking::Id) -> Result<(), Numbers> {
        self.transit(Occupancy::is_available, Occupancy::Booked(booking_id))
    }

    /// Holds all the [`Seat`]s of this [`Batch`] without any [`Booking`].
    ///
    /// # Errors
    ///
    /// With the [`Numbers`] of unavailable [`Seat`]s, if any.
    pub fn hold(&mut self) -> Result<(), Numbers> {
        self.transit(Occupancy::is_available, Occupancy::Held)
    }

    /// Makes all the held [`Seat`]s of this [`Batch`] available again.
    ///
    /// # Errors
    ///
    /// With the [`Numbers`] of [`Seat`]s which are not [`Held`], either being
    /// available already or bound to a [`Booking`].
    ///
    /// [`Held`]: Occupancy::Held
    pub fn release(&mut self) -> Result<(), Numbers> {
        self.transit(|o| o == Occupancy::Held, Occupancy::Vacant)
    }

    /// Makes all the [`Seat`]s of this [`Batch`] available, whatever their
    /// [`Occupancy`] is.
    pub fn free(&mut self) {
        for seat in &mut self.0 {
            seat.occupancy = Occupancy::Vacant;
        }
    }

    /// Returns the [`Seat`]s of this [`Batch`].
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.0
    }

    /// Returns the [`Bus`] and the [`Selection`] of the [`Seat`]s in this
    /// [`Batch`], or [`None`] if it's empty.
    #[must_use]
    pub fn selection(&self) -> Option<(bus::Id, Selection)> {
        let bus_id = self.0.first()?.bus_id;
        let numbers = self
            .0
            .iter()
            .map(|s| s.number.clone())
            .collect::<BTreeSet<_>>();
        Some((bus_id, Selection(numbers.into_iter().collect())))
    }

    /// Returns the [`Numbers`] of the [`Seat`]s in this [`Batch`].
    #[must_use]
    pub fn numbers(&self) -> Numbers {
        Numbers(self.0.iter().map(|s| s.number.clone()).collect())
    }

    /// Consumes this [`Batch`] returning its [`Seat`]s.
    #[must_use]
    pub fn into_inner(self) -> Vec<Seat> {
        self.0
    }

    /// Moves all the [`Seat`]s into the `to` [`Occupancy`] if each of them
    /// satisfies the `from` predicate.
    fn transit(
        &mut self,
        from: impl Fn(Occupancy) -> bool,
        to: Occupancy,
    ) -> Result<(), Numbers> {
        let conflicting = self
            .0
            .iter()
            .filter(|s| !from(s.occupancy))
            .map(|s| s.number.clone())
            .collect::<Vec<_>>();
        if !conflicting.is_empty() {
            return Err(Numbers(conflicting));
        }

        for seat in &mut self.0 {
            seat.occupancy = to;
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use super::{
        Batch, Number, Numbers, Occupancy, Seat, Selection, SelectionError,
    };
    use crate::domain::{booking, bus};

    fn number(n: &str) -> Number {
        Number::new(n).unwrap()
    }

    fn selection(ns: &[&str]) -> Selection {
        Selection::new(ns.iter().copied().map(number)).unwrap()
    }

    fn seats(bus: bus::Id, ns: &[&str]) -> Vec<Seat> {
        ns.iter().map(|n| Seat::new(bus, number(n))).collect()
    }

    #[test]
    fn number_is_bounded() {
        assert!(Number::new("A1").is_some());
        assert!(Number::new("1234567890").is_some());
        assert!(Number::new("12345678901").is_none());
        assert!(Number::new("").is_none());
        assert!(Number::new("A1 ").is_none());
    }

    #[test]
    fn selection_rejects_empty_and_duplicates() {
        assert_eq!(
            Selection::new(Vec::<Number>::new()),
            Err(SelectionError::Empty),
        );
        assert_eq!(
            Selection::new([number("A1"), number("A2"), number("A1")]),
            Err(SelectionError::Duplicate(number("A1"))),
        );

        let s = selection(&["B2", "A1", "A10"]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.numbers(), &[number("A1"), number("A10"), number("B2")]);
        assert!(s.contains(&number("A10")));
        assert!(!s.contains(&number("A2")));
    }

    #[test]
    fn occupancy_round_trips_persisted_parts() {
        let booking = booking::Id::new();

        for o in [
            Occupancy::Vacant,
            Occupancy::Held,
            Occupancy::Booked(booking),
        ] {
            assert_eq!(
                Occupancy::from_parts(o.is_available(), o.booking_id()),
                Some(o),
            );
        }
        assert_eq!(Occupancy::from_parts(true, Some(booking)), None);
    }

    #[test]
    fn pick_reports_unknown_numbers() {
        let bus = bus::Id::new();

        let err = Batch::pick(
            seats(bus, &["A1", "A2", "A3"]),
            &selection(&["A2", "Z9", "Z1"]),
        )
        .unwrap_err();
        assert_eq!(err, Numbers::from(vec![number("Z1"), number("Z9")]));
        assert_eq!(err.to_string(), "Z1, Z9");

        let batch = Batch::pick(
            seats(bus, &["A3", "A1", "A2"]),
            &selection(&["A2", "A1"]),
        )
        .unwrap();
        assert_eq!(batch.numbers().to_string(), "A1, A2");
    }

    #[test]
    fn occupy_is_all_or_nothing() {
        let bus = bus::Id::new();
        let mut all = seats(bus, &["A1", "A2", "A3"]);
        all[1].occupancy = Occupancy::Booked(booking::Id::new());

        let mut batch = Batch::pick(all, &selection(&["A1", "A2"])).unwrap();
        let err = batch.occupy(booking::Id::new()).unwrap_err();

        assert_eq!(err.as_slice(), &[number("A2")]);
        assert!(batch.seats()[0].is_available());
    }

    #[test]
    fn occupy_binds_seats() {
        let bus = bus::Id::new();
        let booking = booking::Id::new();
        let mut batch =
            Batch::pick(seats(bus, &["A1", "A2"]), &selection(&["A1", "A2"]))
                .unwrap();

        batch.occupy(booking).unwrap();

        assert!(batch
            .seats()
            .iter()
            .all(|s| s.occupancy == Occupancy::Booked(booking)));
    }

    #[test]
    fn release_accepts_only_held_seats() {
        let bus = bus::Id::new();
        let mut all = seats(bus, &["A1", "A2", "A3"]);
        all[2].occupancy = Occupancy::Booked(booking::Id::new());

        let mut batch =
            Batch::pick(all.clone(), &selection(&["A1", "A2"])).unwrap();
        batch.hold().unwrap();
        assert_eq!(batch.hold().unwrap_err().to_string(), "A1, A2");
        batch.release().unwrap();
        assert_eq!(batch.release().unwrap_err().to_string(), "A1, A2");

        let mut booked = Batch::pick(all, &selection(&["A3"])).unwrap();
        assert_eq!(booked.release().unwrap_err().to_string(), "A3");
    }

    #[test]
    fn selection_covers_batch_in_lock_order() {
        let bus = bus::Id::new();

        assert_eq!(Batch::from(Vec::new()).selection(), None);
        assert_eq!(
            Batch::from(seats(bus, &["B2", "A10", "A1"])).selection(),
            Some((bus, selection(&["A1", "A10", "B2"]))),
        );
    }

    #[test]
    fn free_vacates_everything() {
        let bus = bus::Id::new();
        let mut all = seats(bus, &["A1", "A2"]);
        all[0].occupancy = Occupancy::Held;
        all[1].occupancy = Occupancy::Booked(booking::Id::new());

        let mut batch = Batch::from(all);
        batch.free();

        assert!(batch.seats().iter().all(Seat::is_available));
    }
}
