//! [`Command`] for booking [`Seat`]s of a [`Schedule`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{seat::Number, Bus};
use crate::{
    domain::{
        booking, bus, schedule, seat, user, Booking, Schedule, Seat, User,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for booking [`Seat`]s of a [`Schedule`].
///
/// [`Seat`]s belong to the [`Bus`] of the [`Schedule`], so they are shared by
/// all the [`Schedule`]s of that [`Bus`].
#[derive(Clone, Debug)]
pub struct BookTicket {
    /// ID of the [`User`] booking the [`Seat`]s.
    pub user_id: user::Id,

    /// ID of the [`Schedule`] to book the [`Seat`]s for.
    pub schedule_id: schedule::Id,

    /// [`Number`]s of the [`Seat`]s to book.
    pub seats: Vec<seat::Number>,
}

impl<Db> Command<BookTicket> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Schedule>, schedule::Id>>,
            Ok = Option<Schedule>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Vec<Seat>, (bus::Id, seat::Selection)>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Seat>, bus::Id>>,
            Ok = Vec<Seat>,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Update<Vec<Seat>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::booking::Details;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: BookTicket) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let BookTicket {
            user_id,
            schedule_id,
            seats,
        } = cmd;

        let selection = seat::Selection::new(seats)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let schedule = self
            .database()
            .execute(Select(By::<Option<Schedule>, _>::new(schedule_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScheduleNotExists(schedule_id))
            .map_err(tracerr::wrap!())?;

        let user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let total_fare = schedule
            .fare
            .checked_mul(selection.len())
            .ok_or(E::FareOverflow)
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Requested `Seat`s are locked in ascending `seat::Number` order, so
        // concurrent bookings neither deadlock nor double-book them.
        tx.execute(Lock(By::new((schedule.bus_id, selection.clone()))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let seats = tx
            .execute(Select(By::<Vec<Seat>, _>::new(schedule.bus_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !seats.iter().any(Seat::is_available) {
            return Err(tracerr::new!(E::NoSeatsAvailable(schedule.bus_id)));
        }

        let mut batch = seat::Batch::pick(seats, &selection)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let booking = Booking {
            id: booking::Id::new(),
            user_id: user.id,
            schedule_id: schedule.id,
            total_fare,
            status: booking::Status::Confirmed,
            created_at: DateTime::now().coerce(),
        };
        batch
            .occupy(booking.id)
            .map_err(E::SeatsUnavailable)
            .map_err(tracerr::wrap!())?;
        let numbers = batch.numbers();

        tx.execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(batch.into_inner()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Booking(id: {})` confirmed: seats {numbers} of `Bus(id: {})` \
             for {total_fare}",
            booking.id,
            schedule.bus_id,
        );

        Ok(read::booking::Details {
            booking,
            seats: numbers.into(),
        })
    }
}

/// Error of [`BookTicket`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Total fare doesn't fit into [`Money`].
    ///
    /// [`Money`]: common::Money
    #[display("Total fare overflows")]
    FareOverflow,

    /// Requested [`seat::Selection`] is malformed.
    #[display("Invalid seat selection: {_0}")]
    #[from]
    InvalidSelection(#[error(not(source))] seat::SelectionError),

    /// [`Bus`] has no available [`Seat`]s at all.
    #[display("No seats available on `Bus(id: {_0})`")]
    NoSeatsAvailable(#[error(not(source))] bus::Id),

    /// [`Schedule`] with the provided ID does not exist.
    #[display("`Schedule(id: {_0})` does not exist")]
    ScheduleNotExists(#[error(not(source))] schedule::Id),

    /// Some of the requested [`Seat`]s are already taken.
    #[display("Seats are not available: {_0}")]
    SeatsUnavailable(#[error(not(source))] seat::Numbers),

    /// Some of the requested [`Seat`]s don't exist in the [`Bus`].
    #[display("Seats do not exist: {_0}")]
    #[from]
    UnknownSeats(#[error(not(source))] seat::Numbers),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            booking, schedule, seat,
            user::{self, Role},
            Schedule, User,
        },
        infra::Memory,
        testing, Command as _, Service,
    };

    use super::{BookTicket, ExecutionError};

    fn book(
        user: &User,
        schedule: &Schedule,
        seats: &[&str],
    ) -> BookTicket {
        BookTicket {
            user_id: user.id,
            schedule_id: schedule.id,
            seats: testing::numbers(seats),
        }
    }

    fn available(svc: &Service<Memory>, schedule: &Schedule) -> Vec<String> {
        svc.database().inspect(|s| {
            s.available_seats(schedule.bus_id)
                .into_iter()
                .map(|n| n.to_string())
                .collect()
        })
    }

    #[tokio::test]
    async fn books_requested_seats() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2", "A3"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        let out = svc
            .execute(book(&user, &schedule, &["A2", "A1"]))
            .await
            .unwrap();

        assert_eq!(out.seats, testing::numbers(&["A1", "A2"]));
        assert_eq!(out.booking.status, booking::Status::Confirmed);
        assert_eq!(out.booking.user_id, user.id);
        assert_eq!(out.booking.total_fare.amount, Decimal::from(1000));
        assert_eq!(available(&svc, &schedule), ["A3"]);
        svc.database().inspect(|s| {
            for seat in s.seats.values().filter(|s| !s.is_available()) {
                assert_eq!(
                    seat.occupancy,
                    seat::Occupancy::Booked(out.booking.id),
                );
            }
        });
    }

    #[tokio::test]
    async fn computes_fare_exactly() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["1", "2", "3"]);
        let schedule = testing::schedule(&svc, &bus, "0.10");

        let out = svc
            .execute(book(&user, &schedule, &["1", "2", "3"]))
            .await
            .unwrap();

        assert_eq!(
            out.booking.total_fare,
            Money {
                amount: "0.30".parse().unwrap(),
                currency: schedule.fare.currency,
            },
        );
    }

    #[tokio::test]
    async fn rejects_taken_seats_atomically() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2", "A3"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        drop(svc.execute(book(&user, &schedule, &["A2"])).await.unwrap());

        let err = svc
            .execute(book(&user, &schedule, &["A1", "A2"]))
            .await
            .unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::SeatsUnavailable(n)
                    if n.as_slice() == testing::numbers(&["A2"]),
            ),
            "{err}",
        );
        assert_eq!(available(&svc, &schedule), ["A1", "A3"]);
        assert_eq!(svc.database().inspect(|s| s.bookings.len()), 1);
    }

    #[tokio::test]
    async fn rejects_when_bus_is_full() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        drop(svc.execute(book(&user, &schedule, &["A1"])).await.unwrap());

        let err = svc
            .execute(book(&user, &schedule, &["A1"]))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::NoSeatsAvailable(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn reports_full_bus_before_unknown_seats() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        drop(svc.execute(book(&user, &schedule, &["A1"])).await.unwrap());

        let err = svc
            .execute(book(&user, &schedule, &["Z9"]))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::NoSeatsAvailable(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_unknown_seats_before_conflicts() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        drop(svc.execute(book(&user, &schedule, &["A1"])).await.unwrap());

        let err = svc
            .execute(book(&user, &schedule, &["A1", "Z9"]))
            .await
            .unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::UnknownSeats(n)
                    if n.as_slice() == testing::numbers(&["Z9"]),
            ),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_malformed_selection() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        for seats in [&[][..], &["A1", "A1"][..]] {
            let err = svc
                .execute(book(&user, &schedule, seats))
                .await
                .unwrap_err();

            assert!(
                matches!(err.as_ref(), ExecutionError::InvalidSelection(_)),
                "{err}",
            );
        }
        assert_eq!(available(&svc, &schedule), ["A1"]);
    }

    #[tokio::test]
    async fn requires_existing_schedule_and_user() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        let err = svc
            .execute(BookTicket {
                user_id: user.id,
                schedule_id: schedule::Id::new(),
                seats: testing::numbers(&["A1"]),
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::ScheduleNotExists(_)),
            "{err}",
        );

        let err = svc
            .execute(BookTicket {
                user_id: user::Id::new(),
                schedule_id: schedule.id,
                seats: testing::numbers(&["A1"]),
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::UserNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn concurrent_bookings_never_share_seats() {
        let svc = testing::service();
        let alice = testing::user(&svc, Role::Passenger);
        let bob = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2", "A3"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        let (a, b) = tokio::join!(
            svc.execute(book(&alice, &schedule, &["A1", "A2"])),
            svc.execute(book(&bob, &schedule, &["A2", "A3"])),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        let err = a.as_ref().err().or(b.as_ref().err()).unwrap();
        assert!(
            matches!(err.as_ref(), ExecutionError::SeatsUnavailable(_)),
            "{err}",
        );
        let winner = a.or(b).unwrap();
        svc.database().inspect(|s| {
            assert_eq!(s.bookings.len(), 1);
            let booked = s
                .seats
                .values()
                .filter(|seat| {
                    seat.occupancy.booking_id() == Some(winner.booking.id)
                })
                .count();
            assert_eq!(booked, 2);
        });
        assert_eq!(available(&svc, &schedule).len(), 1);
    }

    #[tokio::test]
    async fn last_seat_is_booked_once() {
        let svc = testing::service();
        let alice = testing::user(&svc, Role::Passenger);
        let bob = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        let (a, b) = tokio::join!(
            svc.execute(book(&alice, &schedule, &["A1"])),
            svc.execute(book(&bob, &schedule, &["A1"])),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        let err = a.err().or(b.err()).unwrap();
        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::NoSeatsAvailable(_)
                    | ExecutionError::SeatsUnavailable(_),
            ),
            "{err}",
        );
        assert!(available(&svc, &schedule).is_empty());
    }

    #[tokio::test]
    async fn seats_are_shared_by_schedules_of_same_bus() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2"]);
        let morning = testing::schedule(&svc, &bus, "500");
        let evening = testing::schedule(&svc, &bus, "700");
        drop(svc.execute(book(&user, &morning, &["A1"])).await.unwrap());

        let err = svc
            .execute(book(&user, &evening, &["A1"]))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::SeatsUnavailable(_)),
            "{err}",
        );
        assert_eq!(available(&svc, &evening), ["A2"]);
    }
}
